//! Chapter content: concept maps, question stubs, and the repair pass over them.

pub mod chapters;
pub mod concept_map;
pub mod repair;
pub mod stub;
pub mod validate;

pub use concept_map::{ConceptMap, QuestionRef, RefLocation, CONCEPT_MAP_FILE, QUESTIONS_DIR};
pub use repair::{
    repair_chapter, repair_root, ChapterOutcome, ChapterReport, RepairAction, RepairPlan,
    RunTotals,
};
pub use stub::STUB_TEMPLATE;
pub use validate::{check_root, ValidationReport, ValidationSeverity};
