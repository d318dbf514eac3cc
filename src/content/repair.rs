//! Path normalizer and stub generator.
//!
//! A chapter is repaired in two steps: [`plan_chapter`] reads the concept map
//! and decides every rewrite and stub without touching storage, then
//! [`repair_chapter`] applies that plan and saves the document if any
//! reference changed.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{DuplicatePolicy, RepairConfig};
use crate::content::chapters::discover_chapters;
use crate::content::concept_map::{ConceptMap, RefLocation, CONCEPT_MAP_FILE, QUESTIONS_DIR};
use crate::content::stub::write_stub;
use crate::error::RepairError;

/// Last `/`-separated segment of a reference.
pub fn bare_filename(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

pub fn canonical_reference(filename: &str) -> String {
    format!("{QUESTIONS_DIR}/{filename}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairAction {
    Rewrite {
        location: RefLocation,
        from: String,
        to: String,
    },
    /// `reference` is canonical and relative to the chapter directory.
    CreateStub {
        location: RefLocation,
        reference: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRef {
    pub filename: String,
    pub first: RefLocation,
    pub second: RefLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairPlan {
    /// In document order; a rewrite and a stub for the same reference stay adjacent.
    pub actions: Vec<RepairAction>,
    pub duplicates: Vec<DuplicateRef>,
}

fn count_rewrites(actions: &[RepairAction]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, RepairAction::Rewrite { .. }))
        .count()
}

fn count_stubs(actions: &[RepairAction]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, RepairAction::CreateStub { .. }))
        .count()
}

impl RepairPlan {
    pub fn fixed_count(&self) -> usize {
        count_rewrites(&self.actions)
    }

    pub fn stub_count(&self) -> usize {
        count_stubs(&self.actions)
    }
}

/// Decide every rewrite and stub for `map`. Stub decisions look at
/// `questions_dir` as it is now; a filename is stubbed at most once per plan.
pub fn plan_repairs(map: &ConceptMap, questions_dir: &Path) -> Result<RepairPlan, RepairError> {
    let mut plan = RepairPlan::default();
    let mut first_seen: HashMap<String, RefLocation> = HashMap::new();
    let mut planned_stubs: HashSet<String> = HashSet::new();

    for question in map.references()? {
        let filename = bare_filename(&question.reference);
        if filename.is_empty() {
            return Err(RepairError::invalid(
                map.path(),
                format!(
                    "{}: reference '{}' has no file name",
                    question.location, question.reference
                ),
            ));
        }

        let canonical = canonical_reference(filename);
        if question.reference != canonical {
            plan.actions.push(RepairAction::Rewrite {
                location: question.location,
                from: question.reference.clone(),
                to: canonical.clone(),
            });
        }

        match first_seen.entry(filename.to_string()) {
            Entry::Occupied(first) => plan.duplicates.push(DuplicateRef {
                filename: filename.to_string(),
                first: *first.get(),
                second: question.location,
            }),
            Entry::Vacant(slot) => {
                slot.insert(question.location);
            }
        }

        if !questions_dir.join(filename).exists() && planned_stubs.insert(filename.to_string()) {
            plan.actions.push(RepairAction::CreateStub {
                location: question.location,
                reference: canonical,
            });
        }
    }

    Ok(plan)
}

pub fn chapter_name(chapter_dir: &Path) -> String {
    chapter_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| chapter_dir.display().to_string())
}

/// Load the chapter's concept map and plan its repairs. `None` when the chapter
/// has no concept map.
pub fn plan_chapter(chapter_dir: &Path) -> Result<Option<(ConceptMap, RepairPlan)>, RepairError> {
    let concept_map_path = chapter_dir.join(CONCEPT_MAP_FILE);
    if !concept_map_path.exists() {
        return Ok(None);
    }
    let map = ConceptMap::load(&concept_map_path)?;
    let plan = plan_repairs(&map, &chapter_dir.join(QUESTIONS_DIR))?;
    Ok(Some((map, plan)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReport {
    pub chapter: String,
    pub concept_map: PathBuf,
    pub actions: Vec<RepairAction>,
    pub duplicates: Vec<DuplicateRef>,
    pub document_written: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterOutcome {
    Skipped { chapter: String, chapter_dir: PathBuf },
    Repaired(ChapterReport),
}

impl ChapterOutcome {
    pub fn fixed_count(&self) -> usize {
        match self {
            Self::Skipped { .. } => 0,
            Self::Repaired(report) => count_rewrites(&report.actions),
        }
    }

    pub fn stub_count(&self) -> usize {
        match self {
            Self::Skipped { .. } => 0,
            Self::Repaired(report) => count_stubs(&report.actions),
        }
    }
}

fn enforce_duplicate_policy(
    chapter: &str,
    plan: &RepairPlan,
    policy: DuplicatePolicy,
) -> Result<(), RepairError> {
    for duplicate in &plan.duplicates {
        match policy {
            DuplicatePolicy::Error => {
                return Err(RepairError::DuplicateReference {
                    chapter: chapter.to_string(),
                    filename: duplicate.filename.clone(),
                    first: duplicate.first.to_string(),
                    second: duplicate.second.to_string(),
                })
            }
            DuplicatePolicy::Reuse => warn!(
                chapter,
                filename = %duplicate.filename,
                first = %duplicate.first,
                second = %duplicate.second,
                "question file referenced twice, sharing one file"
            ),
        }
    }
    Ok(())
}

/// Repair one chapter: rewrite references to `questions/<filename>`, create
/// missing stubs, and save the concept map only if a reference changed.
///
/// Stubs are written before the document; a failure part way through leaves
/// whatever was already written in place.
pub fn repair_chapter(
    chapter_dir: &Path,
    duplicates: DuplicatePolicy,
) -> Result<ChapterOutcome, RepairError> {
    let chapter = chapter_name(chapter_dir);
    let Some((mut map, plan)) = plan_chapter(chapter_dir)? else {
        info!(chapter = %chapter, "no concept map, skipping");
        return Ok(ChapterOutcome::Skipped {
            chapter,
            chapter_dir: chapter_dir.to_path_buf(),
        });
    };
    enforce_duplicate_policy(&chapter, &plan, duplicates)?;

    let questions_dir = chapter_dir.join(QUESTIONS_DIR);
    fs::create_dir_all(&questions_dir).map_err(|source| RepairError::Write {
        path: questions_dir.clone(),
        source,
    })?;

    for action in &plan.actions {
        match action {
            RepairAction::Rewrite { location, from, to } => {
                debug!(chapter = %chapter, %location, %from, %to, "rewriting reference");
                map.set_reference(*location, to)?;
            }
            RepairAction::CreateStub { reference, .. } => {
                debug!(chapter = %chapter, %reference, "creating stub");
                write_stub(&chapter_dir.join(reference))?;
            }
        }
    }

    let document_written = plan.fixed_count() > 0;
    if document_written {
        map.save()?;
    }

    info!(
        chapter = %chapter,
        fixed = plan.fixed_count(),
        created = plan.stub_count(),
        document_written,
        "chapter repaired"
    );

    Ok(ChapterOutcome::Repaired(ChapterReport {
        chapter,
        concept_map: map.path().to_path_buf(),
        actions: plan.actions,
        duplicates: plan.duplicates,
        document_written,
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub chapters: usize,
    pub fixed: usize,
    pub created: usize,
}

/// Repair every chapter under the configured root, one at a time.
/// `on_chapter` sees each outcome as soon as its chapter is done.
pub fn repair_root(
    config: &RepairConfig,
    mut on_chapter: impl FnMut(&ChapterOutcome),
) -> Result<RunTotals, RepairError> {
    let chapters = discover_chapters(&config.root)?;
    info!(
        root = %config.root.display(),
        chapters = chapters.len(),
        duplicates = %config.duplicates,
        "starting concept map repair"
    );

    let mut totals = RunTotals::default();
    for chapter_dir in &chapters {
        let outcome = repair_chapter(chapter_dir, config.duplicates)?;
        totals.chapters += 1;
        totals.fixed += outcome.fixed_count();
        totals.created += outcome.stub_count();
        on_chapter(&outcome);
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_filename_drops_directories() {
        assert_eq!(bare_filename("old/q1.yml"), "q1.yml");
        assert_eq!(bare_filename("a/b/c/q1.yml"), "q1.yml");
        assert_eq!(bare_filename("q1.yml"), "q1.yml");
        assert_eq!(bare_filename("questions/q1.yml"), "q1.yml");
        assert_eq!(bare_filename("old/"), "");
    }

    #[test]
    fn canonical_reference_prefixes_questions_dir() {
        assert_eq!(canonical_reference("q1.yml"), "questions/q1.yml");
    }

    #[test]
    fn plan_stubs_each_missing_filename_once() {
        let raw = r#"
concept_map:
  - concepts:
      - exam_questions: [old/q1.yml, questions/q2.yml]
      - exam_questions: [questions/q1.yml]
"#;
        let map = ConceptMap::from_yaml("concept-map.yml", raw).unwrap();
        let missing_dir = std::env::temp_dir().join("concept-map-repair-plan-missing-dir");
        let plan = plan_repairs(&map, &missing_dir).unwrap();

        assert_eq!(plan.fixed_count(), 1);
        assert_eq!(plan.stub_count(), 2);
        assert_eq!(plan.duplicates.len(), 1);
        assert_eq!(plan.duplicates[0].filename, "q1.yml");
        assert_eq!(
            plan.actions[0],
            RepairAction::Rewrite {
                location: RefLocation {
                    category: 0,
                    concept: 0,
                    question: 0
                },
                from: "old/q1.yml".to_string(),
                to: "questions/q1.yml".to_string(),
            }
        );
        assert!(matches!(
            &plan.actions[1],
            RepairAction::CreateStub { reference, .. } if reference == "questions/q1.yml"
        ));
    }

    #[test]
    fn plan_rejects_reference_without_file_name() {
        let raw = "concept_map:\n  - concepts:\n      - exam_questions: [old/]\n";
        let map = ConceptMap::from_yaml("concept-map.yml", raw).unwrap();
        let err = plan_repairs(&map, Path::new("questions")).unwrap_err();
        assert!(err.to_string().contains("has no file name"));
    }

    #[test]
    fn duplicate_policy_error_names_both_locations() {
        let plan = RepairPlan {
            actions: Vec::new(),
            duplicates: vec![DuplicateRef {
                filename: "q1.yml".to_string(),
                first: RefLocation {
                    category: 0,
                    concept: 0,
                    question: 0,
                },
                second: RefLocation {
                    category: 1,
                    concept: 2,
                    question: 3,
                },
            }],
        };
        assert!(enforce_duplicate_policy("chapter-01", &plan, DuplicatePolicy::Reuse).is_ok());
        let err = enforce_duplicate_policy("chapter-01", &plan, DuplicatePolicy::Error).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'q1.yml' in chapter-01"));
        assert!(message.contains("concept_map[1].concepts[2].exam_questions[3]"));
    }
}
