//! Placeholder question file written for references whose target is missing.

use std::fs;
use std::path::Path;

use crate::error::RepairError;

/// Every stub gets exactly this content; `id` is not incremented.
pub const STUB_TEMPLATE: &str = r#"id: 1
question: "TODO: Add question text"
answer: "TODO: Add answer"
vocab_answer: []
answer_kindergarten: "TODO: Add kindergarten-level answer"
vocab_kindergarten: []
answer_3rd_grade: "TODO: Add 3rd grade-level answer"
vocab_3rd_grade: []
answer_7th_grade: "TODO: Add 7th grade-level answer"
vocab_7th_grade: []
answer_high_school: "TODO: Add high school-level answer"
vocab_high_school: []
answer_undergraduate: "TODO: Add undergraduate-level answer"
vocab_undergraduate: []
topics: []
type: "conceptual"
points: 3
difficulty: "medium"
learning_objectives: []
"#;

/// Write the stub to `path`. Callers check for existence first; this never merges.
pub fn write_stub(path: &Path) -> Result<(), RepairError> {
    fs::write(path, STUB_TEMPLATE).map_err(|source| RepairError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::*;

    #[test]
    fn template_is_a_todo_question_document() {
        let stub: Value = serde_yaml::from_str(STUB_TEMPLATE).unwrap();
        assert_eq!(stub["id"].as_u64(), Some(1));
        assert_eq!(stub["type"].as_str(), Some("conceptual"));
        assert_eq!(stub["points"].as_u64(), Some(3));
        assert_eq!(stub["difficulty"].as_str(), Some("medium"));
        assert!(stub["question"].as_str().unwrap().starts_with("TODO"));
        assert!(stub["answer_undergraduate"]
            .as_str()
            .unwrap()
            .starts_with("TODO"));
        for key in ["vocab_answer", "topics", "learning_objectives"] {
            assert_eq!(stub[key].as_sequence().map(Vec::len), Some(0), "{key}");
        }
    }
}
