//! Parses `concept-map.yml` into an order-preserving YAML tree.
//! Only the `exam_questions` lists are ever read or rewritten; every other key
//! rides along untouched.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::RepairError;

pub const CONCEPT_MAP_FILE: &str = "concept-map.yml";
pub const QUESTIONS_DIR: &str = "questions";

const CONCEPT_MAP_KEY: &str = "concept_map";
const CONCEPTS_KEY: &str = "concepts";
const EXAM_QUESTIONS_KEY: &str = "exam_questions";

/// Position of one reference: category → concept → question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefLocation {
    pub category: usize,
    pub concept: usize,
    pub question: usize,
}

impl fmt::Display for RefLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{CONCEPT_MAP_KEY}[{}].{CONCEPTS_KEY}[{}].{EXAM_QUESTIONS_KEY}[{}]",
            self.category, self.concept, self.question
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRef {
    pub location: RefLocation,
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct ConceptMap {
    path: PathBuf,
    document: Value,
}

impl ConceptMap {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RepairError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RepairError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &raw)
    }

    /// Parse a document that claims to live at `path`. The path is only used
    /// for error messages and by [`ConceptMap::save`].
    pub fn from_yaml(path: impl Into<PathBuf>, raw: &str) -> Result<Self, RepairError> {
        let path = path.into();
        let document: Value = serde_yaml::from_str(raw).map_err(|source| RepairError::Parse {
            path: path.clone(),
            source,
        })?;
        match document {
            Value::Mapping(_) => Ok(Self { path, document }),
            Value::Null => Err(RepairError::invalid(path, "document is empty")),
            _ => Err(RepairError::invalid(path, "top level must be a mapping")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every exam question reference, in document order.
    pub fn references(&self) -> Result<Vec<QuestionRef>, RepairError> {
        let mut refs = Vec::new();
        let Some(categories) = self.document.get(CONCEPT_MAP_KEY) else {
            return Ok(refs);
        };

        for (category_index, category) in list(categories, &self.path, CONCEPT_MAP_KEY)?
            .iter()
            .enumerate()
        {
            let category_context = format!("{CONCEPT_MAP_KEY}[{category_index}]");
            if !category.is_mapping() {
                return Err(RepairError::invalid(
                    &self.path,
                    format!("{category_context}: category is not a mapping"),
                ));
            }
            let Some(concepts) = category.get(CONCEPTS_KEY) else {
                continue;
            };
            let concepts_context = format!("{category_context}.{CONCEPTS_KEY}");

            for (concept_index, concept) in list(concepts, &self.path, &concepts_context)?
                .iter()
                .enumerate()
            {
                let concept_context = format!("{concepts_context}[{concept_index}]");
                if !concept.is_mapping() {
                    return Err(RepairError::invalid(
                        &self.path,
                        format!("{concept_context}: concept is not a mapping"),
                    ));
                }
                let Some(questions) = concept.get(EXAM_QUESTIONS_KEY) else {
                    continue;
                };
                let questions_context = format!("{concept_context}.{EXAM_QUESTIONS_KEY}");

                for (question_index, question) in list(questions, &self.path, &questions_context)?
                    .iter()
                    .enumerate()
                {
                    let location = RefLocation {
                        category: category_index,
                        concept: concept_index,
                        question: question_index,
                    };
                    let Some(reference) = question.as_str() else {
                        return Err(RepairError::invalid(
                            &self.path,
                            format!("{location}: expected a file path string"),
                        ));
                    };
                    refs.push(QuestionRef {
                        location,
                        reference: reference.to_string(),
                    });
                }
            }
        }

        Ok(refs)
    }

    /// Replace the reference at `location` in place.
    pub fn set_reference(&mut self, location: RefLocation, value: &str) -> Result<(), RepairError> {
        let path = &self.path;
        let slot = self
            .document
            .get_mut(CONCEPT_MAP_KEY)
            .and_then(|categories| categories.get_mut(location.category))
            .and_then(|category| category.get_mut(CONCEPTS_KEY))
            .and_then(|concepts| concepts.get_mut(location.concept))
            .and_then(|concept| concept.get_mut(EXAM_QUESTIONS_KEY))
            .and_then(|questions| questions.get_mut(location.question))
            .ok_or_else(|| RepairError::invalid(path, format!("{location}: no such reference")))?;
        *slot = Value::String(value.to_string());
        Ok(())
    }

    /// Block-style YAML, keys in document order, unicode written literally.
    pub fn to_yaml(&self) -> Result<String, RepairError> {
        serde_yaml::to_string(&self.document).map_err(RepairError::Serialize)
    }

    pub fn save(&self) -> Result<(), RepairError> {
        let yaml = self.to_yaml()?;
        fs::write(&self.path, yaml).map_err(|source| RepairError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// A missing or null list counts as empty.
fn list<'a>(value: &'a Value, path: &Path, context: &str) -> Result<&'a [Value], RepairError> {
    match value {
        Value::Null => Ok(&[]),
        Value::Sequence(items) => Ok(items.as_slice()),
        _ => Err(RepairError::invalid(path, format!("{context}: expected a list"))),
    }
}
