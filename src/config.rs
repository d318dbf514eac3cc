use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::RepairError;

pub const DEFAULT_CONTENT_ROOT: &str = "public/textbook/content";
pub const ROOT_ENV: &str = "CONCEPT_MAP_ROOT";
pub const DUPLICATES_ENV: &str = "CONCEPT_MAP_DUPLICATES";

/// What to do when two references in one chapter point at the same question file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Share one stub between all references (the first one creates it).
    #[default]
    Reuse,
    /// Refuse to touch the chapter.
    Error,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reuse => "reuse",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = RepairError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reuse" => Ok(Self::Reuse),
            "error" => Ok(Self::Error),
            other => Err(RepairError::Config(format!(
                "unknown duplicate policy '{other}' (expected 'reuse' or 'error')"
            ))),
        }
    }
}

/// Settings for one repair or check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairConfig {
    /// Directory holding the `chapter-NN` folders.
    pub root: PathBuf,
    pub duplicates: DuplicatePolicy,
}

impl RepairConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            duplicates: DuplicatePolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `CONCEPT_MAP_ROOT`: content root (defaults to `public/textbook/content`)
    /// - `CONCEPT_MAP_DUPLICATES`: `reuse` or `error`
    pub fn from_env() -> Result<Self, RepairError> {
        let root = std::env::var(ROOT_ENV).unwrap_or_else(|_| DEFAULT_CONTENT_ROOT.to_string());
        let duplicates = match std::env::var(DUPLICATES_ENV) {
            Ok(raw) => raw.parse()?,
            Err(_) => DuplicatePolicy::default(),
        };
        Ok(Self {
            root: PathBuf::from(root),
            duplicates,
        })
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }
}
