use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::config::{DuplicatePolicy, RepairConfig};
use crate::content::chapters::discover_chapters;
use crate::content::concept_map::CONCEPT_MAP_FILE;
use crate::content::repair::{chapter_name, plan_chapter, RepairAction};
use crate::error::RepairError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub chapters_checked: usize,
    pub pending_fixes: usize,
    pub pending_stubs: usize,
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    /// True when a repair run would change something or has something to report.
    pub fn needs_attention(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity <= ValidationSeverity::Warning)
    }
}

/// Read-only pass over one chapter: what would a repair change?
/// Shared question files are informational under [`DuplicatePolicy::Reuse`]
/// and errors under [`DuplicatePolicy::Error`].
pub fn check_chapter(
    report: &mut ValidationReport,
    chapter_dir: &Path,
    duplicates: DuplicatePolicy,
) -> Result<(), RepairError> {
    let chapter = chapter_name(chapter_dir);
    report.chapters_checked += 1;

    let Some((_, plan)) = plan_chapter(chapter_dir)? else {
        report.push(
            ValidationSeverity::Info,
            chapter,
            format!("no {CONCEPT_MAP_FILE}, chapter skipped"),
        );
        return Ok(());
    };

    for action in &plan.actions {
        match action {
            RepairAction::Rewrite { location, from, to } => {
                report.pending_fixes += 1;
                report.push(
                    ValidationSeverity::Warning,
                    format!("{chapter} {location}"),
                    format!("non-canonical reference '{from}' (expected '{to}')"),
                );
            }
            RepairAction::CreateStub {
                location,
                reference,
            } => {
                report.pending_stubs += 1;
                report.push(
                    ValidationSeverity::Error,
                    format!("{chapter} {location}"),
                    format!("question file '{reference}' is missing"),
                );
            }
        }
    }

    let duplicate_severity = match duplicates {
        DuplicatePolicy::Reuse => ValidationSeverity::Info,
        DuplicatePolicy::Error => ValidationSeverity::Error,
    };
    for duplicate in &plan.duplicates {
        report.push(
            duplicate_severity,
            format!("{chapter} {}", duplicate.second),
            format!(
                "'{}' is also referenced at {}",
                duplicate.filename, duplicate.first
            ),
        );
    }

    Ok(())
}

pub fn check_root(config: &RepairConfig) -> Result<ValidationReport, RepairError> {
    let mut report = ValidationReport::default();
    for chapter_dir in discover_chapters(&config.root)? {
        check_chapter(&mut report, &chapter_dir, config.duplicates)?;
    }
    Ok(report)
}
