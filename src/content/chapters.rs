//! Finds the chapter folders under a content root.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RepairError;

pub const CHAPTER_PREFIX: &str = "chapter-";

/// `chapter-` followed by one or more ASCII digits.
pub fn is_chapter_name(name: &str) -> bool {
    name.strip_prefix(CHAPTER_PREFIX)
        .map_or(false, |n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Chapter directories directly under `root`, sorted by name.
pub fn discover_chapters(root: &Path) -> Result<Vec<PathBuf>, RepairError> {
    if !root.is_dir() {
        return Err(RepairError::Config(format!(
            "content root not found: {}",
            root.display()
        )));
    }

    let read_err = |source: std::io::Error| RepairError::Read {
        path: root.to_path_buf(),
        source,
    };
    let mut chapters = Vec::new();
    for entry in fs::read_dir(root).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if !path.is_dir() {
            continue;
        }
        let is_chapter = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, is_chapter_name);
        if is_chapter {
            chapters.push(path);
        }
    }
    chapters.sort();
    Ok(chapters)
}
