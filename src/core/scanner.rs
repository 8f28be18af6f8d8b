use anyhow::{Context, Result};
use glob::Pattern;
use rayon::prelude::*;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::module_map::PYTHON_SUFFIX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated.
    pub relative_path: String,
}

/// Discovers Python sources under a root, honouring glob ignore patterns.
///
/// A pattern excludes a file when it matches the relative path, the file
/// name, or any single path segment.
pub struct FileScanner {
    ignore_patterns: Vec<Pattern>,
}

impl FileScanner {
    pub fn new(ignore_patterns: &[String]) -> Result<Self> {
        let ignore_patterns = ignore_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).with_context(|| format!("invalid ignore pattern '{pattern}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { ignore_patterns })
    }

    /// Files in a stable, name-sorted walk order.
    pub fn scan_directory(&self, root_path: &Path) -> Result<Vec<SourceFile>> {
        if !root_path.is_dir() {
            anyhow::bail!("root directory does not exist: {}", root_path.display());
        }

        let entries: Vec<_> = WalkDir::new(root_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.ignores_segment(entry.file_name()))
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .collect();

        let files: Vec<SourceFile> = entries
            .par_iter()
            .filter_map(|entry| {
                let path = entry.path();
                let relative_path = relative_path(root_path, path)?;
                if !relative_path.ends_with(PYTHON_SUFFIX) || self.is_ignored(&relative_path) {
                    return None;
                }
                Some(SourceFile {
                    path: path.to_path_buf(),
                    relative_path,
                })
            })
            .collect();

        Ok(files)
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.ignore_patterns.iter().any(|pattern| {
            pattern.matches(relative_path)
                || relative_path.split('/').any(|segment| pattern.matches(segment))
        })
    }

    fn ignores_segment(&self, name: &std::ffi::OsStr) -> bool {
        let Some(name) = name.to_str() else {
            return false;
        };
        self.ignore_patterns.iter().any(|pattern| pattern.matches(name))
    }
}

/// `/`-separated path of `path` below `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
