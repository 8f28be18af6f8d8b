pub mod cache;
pub mod common;
pub mod python;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::FileEntity;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {path} at line {line}, column {column}")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
    },

    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("parser produced no syntax tree for {0}")]
    NoTree(String),
}

pub trait LanguageParser {
    /// Extracts a [`FileEntity`] from already decoded source text.
    fn parse_source(&self, relative_path: &str, source: String) -> Result<FileEntity, ParseError>;

    /// Reads, decodes and parses `file_path`, identified as `relative_path`.
    fn parse_file(&self, file_path: &Path, relative_path: &str) -> Result<FileEntity, ParseError> {
        let source = common::read_source(file_path).map_err(|source| ParseError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
        self.parse_source(relative_path, source)
    }

    fn language_name(&self) -> &str;
}
