//! Source model: the entities extracted from each analyzed file and the
//! aggregate [`AnalysisResult`] handed to renderers.
//!
//! All file paths are project-relative with forward-slash separators.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wildcard symbol bound by `from x import *`.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportKind {
    /// `import a.b` / `import a.b as c`
    Import,
    /// `from a import b` / `from . import b`
    FromImport,
}

/// One import statement (or one module of a multi-module `import a, b`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub kind: ImportKind,
    /// Dotted source module; `None` for `from . import x`.
    pub module: Option<String>,
    /// Bound local names in declaration order.
    pub names: Vec<String>,
    pub is_relative: bool,
    /// Number of leading dots of a relative import.
    pub level: u32,
    pub line_number: usize,
}

impl ImportRecord {
    /// `import module [as alias]`, binding `bound_name`.
    pub fn plain(module: impl Into<String>, bound_name: impl Into<String>, line_number: usize) -> Self {
        Self {
            kind: ImportKind::Import,
            module: Some(module.into()),
            names: vec![bound_name.into()],
            is_relative: false,
            level: 0,
            line_number,
        }
    }

    /// `from [.]*module import names`.
    pub fn from_import(
        module: Option<String>,
        names: Vec<String>,
        level: u32,
        line_number: usize,
    ) -> Self {
        Self {
            kind: ImportKind::FromImport,
            module,
            names,
            is_relative: level > 0,
            level,
            line_number,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.names.iter().any(|name| name == WILDCARD)
    }

    /// Whether this statement binds `name` in the importing file.
    pub fn binds(&self, name: &str) -> bool {
        self.names.iter().any(|bound| bound == name)
    }

    /// Text before the first dot of the source module.
    pub fn root_name(&self) -> Option<&str> {
        self.module
            .as_deref()
            .and_then(|module| module.split('.').next())
            .filter(|root| !root.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    pub file_path: String,
    pub line_number: usize,
    pub methods: Vec<String>,
    pub attributes: Vec<String>,
    pub base_classes: Vec<String>,
    pub docstring: Option<String>,
}

impl ClassEntity {
    pub fn new(name: impl Into<String>, file_path: impl Into<String>, line_number: usize) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            line_number,
            methods: Vec::new(),
            attributes: Vec::new(),
            base_classes: Vec::new(),
            docstring: None,
        }
    }

    /// Key of this class in [`AnalysisResult::classes`].
    pub fn key(&self) -> String {
        class_key(&self.file_path, &self.name)
    }
}

pub fn class_key(file_path: &str, class_name: &str) -> String {
    format!("{}::{}", file_path, class_name)
}

/// A top-level function. Methods and nested functions are not indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntity {
    pub name: String,
    pub file_path: String,
    pub line_number: usize,
    pub parameters: Vec<String>,
    pub docstring: Option<String>,
}

/// A dotted attribute access rooted at a bare name, e.g. `models.Model`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReference {
    pub base_name: String,
    pub full_path: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntity {
    pub path: String,
    pub source_text: String,
    pub imports: Vec<ImportRecord>,
    pub classes: Vec<ClassEntity>,
    pub functions: Vec<FunctionEntity>,
    pub dependencies: BTreeSet<String>,
    /// Inverse of `dependencies`, rebuilt by the graph builder.
    pub dependents: BTreeSet<String>,
    pub class_references: Vec<ClassReference>,
    pub ai_documentation: Option<String>,
    pub ai_summary: Option<String>,
    pub ai_purpose: Option<String>,
}

impl FileEntity {
    pub fn new(path: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source_text: source_text.into(),
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            class_references: Vec::new(),
            ai_documentation: None,
            ai_summary: None,
            ai_purpose: None,
        }
    }

    pub fn is_package_init(&self) -> bool {
        self.path == "__init__.py" || self.path.ends_with("/__init__.py")
    }

    pub fn has_annotation(&self) -> bool {
        self.ai_documentation.is_some() || self.ai_summary.is_some() || self.ai_purpose.is_some()
    }
}

/// A recoverable per-file problem surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWarning {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Analyzed files in discovery order.
    pub files: IndexMap<String, FileEntity>,
    /// Global class index keyed by `"{file}::{class}"`.
    pub classes: IndexMap<String, ClassEntity>,
    /// Library root -> import count, most used first.
    pub external_libraries: IndexMap<String, usize>,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parsed file and indexes its classes.
    pub fn insert_file(&mut self, file: FileEntity) {
        for class in &file.classes {
            self.classes.insert(class.key(), class.clone());
        }
        self.files.insert(file.path.clone(), file);
    }

    pub fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(AnalysisWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// File-level dependency graph. This is a view over each file's
    /// `dependencies`, not a second copy.
    pub fn dependencies_graph(&self) -> IndexMap<&str, &BTreeSet<String>> {
        self.files
            .iter()
            .map(|(path, file)| (path.as_str(), &file.dependencies))
            .collect()
    }

    pub fn dependencies_of(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.files.get(path).map(|file| &file.dependencies)
    }

    pub fn dependents_of(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.files.get(path).map(|file| &file.dependents)
    }

    pub fn edge_count(&self) -> usize {
        self.files.values().map(|file| file.dependencies.len()).sum()
    }
}
