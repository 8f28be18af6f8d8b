use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

use crate::core::{AnalysisResult, DependencyGraph, FileEntity};

/// Machine-readable analysis report.
pub struct JsonReportFormatter {
    /// Include `source_text` of every file
    include_source: bool,
}

impl JsonReportFormatter {
    pub fn new() -> Self {
        Self {
            include_source: false,
        }
    }

    pub fn with_source(mut self, include_source: bool) -> Self {
        self.include_source = include_source;
        self
    }

    pub fn format_to_file(&self, result: &AnalysisResult, output_path: &Path) -> Result<()> {
        let content = self.format_report(result)?;
        fs::write(output_path, content)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(())
    }

    pub fn format_report(&self, result: &AnalysisResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.build_report(result))?)
    }

    pub fn build_report(&self, result: &AnalysisResult) -> Value {
        let files: Map<String, Value> = result
            .files
            .iter()
            .map(|(path, file)| (path.clone(), self.file_entry(file)))
            .collect();

        let dependencies_graph: Map<String, Value> = result
            .dependencies_graph()
            .into_iter()
            .map(|(path, dependencies)| (path.to_string(), json!(dependencies)))
            .collect();

        let external_libraries: Vec<Value> = result
            .external_libraries
            .iter()
            .map(|(name, count)| json!({ "name": name, "count": count }))
            .collect();

        let function_count: usize = result.files.values().map(|file| file.functions.len()).sum();
        let cycles = DependencyGraph::from_files(result).cycles();

        json!({
            "meta": {
                "files": result.files.len(),
                "classes": result.classes.len(),
                "functions": function_count,
                "dependency_edges": result.edge_count(),
                "external_libraries": result.external_libraries.len(),
                "warnings": result.warnings.len(),
            },
            "files": files,
            "classes": result.classes,
            "dependencies_graph": dependencies_graph,
            "external_libraries": external_libraries,
            "cycles": cycles,
            "warnings": result.warnings,
        })
    }

    fn file_entry(&self, file: &FileEntity) -> Value {
        let classes: Vec<&str> = file.classes.iter().map(|class| class.name.as_str()).collect();

        let mut entry = json!({
            "imports": file.imports,
            "classes": classes,
            "functions": file.functions,
            "dependencies": file.dependencies,
            "dependents": file.dependents,
            "class_references": file.class_references.len(),
        });

        if file.has_annotation() {
            entry["annotation"] = json!({
                "documentation": file.ai_documentation,
                "summary": file.ai_summary,
                "purpose": file.ai_purpose,
            });
        }
        if self.include_source {
            entry["source_text"] = json!(file.source_text);
        }

        entry
    }
}

impl Default for JsonReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
