use anyhow::{Context, Result};
use petgraph::visit::EdgeRef;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, GraphConfig};
use crate::core::{AnalysisResult, DependencyGraph, FileEntity};

pub const FILE_GRAPH_NAME: &str = "files.dot";
pub const CLASS_GRAPH_NAME: &str = "classes.dot";

const INIT_COLOR: &str = "#e1bee7";
const CLASSES_AND_FUNCTIONS_COLOR: &str = "#81c784";
const CLASSES_COLOR: &str = "#64b5f6";
const FUNCTIONS_COLOR: &str = "#ffb74d";
const OTHER_COLOR: &str = "#e0e0e0";
const EDGE_COLOR: &str = "#666666";

const CLASS_PALETTE: [&str; 6] = [
    "#ffcdd2", "#f8bbd9", "#e1bee7", "#d1c4e9", "#c5cae9", "#bbdefb",
];

/// Graphviz rendering of the file dependency graph and the class
/// inheritance graph.
pub struct DotFormatter {
    graph_config: GraphConfig,
}

impl DotFormatter {
    pub fn new(graph_config: GraphConfig) -> Self {
        Self { graph_config }
    }

    /// Writes the graphs selected by `config.visualization_types` into the
    /// output directory and returns the written paths.
    pub fn write_outputs(&self, result: &AnalysisResult, config: &Config) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if config.wants_file_graph() {
            let path = config.output_directory.join(FILE_GRAPH_NAME);
            self.write(&path, &self.format_file_graph(result))?;
            written.push(path);
        }
        if config.wants_class_graph() {
            let path = config.output_directory.join(CLASS_GRAPH_NAME);
            self.write(&path, &self.format_class_graph(result))?;
            written.push(path);
        }

        Ok(written)
    }

    pub fn format_file_graph(&self, result: &AnalysisResult) -> String {
        let graph = DependencyGraph::from_files(result);
        let mut out = String::new();
        self.open_graph(&mut out, "files");

        for index in graph.graph().node_indices() {
            let node = &graph.graph()[index];
            let Some(file) = result.files.get(&node.id) else {
                continue;
            };
            let _ = writeln!(
                out,
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\", tooltip=\"{}\"];",
                escape(&node.id),
                escape(&node.label),
                file_color(file),
                escape(&file_tooltip(file))
            );
        }

        for edge in graph.graph().edge_references() {
            let source = &graph.graph()[edge.source()];
            let target = &graph.graph()[edge.target()];
            let _ = writeln!(
                out,
                "  \"{}\" -> \"{}\" [color=\"{}\"];",
                escape(&source.id),
                escape(&target.id),
                EDGE_COLOR
            );
        }

        out.push_str("}\n");
        out
    }

    pub fn format_class_graph(&self, result: &AnalysisResult) -> String {
        let graph = DependencyGraph::from_classes(result);
        let mut out = String::new();
        self.open_graph(&mut out, "classes");

        for index in graph.graph().node_indices() {
            let node = &graph.graph()[index];
            let tooltip = result
                .classes
                .get(&node.id)
                .map(|class| {
                    format!(
                        "{}\n{}:{}\nMethods: {}\nAttributes: {}",
                        class.name,
                        class.file_path,
                        class.line_number,
                        class.methods.len(),
                        class.attributes.len()
                    )
                })
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\", tooltip=\"{}\"];",
                escape(&node.id),
                escape(&node.label),
                class_color(&node.file_path),
                escape(&tooltip)
            );
        }

        for edge in graph.graph().edge_references() {
            let source = &graph.graph()[edge.source()];
            let target = &graph.graph()[edge.target()];
            let _ = writeln!(
                out,
                "  \"{}\" -> \"{}\" [label=\"inherits\"];",
                escape(&source.id),
                escape(&target.id)
            );
        }

        out.push_str("}\n");
        out
    }

    fn open_graph(&self, out: &mut String, name: &str) {
        let layout = if self.graph_config.physics_enabled {
            "fdp"
        } else {
            "dot"
        };
        let rankdir = if self.graph_config.hierarchical_layout {
            "TB"
        } else {
            "LR"
        };
        let _ = writeln!(out, "digraph {} {{", name);
        let _ = writeln!(out, "  layout={};", layout);
        let _ = writeln!(out, "  rankdir={};", rankdir);
        out.push_str("  node [shape=box, style=\"rounded,filled\"];\n");
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

pub fn file_color(file: &FileEntity) -> &'static str {
    let has_classes = !file.classes.is_empty();
    let has_functions = !file.functions.is_empty();

    if file.is_package_init() {
        INIT_COLOR
    } else if has_classes && has_functions {
        CLASSES_AND_FUNCTIONS_COLOR
    } else if has_classes {
        CLASSES_COLOR
    } else if has_functions {
        FUNCTIONS_COLOR
    } else {
        OTHER_COLOR
    }
}

/// Colour shared by every class of one file; stable across runs.
pub fn class_color(file_path: &str) -> &'static str {
    CLASS_PALETTE[(fnv1a(file_path.as_bytes()) % CLASS_PALETTE.len() as u32) as usize]
}

fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

fn file_tooltip(file: &FileEntity) -> String {
    format!(
        "{}\nClasses: {}\nFunctions: {}\nImports: {}\nDependencies: {}\nDependents: {}",
        file.path,
        file.classes.len(),
        file.functions.len(),
        file.imports.len(),
        file.dependencies.len(),
        file.dependents.len()
    )
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
