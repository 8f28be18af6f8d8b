use indexmap::IndexMap;
use petgraph::{algo::tarjan_scc, graph::NodeIndex, Directed, Graph};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use super::model::{AnalysisResult, ClassEntity, FileEntity};
use super::module_map::ModuleMap;
use super::resolver::ImportResolver;

/// Edge counts produced by one [`GraphBuilder::build`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub files: usize,
    /// Edges found by resolving import statements.
    pub import_edges: usize,
    /// Edges found only through attribute usage of imported names.
    pub usage_edges: usize,
}

impl GraphStats {
    pub fn total_edges(&self) -> usize {
        self.import_edges + self.usage_edges
    }
}

/// Builds the file dependency graph in place on an already parsed file map.
///
/// Forward edges come from import resolution and from usage augmentation;
/// the reverse edges (`dependents`) are always rebuilt by inverting them.
pub struct GraphBuilder<'a> {
    resolver: ImportResolver<'a>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(modules: &'a ModuleMap) -> Self {
        Self {
            resolver: ImportResolver::new(modules),
        }
    }

    pub fn build(&self, files: &mut IndexMap<String, FileEntity>) -> GraphStats {
        let resolved: Vec<(BTreeSet<String>, BTreeSet<String>)> = files
            .par_iter()
            .map(|(path, file)| self.resolve_file(path, file))
            .collect();

        let mut stats = GraphStats {
            files: files.len(),
            ..GraphStats::default()
        };

        for (file, (imports, usage)) in files.values_mut().zip(resolved) {
            stats.import_edges += imports.len();
            stats.usage_edges += usage.len();

            let mut dependencies = imports;
            dependencies.extend(usage);
            file.dependencies = dependencies;
        }

        link_dependents(files);
        stats
    }

    /// Import edges and usage-only edges of a single file, self-edges removed.
    pub fn resolve_file(
        &self,
        path: &str,
        file: &FileEntity,
    ) -> (BTreeSet<String>, BTreeSet<String>) {
        let per_import: Vec<BTreeSet<String>> = file
            .imports
            .iter()
            .map(|import| self.resolver.resolve(import, path))
            .collect();

        let imports: BTreeSet<String> = per_import
            .iter()
            .flatten()
            .filter(|target| target.as_str() != path)
            .cloned()
            .collect();

        let mut usage = BTreeSet::new();
        for reference in &file.class_references {
            for (import, targets) in file.imports.iter().zip(&per_import) {
                if !import.binds(&reference.base_name) {
                    continue;
                }

                let chain = self.resolver.resolve_chain(import, reference, path);
                for target in targets.iter().chain(chain.iter()) {
                    if target != path && !imports.contains(target) {
                        usage.insert(target.clone());
                    }
                }
            }
        }

        (imports, usage)
    }
}

/// Resolves every file of `result` against `modules` and links dependents.
pub fn build_dependency_graph(result: &mut AnalysisResult, modules: &ModuleMap) -> GraphStats {
    GraphBuilder::new(modules).build(&mut result.files)
}

/// Rebuilds every file's `dependents` as the inverse of `dependencies`.
/// Targets that are not known files are ignored.
pub fn link_dependents(files: &mut IndexMap<String, FileEntity>) {
    let mut reverse: HashMap<String, BTreeSet<String>> = HashMap::new();

    for (path, file) in files.iter() {
        for target in &file.dependencies {
            if target != path && files.contains_key(target) {
                reverse
                    .entry(target.clone())
                    .or_default()
                    .insert(path.clone());
            }
        }
    }

    for (path, file) in files.iter_mut() {
        file.dependents = reverse.remove(path).unwrap_or_default();
    }
}

/// Inheritance edges `class key -> base class key`.
///
/// A base matches the first indexed class (other than the subclass itself)
/// whose name equals the base's last dotted segment.
pub fn inheritance_edges(classes: &IndexMap<String, ClassEntity>) -> Vec<(String, String)> {
    let mut edges = Vec::new();

    for (key, class) in classes {
        for base in &class.base_classes {
            let simple_name = base.rsplit('.').next().unwrap_or(base);
            let parent = classes
                .iter()
                .find(|(other_key, other)| *other_key != key && other.name == simple_name);

            if let Some((parent_key, _)) = parent {
                edges.push((key.clone(), parent_key.clone()));
            }
        }
    }

    edges
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
pub enum NodeType {
    File,
    Class,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
pub enum EdgeType {
    Import,
    Inheritance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub node_type: NodeType,
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub edge_type: EdgeType,
    pub source_id: String,
    pub target_id: String,
}

impl Node {
    pub fn new(id: String, label: String, node_type: NodeType, file_path: String) -> Self {
        Self {
            id,
            label,
            node_type,
            file_path,
        }
    }
}

impl Edge {
    pub fn new(edge_type: EdgeType, source_id: String, target_id: String) -> Self {
        Self {
            edge_type,
            source_id,
            target_id,
        }
    }
}

/// petgraph view of the file graph or the class graph, for renderers and
/// graph algorithms.
pub struct DependencyGraph {
    graph: Graph<Node, Edge, Directed>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
        }
    }

    /// One node per analyzed file, one edge per dependency.
    pub fn from_files(result: &AnalysisResult) -> Self {
        let mut graph = Self::new();

        for path in result.files.keys() {
            graph.add_node(Node::new(
                path.clone(),
                file_label(path),
                NodeType::File,
                path.clone(),
            ));
        }

        for (path, file) in &result.files {
            for target in &file.dependencies {
                graph.add_edge(Edge::new(EdgeType::Import, path.clone(), target.clone()));
            }
        }

        graph
    }

    /// One node per indexed class, one edge per resolved base class.
    pub fn from_classes(result: &AnalysisResult) -> Self {
        let mut graph = Self::new();

        for (key, class) in &result.classes {
            graph.add_node(Node::new(
                key.clone(),
                class.name.clone(),
                NodeType::Class,
                class.file_path.clone(),
            ));
        }

        for (source, target) in inheritance_edges(&result.classes) {
            graph.add_edge(Edge::new(EdgeType::Inheritance, source, target));
        }

        graph
    }

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&node.id) {
            return index;
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(id, index);
        index
    }

    /// Returns `None` when either endpoint is unknown.
    pub fn add_edge(&mut self, edge: Edge) -> Option<petgraph::graph::EdgeIndex> {
        let source_idx = self.node_map.get(&edge.source_id)?;
        let target_idx = self.node_map.get(&edge.target_id)?;
        Some(self.graph.add_edge(*source_idx, *target_idx, edge))
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn graph(&self) -> &Graph<Node, Edge, Directed> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Import cycles: strongly connected components with more than one node,
    /// each sorted by id.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut ids: Vec<String> = component
                    .into_iter()
                    .map(|index| self.graph[index].id.clone())
                    .collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn file_label(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}
