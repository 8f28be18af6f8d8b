pub mod analyzer;
pub mod annotate;
pub mod externals;
pub mod graph;
pub mod model;
pub mod module_map;
pub mod resolver;
pub mod scanner;

pub use analyzer::ProjectAnalyzer;
pub use annotate::{annotate_files, Annotation, AnnotationError, AnnotationReport, Annotator};
pub use externals::{is_standard_library, ExternalLibraryCollector};
pub use graph::{
    build_dependency_graph, inheritance_edges, link_dependents, DependencyGraph, Edge, EdgeType,
    GraphBuilder, GraphStats, Node, NodeType,
};
pub use model::{
    class_key, AnalysisResult, AnalysisWarning, ClassEntity, ClassReference, FileEntity,
    FunctionEntity, ImportKind, ImportRecord, WILDCARD,
};
pub use module_map::{module_name_for_path, ModuleMap};
pub use resolver::{absolute_module_name, ImportResolver};
pub use scanner::{FileScanner, SourceFile};
