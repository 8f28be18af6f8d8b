use depmap::core::{
    build_dependency_graph, inheritance_edges, AnalysisResult, DependencyGraph, GraphBuilder,
    ModuleMap,
};
use depmap::parsers::python::PythonParser;
use depmap::parsers::LanguageParser;
use std::collections::BTreeSet;

fn project(files: &[(&str, &str)]) -> AnalysisResult {
    let parser = PythonParser::new().unwrap();
    let mut result = AnalysisResult::new();
    for (path, code) in files {
        result.insert_file(parser.parse_source(path, code.to_string()).unwrap());
    }
    result
}

fn build(result: &mut AnalysisResult) {
    let modules = ModuleMap::from_files(&result.files, "app");
    build_dependency_graph(result, &modules);
}

fn set(paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

#[test]
fn resolves_from_import_to_module_and_links_dependents() {
    let mut result = project(&[
        ("app/foo.py", ""),
        ("app/bar.py", "from app.foo import something\n"),
    ]);
    build(&mut result);

    assert_eq!(result.files["app/bar.py"].dependencies, set(&["app/foo.py"]));
    assert_eq!(result.files["app/foo.py"].dependents, set(&["app/bar.py"]));
    assert!(result.files["app/foo.py"].dependencies.is_empty());
    assert_eq!(result.edge_count(), 1);
}

#[test]
fn self_imports_never_become_edges() {
    let mut result = project(&[
        ("pkg/__init__.py", "from pkg import helpers\n"),
        ("pkg/helpers.py", "import pkg.helpers\n"),
    ]);
    build(&mut result);

    for (path, dependencies) in result.dependencies_graph() {
        assert!(!dependencies.contains(path), "{path} depends on itself");
    }
    assert_eq!(
        result.files["pkg/__init__.py"].dependencies,
        set(&["pkg/helpers.py"])
    );
}

#[test]
fn dependents_are_the_exact_inverse_of_dependencies() {
    let mut result = project(&[
        ("app/models.py", "import json\n"),
        ("app/services.py", "from app.models import User\nimport requests\n"),
        ("app/api.py", "from app import services\nfrom .models import User\n"),
        ("app/cli.py", "from app.api import run\nfrom app.services import *\n"),
    ]);
    build(&mut result);

    for (path, file) in &result.files {
        for target in &file.dependencies {
            assert!(result.files[target].dependents.contains(path));
        }
        for origin in &file.dependents {
            assert!(result.files[origin].dependencies.contains(path));
        }
    }
    assert_eq!(
        result.files["app/models.py"].dependents,
        set(&["app/api.py", "app/services.py"])
    );
}

#[test]
fn attribute_usage_adds_edges_import_resolution_missed() {
    let mut result = project(&[
        ("pkg/__init__.py", ""),
        ("pkg/sub/__init__.py", ""),
        ("pkg/sub/tool.py", "def run():\n    pass\n"),
        ("main.py", "import pkg\n\npkg.sub.tool.run()\n"),
    ]);
    let modules = ModuleMap::from_files(&result.files, "app");
    let stats = build_dependency_graph(&mut result, &modules);

    assert_eq!(
        result.files["main.py"].dependencies,
        set(&["pkg/__init__.py", "pkg/sub/__init__.py", "pkg/sub/tool.py"])
    );
    assert_eq!(stats.import_edges, 1);
    assert_eq!(stats.usage_edges, 2);
    assert_eq!(result.files["pkg/sub/tool.py"].dependents, set(&["main.py"]));
}

fn subpackage_project(main: &str) -> AnalysisResult {
    project(&[
        ("pkg/__init__.py", ""),
        ("pkg/sub/__init__.py", ""),
        ("pkg/sub/tool.py", "def run():\n    pass\n"),
        ("main.py", main),
    ])
}

#[test]
fn usage_through_a_from_imported_package_adds_its_submodule() {
    let mut result = subpackage_project("from pkg import sub\n\nsub.tool.run()\n");
    let modules = ModuleMap::from_files(&result.files, "app");

    let (imports, usage) =
        GraphBuilder::new(&modules).resolve_file("main.py", &result.files["main.py"]);
    assert_eq!(imports, set(&["pkg/__init__.py", "pkg/sub/__init__.py"]));
    assert_eq!(usage, set(&["pkg/sub/tool.py"]));

    build_dependency_graph(&mut result, &modules);
    assert_eq!(
        result.files["main.py"].dependencies,
        set(&["pkg/__init__.py", "pkg/sub/__init__.py", "pkg/sub/tool.py"])
    );
    assert_eq!(result.files["pkg/sub/tool.py"].dependents, set(&["main.py"]));
}

#[test]
fn usage_through_an_aliased_import_adds_its_submodule() {
    let mut result = subpackage_project("import pkg.sub as s\n\ns.tool.run()\n");
    let modules = ModuleMap::from_files(&result.files, "app");

    let (imports, usage) =
        GraphBuilder::new(&modules).resolve_file("main.py", &result.files["main.py"]);
    assert_eq!(imports, set(&["pkg/sub/__init__.py"]));
    assert_eq!(usage, set(&["pkg/sub/tool.py"]));

    build_dependency_graph(&mut result, &modules);
    assert_eq!(
        result.files["main.py"].dependencies,
        set(&["pkg/sub/__init__.py", "pkg/sub/tool.py"])
    );
    assert_eq!(result.files["pkg/sub/tool.py"].dependents, set(&["main.py"]));
}

#[test]
fn resolve_file_separates_import_and_usage_edges() {
    let result = project(&[
        ("lib/__init__.py", ""),
        ("lib/codec.py", ""),
        ("client.py", "import lib\nimport os\n\nlib.codec.decode(os.sep)\n"),
    ]);
    let modules = ModuleMap::from_files(&result.files, "app");
    let builder = GraphBuilder::new(&modules);

    let (imports, usage) = builder.resolve_file("client.py", &result.files["client.py"]);
    assert_eq!(imports, set(&["lib/__init__.py"]));
    assert_eq!(usage, set(&["lib/codec.py"]));
}

#[test]
fn file_graph_exports_to_petgraph_with_cycles() {
    let mut result = project(&[
        ("a.py", "import b\n"),
        ("b.py", "import c\n"),
        ("c.py", "import a\n"),
        ("d.py", "import a\n"),
    ]);
    build(&mut result);

    let graph = DependencyGraph::from_files(&result);
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(
        graph.cycles(),
        vec![vec!["a.py".to_string(), "b.py".to_string(), "c.py".to_string()]]
    );
}

#[test]
fn class_graph_links_subclasses_to_project_bases() {
    let result = project(&[
        ("models/base.py", "class Base:\n    pass\n"),
        (
            "models/user.py",
            "from models import base\n\nclass User(base.Base):\n    pass\n\nclass Admin(User, Exception):\n    pass\n",
        ),
    ]);

    let edges = inheritance_edges(&result.classes);
    assert_eq!(
        edges,
        vec![
            (
                "models/user.py::User".to_string(),
                "models/base.py::Base".to_string()
            ),
            (
                "models/user.py::Admin".to_string(),
                "models/user.py::User".to_string()
            ),
        ]
    );

    let graph = DependencyGraph::from_classes(&result);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.cycles().is_empty());
}
