use depmap::core::{
    absolute_module_name, ClassReference, ImportRecord, ImportResolver, ModuleMap, WILDCARD,
};
use std::collections::BTreeSet;

fn set(paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

fn from(module: &str, names: &[&str]) -> ImportRecord {
    ImportRecord::from_import(
        Some(module.to_string()),
        names.iter().map(|n| n.to_string()).collect(),
        0,
        1,
    )
}

fn relative(module: Option<&str>, names: &[&str], level: u32) -> ImportRecord {
    ImportRecord::from_import(
        module.map(str::to_string),
        names.iter().map(|n| n.to_string()).collect(),
        level,
        1,
    )
}

#[test]
fn relative_levels_trim_the_importing_module() {
    let one = relative(Some("d"), &["x"], 1);
    let two = relative(Some("d"), &["x"], 2);
    assert_eq!(absolute_module_name(&one, "a/b/c.py").as_deref(), Some("a.b.d"));
    assert_eq!(absolute_module_name(&two, "a/b/c.py").as_deref(), Some("a.d"));

    let bare = relative(None, &["x"], 1);
    assert_eq!(absolute_module_name(&bare, "a/b/c.py").as_deref(), Some("a.b"));

    let absolute = from("pkg.mod", &["x"]);
    assert_eq!(absolute_module_name(&absolute, "a/b/c.py").as_deref(), Some("pkg.mod"));
}

#[test]
fn direct_hit_on_module_without_submodule() {
    let map = ModuleMap::build(["app/foo.py", "app/bar.py"], "app");
    let resolver = ImportResolver::new(&map);

    let import = from("app.foo", &["something"]);
    assert_eq!(resolver.resolve(&import, "app/bar.py"), set(&["app/foo.py"]));
}

#[test]
fn per_symbol_fanout_yields_each_submodule() {
    let map = ModuleMap::build(["pkg/__init__.py", "pkg/a.py", "pkg/b.py", "main.py"], "app");
    let resolver = ImportResolver::new(&map);

    let import = from("pkg", &["a", "b"]);
    assert_eq!(
        resolver.resolve(&import, "main.py"),
        set(&["pkg/__init__.py", "pkg/a.py", "pkg/b.py"])
    );
}

#[test]
fn resolution_is_idempotent() {
    let map = ModuleMap::build(["pkg/__init__.py", "pkg/a.py", "pkg/deep/a.py"], "app");
    let resolver = ImportResolver::new(&map);
    let import = from("pkg", &["a"]);

    let first = resolver.resolve(&import, "main.py");
    let second = resolver.resolve(&import, "main.py");
    assert_eq!(first, second);
}

#[test]
fn nested_submodules_match_by_suffix() {
    let map = ModuleMap::build(["pkg/deep/tasks.py", "pkg/other.py"], "app");
    let resolver = ImportResolver::new(&map);

    let import = from("pkg", &["tasks"]);
    assert_eq!(resolver.resolve(&import, "main.py"), set(&["pkg/deep/tasks.py"]));
}

#[test]
fn path_probe_finds_symbol_files() {
    let map = ModuleMap::build(["lib/io/reader.py"], "app");
    let resolver = ImportResolver::new(&map);

    let import = from("lib.io", &["reader"]);
    assert_eq!(resolver.resolve(&import, "main.py"), set(&["lib/io/reader.py"]));
}

#[test]
fn wildcard_only_resolves_the_module_itself() {
    let map = ModuleMap::build(["pkg/__init__.py", "pkg/star.py"], "app");
    let resolver = ImportResolver::new(&map);

    let import = from("pkg", &[WILDCARD]);
    assert_eq!(resolver.resolve(&import, "main.py"), set(&["pkg/__init__.py"]));
}

#[test]
fn namespace_alias_resolves_prefixed_imports() {
    let map = ModuleMap::build(["services/mail.py", "api.py"], "app");
    let resolver = ImportResolver::new(&map);

    let import = from("app.services.mail", &["send"]);
    assert_eq!(resolver.resolve(&import, "api.py"), set(&["services/mail.py"]));
}

#[test]
fn unknown_and_external_imports_resolve_to_nothing() {
    let map = ModuleMap::build(["main.py"], "app");
    let resolver = ImportResolver::new(&map);

    assert!(resolver.resolve(&from("requests", &["get"]), "main.py").is_empty());
    assert!(resolver
        .resolve(&ImportRecord::plain("numpy", "np", 1), "main.py")
        .is_empty());
}

#[test]
fn relative_imports_resolve_against_the_package() {
    let map = ModuleMap::build(["pkg/a.py", "pkg/b.py", "pkg/sub/c.py"], "app");
    let resolver = ImportResolver::new(&map);

    let sibling = relative(None, &["b"], 1);
    assert_eq!(resolver.resolve(&sibling, "pkg/a.py"), set(&["pkg/b.py"]));

    let parent = relative(Some("a"), &["thing"], 2);
    assert_eq!(resolver.resolve(&parent, "pkg/sub/c.py"), set(&["pkg/a.py"]));
}

#[test]
fn attribute_chains_reveal_submodules() {
    let map = ModuleMap::build(["pkg/__init__.py", "pkg/sub/__init__.py", "pkg/sub/tool.py"], "app");
    let resolver = ImportResolver::new(&map);

    let import = ImportRecord::plain("pkg", "pkg", 1);
    let reference = ClassReference {
        base_name: "pkg".to_string(),
        full_path: "pkg.sub.tool.run".to_string(),
        line: 3,
    };

    assert_eq!(
        resolver.resolve_chain(&import, &reference, "main.py"),
        set(&["pkg/sub/__init__.py", "pkg/sub/tool.py"])
    );
    assert_eq!(
        resolver.resolve_reference(&import, &reference, "main.py"),
        set(&["pkg/__init__.py", "pkg/sub/__init__.py", "pkg/sub/tool.py"])
    );
}

#[test]
fn chains_on_unbound_names_resolve_to_nothing() {
    let map = ModuleMap::build(["pkg/__init__.py", "pkg/tool.py"], "app");
    let resolver = ImportResolver::new(&map);

    let import = ImportRecord::plain("pkg", "pkg", 1);
    let reference = ClassReference {
        base_name: "other".to_string(),
        full_path: "other.tool".to_string(),
        line: 1,
    };
    assert!(resolver.resolve_chain(&import, &reference, "main.py").is_empty());
}

#[test]
fn package_initializers_trim_from_their_collapsed_name() {
    let import = relative(Some("billing"), &["charge"], 1);
    assert_eq!(
        absolute_module_name(&import, "app/services/__init__.py").as_deref(),
        Some("app.billing")
    );
}
