use depmap::core::{is_standard_library, ExternalLibraryCollector, FileEntity, ImportRecord, ModuleMap};

fn file(path: &str, imports: Vec<ImportRecord>) -> FileEntity {
    let mut file = FileEntity::new(path, "");
    file.imports = imports;
    file
}

fn from(module: &str) -> ImportRecord {
    ImportRecord::from_import(Some(module.to_string()), vec!["x".to_string()], 0, 1)
}

#[test]
fn counts_third_party_roots_most_used_first() {
    let files = vec![
        file(
            "a.py",
            vec![
                ImportRecord::plain("requests", "requests", 1),
                ImportRecord::plain("os.path", "os", 2),
                from("django.db.models"),
            ],
        ),
        file(
            "b.py",
            vec![
                from("django.http"),
                ImportRecord::plain("numpy", "np", 1),
                from("app.models"),
                from("core.utils"),
                ImportRecord::from_import(Some("local".to_string()), vec!["x".to_string()], 1, 3),
            ],
        ),
    ];
    let prefixes = vec!["app".to_string(), "core".to_string()];

    let libraries = ExternalLibraryCollector::new(&prefixes).collect(&files);

    let listing: Vec<_> = libraries.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(listing, vec![("django", 2), ("requests", 1), ("numpy", 1)]);
}

#[test]
fn ties_keep_first_seen_order() {
    let files = vec![file(
        "a.py",
        vec![from("zeta"), from("alpha"), from("mid"), from("alpha")],
    )];
    let libraries = ExternalLibraryCollector::new(&[]).collect(&files);

    let names: Vec<_> = libraries.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["alpha", "zeta", "mid"]);
}

#[test]
fn project_top_level_modules_are_not_external() {
    let modules = ModuleMap::build(["utils/strings.py", "main.py"], "app");
    let files = vec![file("main.py", vec![from("utils.strings"), from("flask")])];

    let libraries = ExternalLibraryCollector::new(&[]).with_modules(&modules).collect(&files);
    assert_eq!(libraries.keys().collect::<Vec<_>>(), vec!["flask"]);
}

#[test]
fn internal_prefixes_match_whole_roots() {
    let prefixes = vec!["app".to_string()];
    let collector = ExternalLibraryCollector::new(&prefixes);

    assert!(!collector.is_external("app"));
    assert!(collector.is_external("apputils"));
    assert!(!collector.is_external("json"));
    assert!(is_standard_library("__future__"));
    assert!(!is_standard_library("requests"));
}
