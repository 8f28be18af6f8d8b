use depmap::core::scanner::{relative_path, FileScanner};
use std::fs;
use std::path::Path;

fn touch<P: AsRef<Path>>(p: P) {
    fs::write(p, "# test\n").unwrap();
}

fn default_patterns() -> Vec<String> {
    depmap::config::default_ignore_patterns()
}

#[test]
fn scanner_finds_python_files_in_name_order() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("pkg/sub")).unwrap();

    touch(root.join("zmain.py"));
    touch(root.join("pkg/__init__.py"));
    touch(root.join("pkg/sub/mod.py"));
    touch(root.join("pkg/readme.txt"));
    touch(root.join("amain.py"));

    let scanner = FileScanner::new(&default_patterns()).unwrap();
    let files = scanner.scan_directory(root).unwrap();

    let paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["amain.py", "pkg/__init__.py", "pkg/sub/mod.py", "zmain.py"]
    );
    assert!(files.iter().all(|f| f.path.starts_with(root)));
}

#[test]
fn ignore_patterns_match_segments_names_and_paths() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    for sub in ["venv/lib", "__pycache__", "src/tests", "src/gen"] {
        fs::create_dir_all(root.join(sub)).unwrap();
    }
    touch(root.join("venv/lib/site.py"));
    touch(root.join("__pycache__/cached.py"));
    touch(root.join("src/tests/test_app.py"));
    touch(root.join("src/gen/models_pb2.py"));
    touch(root.join("src/app.py"));

    let mut patterns = default_patterns();
    patterns.push("src/tests/*".to_string());
    patterns.push("*_pb2.py".to_string());
    let scanner = FileScanner::new(&patterns).unwrap();
    let files = scanner.scan_directory(root).unwrap();

    let paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
    assert_eq!(paths, vec!["src/app.py"]);
    assert!(scanner.is_ignored("env/tool.py"));
    assert!(!scanner.is_ignored("environment.py"));
}

#[test]
fn invalid_patterns_and_missing_roots_are_errors() {
    assert!(FileScanner::new(&["[".to_string()]).is_err());

    let scanner = FileScanner::new(&[]).unwrap();
    assert!(scanner.scan_directory(Path::new("/definitely/not/here")).is_err());
}

#[test]
fn relative_paths_use_forward_slashes() {
    let root = Path::new("/project");
    assert_eq!(
        relative_path(root, &root.join("a").join("b.py")).as_deref(),
        Some("a/b.py")
    );
    assert_eq!(relative_path(root, root), None);
}
