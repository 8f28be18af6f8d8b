use depmap::config::Config;
use depmap::core::ProjectAnalyzer;
use depmap::formatters::JsonReportFormatter;
use serde_json::Value;
use std::fs;

#[test]
fn json_report_contains_graph_classes_and_externals() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("a.py"), "import b\nimport requests\n\nclass A:\n    pass\n").unwrap();
    fs::write(root.join("b.py"), "import a\n\ndef helper(x):\n    pass\n").unwrap();
    fs::write(root.join("bad.py"), "def (\n").unwrap();

    let config = Config::new(root, root.join("out"));
    let mut result = ProjectAnalyzer::new(&config).unwrap().analyze().unwrap();
    result.files["a.py"].ai_summary = Some("Entry point".to_string());

    let output = root.join("analysis.json");
    JsonReportFormatter::new()
        .format_to_file(&result, &output)
        .unwrap();
    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();

    assert_eq!(json["meta"]["files"], 2);
    assert_eq!(json["meta"]["classes"], 1);
    assert_eq!(json["meta"]["functions"], 1);
    assert_eq!(json["meta"]["dependency_edges"], 2);
    assert_eq!(json["meta"]["warnings"], 1);

    assert_eq!(json["dependencies_graph"]["a.py"], serde_json::json!(["b.py"]));
    assert_eq!(json["files"]["b.py"]["dependents"], serde_json::json!(["a.py"]));
    assert_eq!(json["files"]["b.py"]["functions"][0]["parameters"], serde_json::json!(["x"]));
    assert_eq!(json["files"]["a.py"]["annotation"]["summary"], "Entry point");
    assert!(json["files"]["b.py"].get("annotation").is_none());
    assert!(json["files"]["a.py"].get("source_text").is_none());

    assert_eq!(json["classes"]["a.py::A"]["name"], "A");
    assert_eq!(
        json["external_libraries"],
        serde_json::json!([{ "name": "requests", "count": 1 }])
    );
    assert_eq!(json["cycles"], serde_json::json!([["a.py", "b.py"]]));
    assert_eq!(json["warnings"][0]["path"], "bad.py");
}
