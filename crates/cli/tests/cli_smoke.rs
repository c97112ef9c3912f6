use assert_cmd::Command;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/calculator.ast.json")
}

fn kgraph(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kgraph").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn extract(dir: &Path) -> PathBuf {
    let analysis = dir.join("analysis.json");
    kgraph(dir)
        .arg("extract")
        .arg(fixture())
        .args(["--project-root", ".", "-o"])
        .arg(&analysis)
        .assert()
        .success();
    analysis
}

#[test]
fn extract_writes_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = extract(dir.path());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&analysis).unwrap()).unwrap();
    assert_eq!(json["classes"][0]["name"], "Calc");
    assert_eq!(json["classes"][0]["methods"][0]["qualified"], "Calc::add");
    assert_eq!(json["free_functions"][0]["qualified"], "clamp");
    assert_eq!(json["classes"][0]["methods"][0]["calls"].as_array().unwrap().len(), 2);
}

#[test]
fn build_writes_graph_next_to_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = extract(dir.path());

    kgraph(dir.path())
        .arg("build")
        .arg(&analysis)
        .arg("--json")
        .assert()
        .success();

    let graph: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("analysis_graph.json")).unwrap(),
    )
    .unwrap();
    let mut ids: Vec<&str> = graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(
        ids,
        vec![
            "class::Calc",
            "external_function::std::max",
            "function::clamp",
            "method::Calc::add",
        ]
    );
    assert_eq!(graph["links"].as_array().unwrap().len(), 3);
}

#[test]
fn build_writes_optional_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = extract(dir.path());

    kgraph(dir.path())
        .arg("build")
        .arg(&analysis)
        .args(["--format", "GraphML", "-o", "out/calc.graphml"])
        .args(["--cypher", "out/calc.cypher", "--clear", "--render", "out/calc.dot"])
        .assert()
        .success();

    let graphml = std::fs::read_to_string(dir.path().join("out/calc.graphml")).unwrap();
    assert!(graphml.contains("<graphml"));
    let cypher = std::fs::read_to_string(dir.path().join("out/calc.cypher")).unwrap();
    assert!(cypher.starts_with("MATCH (n) DETACH DELETE n;"));
    assert!(cypher.contains("[:MEMBER]"));
    let dot = std::fs::read_to_string(dir.path().join("out/calc.dot")).unwrap();
    assert!(dot.contains("digraph"));
}

#[test]
fn unsupported_format_fails_before_reading_input() {
    let dir = tempfile::tempdir().unwrap();

    let output = kgraph(dir.path())
        .args(["build", "missing.json", "--format", "pdf"])
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported output format: pdf"), "{stderr}");
    assert!(!stderr.contains("missing.json"), "{stderr}");
}

#[test]
fn config_file_supplies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = extract(dir.path());
    std::fs::write(
        dir.path().join("kgraph.toml"),
        "[graph]\nformat = \"gexf\"\noutput = \"from-config.gexf\"\n",
    )
    .unwrap();

    kgraph(dir.path())
        .arg("build")
        .arg(&analysis)
        .assert()
        .success();

    assert!(dir.path().join("from-config.gexf").exists());
}

#[test]
fn summary_lists_classes_and_calls() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = extract(dir.path());

    let output = kgraph(dir.path())
        .arg("summary")
        .arg(&analysis)
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ANALYSIS RESULTS"));
    assert!(stdout.contains("Class: Calc"));
    assert!(stdout.contains("description: Adds two values."));
    assert!(stdout.contains("[external]"));
}

#[test]
fn missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();

    kgraph(dir.path())
        .args(["extract", "nowhere"])
        .assert()
        .failure();
    assert!(!dir.path().join("analysis.json").exists());
}

#[test]
fn project_scope_with_relative_root_keeps_library_calls_external() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = dir.path().join("analysis.json");
    kgraph(dir.path())
        .arg("extract")
        .arg(fixture())
        .args(["--scope", "project", "--project-root", ".", "-o"])
        .arg(&analysis)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&analysis).unwrap()).unwrap();
    assert_eq!(json["free_functions"].as_array().unwrap().len(), 1);
    assert_eq!(json["free_functions"][0]["qualified"], "clamp");
    let calls = json["classes"][0]["methods"][0]["calls"].as_array().unwrap();
    let max = calls.iter().find(|c| c["qualified"] == "std::max").unwrap();
    assert_eq!(max["external"], true);
    let clamp = calls.iter().find(|c| c["qualified"] == "clamp").unwrap();
    assert_eq!(clamp["external"], false);
}

#[test]
fn configured_clear_without_cypher_path_warns() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = extract(dir.path());
    std::fs::write(dir.path().join("kgraph.toml"), "[export]\nclear = true\n").unwrap();

    let output = kgraph(dir.path())
        .arg("build")
        .arg(&analysis)
        .assert()
        .success()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("has no effect"), "{stderr}");
}
