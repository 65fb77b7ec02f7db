use std::{fs, path::Path, process::Command};

use tempfile::TempDir;

const SPEC: &str = r#"{"tasks": {
    "build": {"dependencies": ["compile"], "description": "Build step"},
    "compile": {"dependencies": null, "description": "Compile step"}
}}"#;

const RUN: &str = r#"{"tasks": {"build": {"status": "Error"}, "compile": {"status": "Success"}}}"#;

fn pipegraph(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pipegraph"))
        .current_dir(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("spec.json"), SPEC).unwrap();
    fs::write(dir.path().join("run.json"), RUN).unwrap();
    dir
}

#[test]
fn renders_svg_to_stdout() {
    let dir = workspace();
    let output = pipegraph(dir.path(), &["--spec", "spec.json"]);

    assert!(output.status.success());
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"data-id="build""#));
}

#[test]
fn writes_json_model_to_file() {
    let dir = workspace();
    let output = pipegraph(
        dir.path(),
        &["--spec", "spec.json", "--run", "run.json", "--format", "json", "-o", "graph.json"],
    );
    assert!(output.status.success());

    let model: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("graph.json")).unwrap()).unwrap();
    assert_eq!(model["variant"], "verbose");
    assert_eq!(model["edges"][0]["source"], "build");
    assert_eq!(model["edges"][0]["target"], "compile");
    assert_eq!(model["nodes"][0]["color"], "#E8684A");
}

#[test]
fn config_file_sets_format() {
    let dir = workspace();
    fs::write(
        dir.path().join("pipegraph.toml"),
        "[output]\nformat = \"dot\"\n\n[render]\nrankdir = \"LR\"\n",
    )
    .unwrap();

    let output = pipegraph(dir.path(), &["--spec", "spec.json"]);
    assert!(output.status.success());
    let dot = String::from_utf8(output.stdout).unwrap();
    assert!(dot.contains("rankdir=LR;"));
    assert!(dot.contains(r#""build" -> "compile";"#));
}

#[test]
fn highlight_of_unknown_task_fails() {
    let dir = workspace();
    let output = pipegraph(dir.path(), &["--spec", "spec.json", "--highlight", "nope"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Task 'nope' not found"));
}

#[test]
fn missing_pipeline_is_reported() {
    let dir = workspace();
    let output = pipegraph(dir.path(), &[]);
    assert!(!output.status.success());
}

#[test]
fn degenerate_size_is_rejected() {
    let dir = workspace();
    for width in ["NaN", "0", "-300", "inf"] {
        let output = pipegraph(
            dir.path(),
            &["--spec", "spec.json", "--width", width, "--height", "100"],
        );
        assert!(!output.status.success(), "width {} was accepted", width);
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn highlight_requires_svg_output() {
    let dir = workspace();
    for format in ["dot", "json"] {
        let output = pipegraph(
            dir.path(),
            &["--spec", "spec.json", "--format", format, "--highlight", "build"],
        );
        assert!(!output.status.success());
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("--highlight only applies to SVG output"));
    }
}
