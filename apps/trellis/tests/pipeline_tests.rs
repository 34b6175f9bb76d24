//! Integration tests for pipeline configuration and execution.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use trellis::cli::{GeneratorKind, capability_report, degree_histogram, generate_graph, pull_vertices, write_vertices};
use trellis::config::{CliError, PipelineConfig};
use trellis_core::Vertex;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn run(config: &PipelineConfig, limit: Option<usize>) -> Vec<Vertex> {
    let graph = config.build().unwrap();
    let mut out = Vec::new();
    write_vertices(pull_vertices(&*graph, limit).unwrap(), &mut out).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

// =============================================================================
// GENERATE
// =============================================================================

#[test]
fn test_generate_complete_graph_degrees() {
    let graph = generate_graph(GeneratorKind::Complete, 4, false, 0, None);
    assert_eq!(graph.edge_count(), 6);
    let histogram = degree_histogram(&graph).unwrap();
    assert_eq!(histogram.get(&3), Some(&4));
    assert_eq!(histogram.len(), 1);
}

#[test]
fn test_generate_random_graph_is_seeded() {
    let a = generate_graph(GeneratorKind::Random, 8, false, 42, Some(10));
    let b = generate_graph(GeneratorKind::Random, 8, false, 42, Some(10));
    assert_eq!(a.edge_count(), 10);
    assert_eq!(degree_histogram(&a).unwrap(), degree_histogram(&b).unwrap());
}

// =============================================================================
// RUN
// =============================================================================

#[test]
fn test_run_file_source_through_actor() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "graph.json",
        r#"{
            "directed": true,
            "vertices": [
                {"id": "a", "properties": [{"id": "name", "value": "foo123"}]},
                {"id": "b"}
            ],
            "edges": [{"source": "a", "target": "b"}]
        }"#,
    );
    let pipeline = write_file(
        &dir,
        "pipeline.toml",
        r#"
        [source]
        type = "file"
        path = "graph.json"

        [[stages]]
        type = "actor"
        selector = { type = "include", ids = ["a"] }
        action = { type = "stringReplace", pattern = "[0-9]+", replacement = "" }
        "#,
    );

    let config = PipelineConfig::load(&pipeline).unwrap();
    let vertices = run(&config, None);
    assert_eq!(vertices.len(), 2);
    assert_eq!(vertices[0].properties[0].value, trellis_core::Value::from("foo"));
    assert_eq!(vertices[0].out_edges().count(), 1);
}

#[test]
fn test_run_descendants_postorder() {
    let config = PipelineConfig::from_toml(
        r#"
        [source]
        type = "path"
        count = 3
        directed = true

        [[stages]]
        type = "descendants"
        root = 0
        traversal = "postorder"
        "#,
    )
    .unwrap();
    let ids: Vec<String> = run(&config, None)
        .into_iter()
        .map(|v| v.id.to_string())
        .collect();
    assert_eq!(ids, ["2", "1", "0"]);
}

#[test]
fn test_run_infinite_source_requires_limit() {
    let config = PipelineConfig::from_toml(
        r#"
        [source]
        type = "infinite"
        seed = 11
        childCount = 4
        "#,
    )
    .unwrap();
    let graph = config.build().unwrap();
    assert!(matches!(pull_vertices(&*graph, None), Err(CliError::Usage(_))));

    let vertices = run(&config, Some(25));
    assert!(!vertices.is_empty());
    assert!(vertices.len() <= 25);
}

#[test]
fn test_missing_graph_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let pipeline = write_file(
        &dir,
        "pipeline.toml",
        r#"
        [source]
        type = "file"
        path = "absent.json"
        "#,
    );
    let config = PipelineConfig::load(&pipeline).unwrap();
    match config.build() {
        Err(CliError::Io { path, .. }) => assert!(path.ends_with("absent.json")),
        other => panic!("expected io error, got {:?}", other.map(|_| ())),
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

#[test]
fn test_capability_report_flags() {
    let config = PipelineConfig::from_toml(
        r#"
        [source]
        type = "hub"
        count = 4

        [[stages]]
        type = "descendants"
        root = 0
        "#,
    )
    .unwrap();
    let graph = config.build().unwrap();
    let report = capability_report(&*graph);
    assert_eq!(report["finite"], true);
    assert_eq!(report["capabilities"]["entire"], true);
    assert_eq!(report["capabilities"]["dynamic-out"], false);
    assert_eq!(report["capabilities"]["rooted"], true);
}
