//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::GeneratorKind;
use crate::config::{CliError, PipelineConfig, SourceConfig};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use trellis_core::{
    Capability, Direction, EntireGraph, FiniteGraph, Graph, GraphError, HierarchyWalk, Identity,
    Neighbours, RandomGraphParameters, TraversalOrder, VertexStream,
};

// =============================================================================
// GENERATE COMMAND
// =============================================================================

/// Build the synthetic graph a `generate` invocation describes.
pub fn generate_graph(
    kind: GeneratorKind,
    count: usize,
    directed: bool,
    seed: u64,
    edges: Option<usize>,
) -> FiniteGraph {
    match kind {
        GeneratorKind::Complete => trellis_core::complete_graph(count),
        GeneratorKind::Path => trellis_core::path_graph(count, directed),
        GeneratorKind::Cyclic => trellis_core::cyclic_graph(count),
        GeneratorKind::Hub => trellis_core::hub_graph(count),
        GeneratorKind::Random => {
            trellis_core::random_finite_undirected_graph(&RandomGraphParameters {
                seed,
                vertex_count: count,
                edge_count: edges.unwrap_or(count),
                labeled: false,
            })
        }
    }
}

/// Number of vertices per degree.
pub fn degree_histogram(graph: &FiniteGraph) -> Result<BTreeMap<usize, usize>, CliError> {
    let mut histogram = BTreeMap::new();
    for vertex in graph.get_vertices() {
        let slot = histogram.entry(vertex?.degree()).or_insert(0usize);
        *slot = slot.saturating_add(1);
    }
    Ok(histogram)
}

/// Report the shape of a synthetic graph.
pub fn cmd_generate(
    json_mode: bool,
    kind: GeneratorKind,
    count: usize,
    directed: bool,
    seed: u64,
    edges: Option<usize>,
) -> Result<(), CliError> {
    tracing::info!(?kind, count, "generating graph");
    let graph = generate_graph(kind, count, directed, seed, edges);
    let histogram = degree_histogram(&graph)?;

    if json_mode {
        let output = serde_json::json!({
            "graph": graph.info().id.to_string(),
            "directed": graph.is_directed(),
            "vertex_count": graph.vertex_count(),
            "edge_count": graph.edge_count(),
            "degrees": histogram
                .iter()
                .map(|(degree, n)| (degree.to_string(), *n))
                .collect::<BTreeMap<_, _>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Trellis Synthetic Graph");
    println!("=======================");
    println!("Graph:    {}", graph.info().id);
    println!("Directed: {}", graph.is_directed());
    println!();
    println!("Vertices: {}", graph.vertex_count());
    println!("Edges:    {}", graph.edge_count());
    println!();
    println!("Degrees:");
    for (degree, n) in &histogram {
        println!("  {:>4}: {} vertices", degree, n);
    }

    Ok(())
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Vertices of `graph`, at most `limit` of them.
///
/// Enumerable graphs are enumerated. Otherwise the graph is walked
/// depth-first from its roots, which needs a `limit`.
pub fn pull_vertices<'g>(
    graph: &'g dyn Graph,
    limit: Option<usize>,
) -> Result<VertexStream<'g>, CliError> {
    if let Some(entire) = graph.as_entire() {
        let stream = entire.get_vertices();
        return Ok(match limit {
            Some(n) => Box::new(stream.take(n)),
            None => stream,
        });
    }

    let Some(limit) = limit else {
        return Err(CliError::Usage(
            "graph is not enumerable: pass --limit to walk it from its roots".to_string(),
        ));
    };
    let rooted = graph
        .as_rooted()
        .ok_or(GraphError::not_supported("run", Capability::Rooted))?;
    let roots: Vec<Identity> = rooted.roots().take(limit).collect::<Result<_, _>>()?;
    tracing::debug!(roots = roots.len(), limit, "walking from roots");

    if let Some(neighbours) = Neighbours::resolve(graph, Direction::Descendants) {
        let mut seen = BTreeSet::new();
        return Ok(Box::new(
            roots
                .into_iter()
                .flat_map(move |root| {
                    HierarchyWalk::over(neighbours, root, true, None, TraversalOrder::Preorder)
                })
                .filter(move |result| match result {
                    Ok(vertex) => seen.insert(vertex.id.clone()),
                    Err(_) => true,
                })
                .take(limit),
        ));
    }

    let dynamic = graph.require_dynamic("run")?;
    Ok(Box::new(
        roots
            .into_iter()
            .filter_map(move |id| dynamic.get_vertex(&id).transpose()),
    ))
}

/// Write each vertex as one JSON line. Returns the number written.
pub fn write_vertices(stream: VertexStream<'_>, out: &mut impl Write) -> Result<usize, CliError> {
    let mut written = 0usize;
    for vertex in stream {
        let line = serde_json::to_string(&vertex?)?;
        writeln!(out, "{}", line).map_err(CliError::Output)?;
        written = written.saturating_add(1);
    }
    Ok(written)
}

/// Build a pipeline and stream its vertices to stdout.
pub fn cmd_run(pipeline: &Path, limit: Option<usize>) -> Result<(), CliError> {
    tracing::info!("Running pipeline {:?}", pipeline);
    let config = PipelineConfig::load(pipeline)?;
    let graph = config.build()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let written = write_vertices(pull_vertices(&*graph, limit)?, &mut out)?;
    out.flush().map_err(CliError::Output)?;

    tracing::info!(written, "pipeline finished");
    Ok(())
}

// =============================================================================
// CAPABILITIES COMMAND
// =============================================================================

/// Attributes and capability flags of `graph` as JSON.
pub fn capability_report(graph: &dyn Graph) -> serde_json::Value {
    let attributes = graph.attributes();
    let capabilities = graph.capabilities();
    let flags: serde_json::Map<String, serde_json::Value> = Capability::ALL
        .iter()
        .map(|c| (c.to_string(), serde_json::Value::Bool(capabilities.supports(*c))))
        .collect();
    serde_json::json!({
        "graph": graph.info().id.to_string(),
        "directed": attributes.directed,
        "dynamic": attributes.dynamic,
        "finite": attributes.finite,
        "capabilities": flags,
    })
}

/// Show the capability table of a pipeline's final graph.
pub fn cmd_capabilities(pipeline: &Path, json_mode: bool) -> Result<(), CliError> {
    let config = PipelineConfig::load(pipeline)?;
    let graph = config.build()?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&capability_report(&*graph)).unwrap_or_default()
        );
        return Ok(());
    }

    let attributes = graph.attributes();
    let capabilities = graph.capabilities();
    println!("Trellis Pipeline Capabilities");
    println!("=============================");
    println!("Source:   {}", source_name(&config.source));
    println!("Stages:   {}", config.stages.len());
    println!("Graph:    {}", graph.info().id);
    println!();
    println!("Directed: {}", attributes.directed);
    println!("Dynamic:  {}", attributes.dynamic);
    println!("Finite:   {}", attributes.finite);
    println!();
    for capability in Capability::ALL {
        let mark = if capabilities.supports(capability) {
            "yes"
        } else {
            "no"
        };
        println!("  {:<12} {}", capability, mark);
    }

    Ok(())
}

fn source_name(source: &SourceConfig) -> &'static str {
    match source {
        SourceConfig::Complete { .. } => "complete",
        SourceConfig::Path { .. } => "path",
        SourceConfig::Cyclic { .. } => "cyclic",
        SourceConfig::Hub { .. } => "hub",
        SourceConfig::Random(_) => "random",
        SourceConfig::Infinite(_) => "infinite",
        SourceConfig::File { .. } => "file",
    }
}
