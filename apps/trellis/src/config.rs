//! # Pipeline Configuration
//!
//! A pipeline is one graph source followed by an ordered list of stages,
//! described in TOML:
//!
//! ```toml
//! [source]
//! type = "random"
//! seed = 7
//! vertexCount = 20
//! edgeCount = 30
//!
//! [[stages]]
//! type = "filter"
//! selector = { type = "degree", outDegree = 0 }
//!
//! [[stages]]
//! type = "actor"
//! action = { type = "stringToNumber" }
//! ```
//!
//! Selectors and actions deserialize straight into the engine's enums.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use trellis_core::{
    Action, Actor, Direction, Edge, FilterGraph, FiniteGraph, GraphError,
    HierarchyGraph, Identity, InfiniteDirectedGraph, InfiniteDirectedGraphParameters,
    RandomGraphParameters, ReverseEdgesGraph, Selector, SharedGraph, TraversalOrder, Vertex,
    complete_graph, cyclic_graph, hub_graph, path_graph, random_finite_undirected_graph,
};

/// Maximum graph file size (100 MB).
const MAX_GRAPH_FILE_SIZE: u64 = 100 * 1024 * 1024;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised by the binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Engine failure.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// File could not be read or written.
    #[error("{path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Output could not be written.
    #[error("output: {0}")]
    Output(#[source] std::io::Error),

    /// Malformed pipeline file.
    #[error("invalid pipeline: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed graph file or output failure.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Request that cannot be served as given.
    #[error("{0}")]
    Usage(String),
}

// =============================================================================
// SOURCES
// =============================================================================

/// Where a pipeline's vertices come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SourceConfig {
    /// Undirected complete graph.
    Complete {
        /// Vertex count.
        count: usize,
    },
    /// Path graph.
    Path {
        /// Vertex count.
        count: usize,
        /// Whether edges are directed.
        #[serde(default)]
        directed: bool,
    },
    /// Undirected ring.
    Cyclic {
        /// Vertex count.
        count: usize,
    },
    /// Directed hub and spokes.
    Hub {
        /// Vertex count.
        count: usize,
    },
    /// Seeded random undirected graph.
    Random(RandomGraphParameters),
    /// Procedurally generated infinite directed graph.
    Infinite(InfiniteDirectedGraphParameters),
    /// JSON graph file, relative to the pipeline file.
    File {
        /// Graph file path.
        path: PathBuf,
    },
}

/// On-disk JSON graph: `{ "directed": true, "vertices": [...], "edges": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphFile {
    /// Graph identity.
    #[serde(default)]
    pub id: Option<Identity>,
    /// Whether edges are directed.
    #[serde(default = "default_true")]
    pub directed: bool,
    /// Vertices, optionally carrying their own edges.
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    /// Additional edges.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphFile {
    /// Materialize into a finite graph.
    #[must_use]
    pub fn into_graph(self) -> FiniteGraph {
        let id = self.id.unwrap_or_else(|| Identity::from("file"));
        let mut graph = FiniteGraph::new(id, self.directed);
        graph.add_vertex_range(self.vertices);
        graph.add_edge_range(self.edges);
        graph
    }
}

const fn default_true() -> bool {
    true
}

fn all_selector() -> Selector {
    Selector::All
}

impl SourceConfig {
    /// Build the source graph. Relative file paths resolve against `base`.
    pub fn build(&self, base: &Path) -> Result<SharedGraph, CliError> {
        let graph: SharedGraph = match self {
            Self::Complete { count } => Arc::new(complete_graph(*count)),
            Self::Path { count, directed } => Arc::new(path_graph(*count, *directed)),
            Self::Cyclic { count } => Arc::new(cyclic_graph(*count)),
            Self::Hub { count } => Arc::new(hub_graph(*count)),
            Self::Random(parameters) => Arc::new(random_finite_undirected_graph(parameters)),
            Self::Infinite(parameters) => Arc::new(InfiniteDirectedGraph::new(parameters.clone())),
            Self::File { path } => {
                let path = base.join(path);
                let bytes = read_bounded(&path, MAX_GRAPH_FILE_SIZE)?;
                let file: GraphFile = serde_json::from_slice(&bytes)?;
                Arc::new(file.into_graph())
            }
        };
        tracing::debug!(graph = %graph.info().id, "source built");
        Ok(graph)
    }
}

// =============================================================================
// STAGES
// =============================================================================

/// Parameters of a descendants or ancestors stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyStage {
    /// Start vertex.
    pub root: Identity,
    /// Whether the start vertex is kept.
    #[serde(default = "default_true")]
    pub include_roots: bool,
    /// Maximum hops. Absent is unbounded.
    #[serde(default)]
    pub depth: Option<usize>,
    /// Enumeration order.
    #[serde(default)]
    pub traversal: TraversalOrder,
}

impl HierarchyStage {
    fn wrap(&self, graph: SharedGraph, direction: Direction) -> SharedGraph {
        Arc::new(
            HierarchyGraph::new(graph, direction, self.root.clone())
                .include_roots(self.include_roots)
                .depth(self.depth)
                .order(self.traversal),
        )
    }
}

/// One transformation applied on top of the previous graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StageConfig {
    /// Keep only the selected vertices.
    Filter {
        /// Vertices to keep.
        selector: Selector,
    },
    /// Swap every edge.
    Reverse,
    /// Vertices reachable along out-edges.
    Descendants(HierarchyStage),
    /// Vertices reachable along in-edges.
    Ancestors(HierarchyStage),
    /// Rebuild selected vertices through an action.
    Actor {
        /// Elements to transform. Defaults to everything.
        #[serde(default = "all_selector")]
        selector: Selector,
        /// Transformation.
        action: Action,
    },
}

impl StageConfig {
    /// Wrap `graph` in this stage.
    #[must_use]
    pub fn apply(&self, graph: SharedGraph) -> SharedGraph {
        match self {
            Self::Filter { selector } => Arc::new(FilterGraph::from_selector(graph, selector.clone())),
            Self::Reverse => Arc::new(ReverseEdgesGraph::new(graph)),
            Self::Descendants(stage) => stage.wrap(graph, Direction::Descendants),
            Self::Ancestors(stage) => stage.wrap(graph, Direction::Ancestors),
            Self::Actor { selector, action } => {
                Arc::new(Actor::new(graph, selector.clone(), action.clone()))
            }
        }
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// A source and its stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Graph source.
    pub source: SourceConfig,
    /// Stages, applied in order.
    #[serde(default)]
    pub stages: Vec<StageConfig>,
    /// Directory that relative source paths resolve against.
    #[serde(skip)]
    pub base: PathBuf,
}

impl PipelineConfig {
    /// Parse a pipeline from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a pipeline file. Relative source paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let bytes = read_bounded(path, MAX_GRAPH_FILE_SIZE)?;
        let text = String::from_utf8_lossy(&bytes);
        let mut config = Self::from_toml(&text)?;
        config.base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Build the source and stack every stage on it.
    pub fn build(&self) -> Result<SharedGraph, CliError> {
        let source = self.source.build(&self.base)?;
        Ok(self.stages.iter().fold(source, |graph, stage| {
            tracing::debug!(?stage, "stage applied");
            stage.apply(graph)
        }))
    }
}

/// Read a file after checking it exists and is not larger than `max_size`.
fn read_bounded(path: &Path, max_size: u64) -> Result<Vec<u8>, CliError> {
    let io = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = std::fs::metadata(path).map_err(io)?;
    if metadata.len() > max_size {
        return Err(CliError::Usage(format!(
            "{}: size {} bytes exceeds maximum allowed {} bytes",
            path.display(),
            metadata.len(),
            max_size
        )));
    }
    std::fs::read(path).map_err(io)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Capability;

    #[test]
    fn parses_every_stage_kind() {
        let config = PipelineConfig::from_toml(
            r#"
            [source]
            type = "path"
            count = 5
            directed = true

            [[stages]]
            type = "reverse"

            [[stages]]
            type = "descendants"
            root = 4
            depth = 2
            traversal = "postorder"

            [[stages]]
            type = "filter"
            selector = { type = "exclude", ids = [3] }

            [[stages]]
            type = "actor"
            action = { type = "stringReplace", pattern = "x", replacement = "y" }
            "#,
        )
        .expect("parse");
        assert_eq!(config.stages.len(), 4);
        assert!(matches!(
            &config.stages[1],
            StageConfig::Descendants(HierarchyStage {
                depth: Some(2),
                include_roots: true,
                traversal: TraversalOrder::Postorder,
                ..
            })
        ));
        assert!(matches!(
            &config.stages[3],
            StageConfig::Actor {
                selector: Selector::All,
                ..
            }
        ));
    }

    #[test]
    fn builds_capabilities_through_stages() {
        let config = PipelineConfig::from_toml(
            r#"
            [source]
            type = "infinite"
            seed = 5

            [[stages]]
            type = "reverse"
            "#,
        )
        .expect("parse");
        let graph = config.build().expect("build");
        let caps = graph.capabilities();
        assert!(!caps.supports(Capability::Entire));
        assert!(!caps.supports(Capability::Rooted));
        assert!(caps.supports(Capability::DynamicIn));
    }

    #[test]
    fn rejects_unknown_stage() {
        let result = PipelineConfig::from_toml(
            r#"
            [source]
            type = "hub"
            count = 3

            [[stages]]
            type = "teleport"
            "#,
        );
        assert!(matches!(result, Err(CliError::Toml(_))));
    }
}
