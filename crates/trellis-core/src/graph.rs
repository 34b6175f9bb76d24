//! # Graph Capabilities
//!
//! The `Graph` trait and the independently implementable access patterns.
//!
//! A graph exposes its structural flags plus a set of negotiation accessors
//! (`as_entire`, `as_dynamic`, `as_dynamic_in`, `as_dynamic_out`,
//! `as_rooted`). Each accessor returns `None` when the capability is absent:
//! absence is not an error, callers branch on it before reading.
//!
//! All reads are pull-based lazy streams. A consumer cancels by dropping the
//! stream; nothing beyond what was pulled is ever produced.

use crate::element::{Edge, GraphAttributes, GraphInfo, Vertex};
use crate::identity::Identity;
use crate::types::{Capability, GraphError};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// STREAMS
// =============================================================================

/// Lazy sequence of vertices.
pub type VertexStream<'a> = Box<dyn Iterator<Item = Result<Vertex, GraphError>> + 'a>;

/// Lazy sequence of edges.
pub type EdgeStream<'a> = Box<dyn Iterator<Item = Result<Edge, GraphError>> + 'a>;

/// Lazy sequence of identities.
pub type IdentityStream<'a> = Box<dyn Iterator<Item = Result<Identity, GraphError>> + 'a>;

/// A graph held by shared ownership, so one source can feed several pipelines.
pub type SharedGraph = Arc<dyn Graph>;

/// A stream whose only item is `err`.
pub fn failed_stream<'a, T: 'a>(
    err: GraphError,
) -> Box<dyn Iterator<Item = Result<T, GraphError>> + 'a> {
    Box::new(std::iter::once(Err(err)))
}

// =============================================================================
// CAPABILITY TRAITS
// =============================================================================

/// Lookup of a single vertex by identity.
pub trait DynamicGraph: Send + Sync {
    /// Fetch the vertex with the given identity, with its edges attached.
    fn get_vertex(&self, id: &Identity) -> Result<Option<Vertex>, GraphError>;

    /// Fetch several vertices by identity. Unknown identities are skipped.
    fn get_vertices_by_id<'a>(&'a self, ids: &'a [Identity]) -> VertexStream<'a> {
        Box::new(
            ids.iter()
                .filter_map(move |id| self.get_vertex(id).transpose()),
        )
    }
}

/// Lookup plus streaming of a vertex's parents.
pub trait DynamicInGraph: DynamicGraph {
    /// The vertices at the other end of each in-edge of `id`.
    fn get_parent_vertices<'a>(&'a self, id: &Identity) -> VertexStream<'a>;
}

/// Lookup plus streaming of a vertex's children.
pub trait DynamicOutGraph: DynamicGraph {
    /// The vertices at the other end of each out-edge of `id`.
    fn get_child_vertices<'a>(&'a self, id: &Identity) -> VertexStream<'a>;
}

/// Full enumeration. Only ever provided by finite graphs.
pub trait EntireGraph: Send + Sync {
    /// Every vertex of the graph.
    fn get_vertices(&self) -> VertexStream<'_>;

    /// Every edge of the graph, each edge identity yielded once.
    fn get_edges(&self) -> EdgeStream<'_> {
        let mut seen = BTreeSet::new();
        Box::new(
            self.get_vertices()
                .flat_map(|result| match result {
                    Ok(vertex) => vertex.edges.into_iter().map(Ok).collect::<Vec<_>>(),
                    Err(e) => vec![Err(e)],
                })
                .filter(move |result| match result {
                    Ok(edge) => seen.insert(edge.id.clone()),
                    Err(_) => true,
                }),
        )
    }
}

/// Discovery of root identities.
pub trait RootedGraph: Send + Sync {
    /// Identities of the graph's roots.
    fn roots(&self) -> IdentityStream<'_>;
}

// =============================================================================
// GRAPH TRAIT
// =============================================================================

/// A graph: element data, structural flags and capability negotiation.
///
/// Every accessor defaults to `None`. A concrete source returns `Some(self)`
/// for what it implements; wrappers forward, reinterpret or veto
/// (see [`crate::wrapper::WrapperGraph`]).
pub trait Graph: Send + Sync {
    /// Element data of the graph.
    fn info(&self) -> &GraphInfo;

    /// Structural flags.
    fn attributes(&self) -> GraphAttributes;

    /// Lookup-by-identity capability.
    fn as_dynamic(&self) -> Option<&dyn DynamicGraph> {
        None
    }

    /// Parent-streaming capability.
    fn as_dynamic_in(&self) -> Option<&dyn DynamicInGraph> {
        None
    }

    /// Child-streaming capability.
    fn as_dynamic_out(&self) -> Option<&dyn DynamicOutGraph> {
        None
    }

    /// Full-enumeration capability.
    fn as_entire(&self) -> Option<&dyn EntireGraph> {
        None
    }

    /// Root-discovery capability.
    fn as_rooted(&self) -> Option<&dyn RootedGraph> {
        None
    }

    /// Snapshot of every accessor.
    fn capabilities(&self) -> GraphCapabilities<'_> {
        GraphCapabilities {
            entire: self.as_entire(),
            dynamic: self.as_dynamic(),
            dynamic_in: self.as_dynamic_in(),
            dynamic_out: self.as_dynamic_out(),
            rooted: self.as_rooted(),
        }
    }

    /// The enumeration capability, or `NotSupported` naming `operation`.
    fn require_entire(&self, operation: &'static str) -> Result<&dyn EntireGraph, GraphError> {
        self.as_entire()
            .ok_or(GraphError::not_supported(operation, Capability::Entire))
    }

    /// The lookup capability, or `NotSupported` naming `operation`.
    fn require_dynamic(&self, operation: &'static str) -> Result<&dyn DynamicGraph, GraphError> {
        self.as_dynamic()
            .ok_or(GraphError::not_supported(operation, Capability::Dynamic))
    }
}

// =============================================================================
// CAPABILITY SNAPSHOT
// =============================================================================

/// The optional typed accessors of one graph, resolved together.
#[derive(Clone, Copy)]
pub struct GraphCapabilities<'g> {
    /// Full enumeration.
    pub entire: Option<&'g dyn EntireGraph>,
    /// Lookup by identity.
    pub dynamic: Option<&'g dyn DynamicGraph>,
    /// Parent streaming.
    pub dynamic_in: Option<&'g dyn DynamicInGraph>,
    /// Child streaming.
    pub dynamic_out: Option<&'g dyn DynamicOutGraph>,
    /// Root discovery.
    pub rooted: Option<&'g dyn RootedGraph>,
}

impl GraphCapabilities<'_> {
    /// Whether the named capability is available.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Entire => self.entire.is_some(),
            Capability::Dynamic => self.dynamic.is_some(),
            Capability::DynamicIn => self.dynamic_in.is_some(),
            Capability::DynamicOut => self.dynamic_out.is_some(),
            Capability::Rooted => self.rooted.is_some(),
        }
    }

    /// The available capabilities, in a fixed order.
    #[must_use]
    pub fn available(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.supports(*c))
            .collect()
    }
}

impl fmt::Debug for GraphCapabilities<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.available()).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
