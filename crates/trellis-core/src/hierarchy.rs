//! # Hierarchy Graphs
//!
//! Bounded descendant and ancestor views of a wrapped graph.
//!
//! A `HierarchyGraph` exposes the vertices reachable from one start vertex,
//! following out-edges (descendants) or in-edges (ancestors), optionally
//! bounded in depth and optionally excluding the start itself.
//!
//! ## Capabilities
//!
//! | Capability | Behaviour |
//! |------------|-----------|
//! | entire | lazy walk from the start (full enumeration if the walk adjacency is missing) |
//! | dynamic | lookup gated by membership |
//! | rooted | the start, or its first ring when the start is excluded |
//! | dynamic-in / dynamic-out | vetoed: forwarding would escape the subgraph |

use crate::element::{GraphAttributes, Vertex};
use crate::graph::{
    DynamicGraph, DynamicInGraph, DynamicOutGraph, EntireGraph, Graph, IdentityStream, RootedGraph,
    SharedGraph, VertexStream, failed_stream,
};
use crate::identity::Identity;
use crate::traversal::{HierarchyWalk, Neighbours, contains_within};
use crate::types::{Capability, Direction, GraphError, TraversalOrder};
use crate::wrapper::WrapperGraph;
use std::collections::BTreeSet;
use tracing::debug;

/// The subgraph reachable from a start vertex.
pub struct HierarchyGraph {
    inner: SharedGraph,
    direction: Direction,
    root: Identity,
    include_roots: bool,
    depth: Option<usize>,
    order: TraversalOrder,
}

impl HierarchyGraph {
    /// View of the vertices reachable from `root` in `direction`.
    ///
    /// Defaults: start included, unbounded depth, preorder.
    #[must_use]
    pub fn new(inner: SharedGraph, direction: Direction, root: impl Into<Identity>) -> Self {
        Self {
            inner,
            direction,
            root: root.into(),
            include_roots: true,
            depth: None,
            order: TraversalOrder::Preorder,
        }
    }

    /// Descendants of `root`.
    #[must_use]
    pub fn descendants(inner: SharedGraph, root: impl Into<Identity>) -> Self {
        Self::new(inner, Direction::Descendants, root)
    }

    /// Ancestors of `root`.
    #[must_use]
    pub fn ancestors(inner: SharedGraph, root: impl Into<Identity>) -> Self {
        Self::new(inner, Direction::Ancestors, root)
    }

    /// Whether the start vertex belongs to the view.
    #[must_use]
    pub fn include_roots(mut self, include: bool) -> Self {
        self.include_roots = include;
        self
    }

    /// Maximum number of hops from the start. `None` is unbounded.
    #[must_use]
    pub fn depth(mut self, depth: Option<usize>) -> Self {
        self.depth = depth;
        self
    }

    /// Emission order of enumeration.
    #[must_use]
    pub fn order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    /// Start vertex identity.
    #[must_use]
    pub fn root(&self) -> &Identity {
        &self.root
    }

    /// Membership test. Walks from `id` back towards the start.
    pub fn contains_vertex(&self, id: &Identity) -> Result<bool, GraphError> {
        let graph = &*self.inner;
        let walkable = Neighbours::resolve(graph, self.direction).is_some()
            || Neighbours::resolve(graph, self.direction.inverse()).is_some();
        if walkable {
            return contains_within(
                graph,
                self.direction,
                &self.root,
                id,
                self.include_roots,
                self.depth,
            );
        }

        // No adjacency at all: the view degrades to the whole graph.
        if let Some(dynamic) = graph.as_dynamic() {
            return Ok(dynamic.get_vertex(id)?.is_some());
        }
        let entire = graph.require_entire("HierarchyGraph::contains_vertex")?;
        for vertex in entire.get_vertices() {
            if vertex?.id == *id {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl WrapperGraph for HierarchyGraph {
    fn wrapped(&self) -> &dyn Graph {
        &*self.inner
    }

    fn provide_attributes(&self) -> GraphAttributes {
        let inner = self.inner.attributes();
        GraphAttributes {
            finite: inner.finite || self.depth.is_some(),
            ..inner
        }
    }

    fn provide_entire(&self) -> Option<&dyn EntireGraph> {
        if self.provide_attributes().finite {
            Some(self)
        } else {
            debug!(root = %self.root, "unbounded hierarchy over an infinite graph: enumeration vetoed");
            None
        }
    }

    fn provide_dynamic(&self) -> Option<&dyn DynamicGraph> {
        self.inner.as_dynamic().map(|_| self as &dyn DynamicGraph)
    }

    fn provide_dynamic_in(&self) -> Option<&dyn DynamicInGraph> {
        None
    }

    fn provide_dynamic_out(&self) -> Option<&dyn DynamicOutGraph> {
        None
    }

    fn provide_rooted(&self) -> Option<&dyn RootedGraph> {
        Some(self)
    }
}

impl EntireGraph for HierarchyGraph {
    fn get_vertices(&self) -> VertexStream<'_> {
        let graph = &*self.inner;
        if let Some(neighbours) = Neighbours::resolve(graph, self.direction) {
            return Box::new(HierarchyWalk::over(
                neighbours,
                self.root.clone(),
                self.include_roots,
                self.depth,
                self.order,
            ));
        }
        match graph.as_entire() {
            Some(entire) => {
                debug!(root = %self.root, "walk adjacency missing: full enumeration");
                entire.get_vertices()
            }
            None => failed_stream(GraphError::not_supported(
                "HierarchyGraph::get_vertices",
                match self.direction {
                    Direction::Descendants => Capability::DynamicOut,
                    Direction::Ancestors => Capability::DynamicIn,
                },
            )),
        }
    }
}

impl DynamicGraph for HierarchyGraph {
    fn get_vertex(&self, id: &Identity) -> Result<Option<Vertex>, GraphError> {
        if !self.contains_vertex(id)? {
            return Ok(None);
        }
        self.inner
            .require_dynamic("HierarchyGraph::get_vertex")?
            .get_vertex(id)
    }
}

impl RootedGraph for HierarchyGraph {
    fn roots(&self) -> IdentityStream<'_> {
        if self.include_roots {
            return Box::new(std::iter::once(Ok(self.root.clone())));
        }
        if self.depth == Some(0) {
            return Box::new(std::iter::empty());
        }
        let neighbours = match Neighbours::require(
            &*self.inner,
            self.direction,
            "HierarchyGraph::roots",
        ) {
            Ok(neighbours) => neighbours,
            Err(e) => return failed_stream(e),
        };
        let root = self.root.clone();
        let mut seen = BTreeSet::new();
        Box::new(
            neighbours
                .stream(&self.root)
                .map(|vertex| vertex.map(|v| v.id))
                .filter(move |id| match id {
                    Ok(id) => *id != root && seen.insert(id.clone()),
                    Err(_) => true,
                }),
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
