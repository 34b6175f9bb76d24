//! # Reverse Edges Graph
//!
//! Every vertex is produced with the source and target of each edge swapped.
//! Children become parents and parents become children. Root discovery is
//! vetoed: the roots of the reversed graph are not derivable from the roots
//! of the wrapped one.

use crate::element::Vertex;
use crate::graph::{
    DynamicGraph, DynamicInGraph, DynamicOutGraph, EntireGraph, Graph, RootedGraph, SharedGraph,
    VertexStream, failed_stream,
};
use crate::identity::Identity;
use crate::types::GraphError;
use crate::wrapper::WrapperGraph;
use tracing::trace;

/// A view of a graph with every edge reversed.
pub struct ReverseEdgesGraph {
    inner: SharedGraph,
}

impl ReverseEdgesGraph {
    /// Reverse the edges of `inner`.
    #[must_use]
    pub fn new(inner: SharedGraph) -> Self {
        Self { inner }
    }

    fn reverse(vertex: Vertex) -> Vertex {
        Vertex {
            edges: vertex.edges.iter().map(|e| e.reversed()).collect(),
            ..vertex
        }
    }

    /// Reversed neighbours from the wrapped adjacency, or recovered from the
    /// reversed vertex's own edges when the adjacency is missing.
    fn neighbours<'a>(&'a self, id: &Identity, children: bool) -> VertexStream<'a> {
        let opposite = if children {
            self.inner
                .as_dynamic_in()
                .map(|g| g.get_parent_vertices(id))
        } else {
            self.inner
                .as_dynamic_out()
                .map(|g| g.get_child_vertices(id))
        };
        if let Some(stream) = opposite {
            return Box::new(stream.map(|r| r.map(Self::reverse)));
        }

        trace!(%id, children, "opposite adjacency missing: recovering from edges");
        let vertex = match self.get_vertex(id) {
            Ok(Some(vertex)) => vertex,
            Ok(None) => return Box::new(std::iter::empty()),
            Err(e) => return failed_stream(e),
        };
        let ends: Vec<Identity> = if children {
            vertex.out_edges().filter_map(|e| e.other_end(id)).cloned().collect()
        } else {
            vertex.in_edges().filter_map(|e| e.other_end(id)).cloned().collect()
        };
        Box::new(
            ends.into_iter()
                .filter_map(move |end| self.get_vertex(&end).transpose()),
        )
    }
}

impl WrapperGraph for ReverseEdgesGraph {
    fn wrapped(&self) -> &dyn Graph {
        &*self.inner
    }

    fn provide_dynamic(&self) -> Option<&dyn DynamicGraph> {
        self.inner.as_dynamic().map(|_| self as &dyn DynamicGraph)
    }

    fn provide_dynamic_in(&self) -> Option<&dyn DynamicInGraph> {
        self.inner.as_dynamic().map(|_| self as &dyn DynamicInGraph)
    }

    fn provide_dynamic_out(&self) -> Option<&dyn DynamicOutGraph> {
        self.inner.as_dynamic().map(|_| self as &dyn DynamicOutGraph)
    }

    fn provide_entire(&self) -> Option<&dyn EntireGraph> {
        self.inner.as_entire().map(|_| self as &dyn EntireGraph)
    }

    fn provide_rooted(&self) -> Option<&dyn RootedGraph> {
        None
    }
}

impl DynamicGraph for ReverseEdgesGraph {
    fn get_vertex(&self, id: &Identity) -> Result<Option<Vertex>, GraphError> {
        Ok(self
            .inner
            .require_dynamic("ReverseEdgesGraph::get_vertex")?
            .get_vertex(id)?
            .map(Self::reverse))
    }
}

impl DynamicInGraph for ReverseEdgesGraph {
    fn get_parent_vertices<'a>(&'a self, id: &Identity) -> VertexStream<'a> {
        self.neighbours(id, false)
    }
}

impl DynamicOutGraph for ReverseEdgesGraph {
    fn get_child_vertices<'a>(&'a self, id: &Identity) -> VertexStream<'a> {
        self.neighbours(id, true)
    }
}

impl EntireGraph for ReverseEdgesGraph {
    fn get_vertices(&self) -> VertexStream<'_> {
        match self.inner.require_entire("ReverseEdgesGraph::get_vertices") {
            Ok(entire) => Box::new(entire.get_vertices().map(|r| r.map(Self::reverse))),
            Err(e) => failed_stream(e),
        }
    }
}
