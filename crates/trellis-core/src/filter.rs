//! # Filter Graph
//!
//! Lazily filtered enumeration.
//!
//! Only enumeration is filtered. Lookups and adjacency forward to the
//! wrapped graph untouched, and surviving vertices keep their edge lists
//! verbatim: an edge may reference a vertex the filter removed.

use crate::element::Vertex;
use crate::graph::{EntireGraph, Graph, SharedGraph, VertexStream, failed_stream};
use crate::selector::Selector;
use crate::types::GraphError;
use crate::wrapper::WrapperGraph;
use std::sync::Arc;

/// Fallible vertex predicate.
pub type VertexPredicate = Arc<dyn Fn(&Vertex) -> Result<bool, GraphError> + Send + Sync>;

/// Enumerates only the wrapped vertices accepted by a predicate.
pub struct FilterGraph {
    inner: SharedGraph,
    predicate: VertexPredicate,
}

impl FilterGraph {
    /// Filter `inner` with `predicate`.
    #[must_use]
    pub fn new(
        inner: SharedGraph,
        predicate: impl Fn(&Vertex) -> Result<bool, GraphError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            predicate: Arc::new(predicate),
        }
    }

    /// Keep the vertices `selector` contains, evaluated against `inner`.
    #[must_use]
    pub fn from_selector(inner: SharedGraph, selector: Selector) -> Self {
        let context = Arc::clone(&inner);
        Self::new(inner, move |vertex| {
            selector.contains_vertex(&*context, vertex)
        })
    }
}

impl WrapperGraph for FilterGraph {
    fn wrapped(&self) -> &dyn Graph {
        &*self.inner
    }

    fn provide_entire(&self) -> Option<&dyn EntireGraph> {
        Some(self)
    }
}

impl EntireGraph for FilterGraph {
    fn get_vertices(&self) -> VertexStream<'_> {
        let entire = match self.inner.require_entire("FilterGraph::get_vertices") {
            Ok(entire) => entire,
            Err(e) => return failed_stream(e),
        };
        let predicate = &self.predicate;
        Box::new(entire.get_vertices().filter_map(move |result| {
            match result.and_then(|vertex| predicate(&vertex).map(|keep| keep.then_some(vertex))) {
                Ok(Some(vertex)) => Some(Ok(vertex)),
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Edge;
    use crate::finite::FiniteGraph;
    use crate::graph::DynamicGraph;
    use crate::identity::Identity;
    use crate::synthetic::InfiniteDirectedGraph;
    use crate::types::Capability;

    fn source() -> SharedGraph {
        let mut graph = FiniteGraph::directed("g");
        graph.add_vertex_range((0..6_i64).map(Vertex::new));
        graph.add_edge_range((0..5_i64).map(|n| Edge::new(n, n + 1)));
        Arc::new(graph)
    }

    fn even(vertex: &Vertex) -> Result<bool, GraphError> {
        Ok(vertex.id.as_int().is_some_and(|n| n % 2 == 0))
    }

    #[test]
    fn keeps_matching_vertices_unchanged() {
        let inner = source();
        let filtered = FilterGraph::new(Arc::clone(&inner), even);

        let expected: Vec<Vertex> = inner
            .as_entire()
            .expect("entire")
            .get_vertices()
            .map(|r| r.expect("vertex"))
            .filter(|v| even(v).expect("predicate"))
            .collect();
        let actual: Vec<Vertex> = filtered
            .get_vertices()
            .map(|r| r.expect("vertex"))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn surviving_edges_may_dangle() {
        let filtered = FilterGraph::new(source(), even);
        let zero = filtered
            .get_vertices()
            .map(|r| r.expect("vertex"))
            .find(|v| v.id == Identity::from(0))
            .expect("vertex 0");
        // Edge 0 -> 1 survives although vertex 1 was filtered out.
        assert!(zero.out_edges().any(|e| e.target == Identity::from(1)));
    }

    #[test]
    fn lookups_forward_unfiltered() {
        let filtered = FilterGraph::new(source(), even);
        let dynamic = filtered.as_dynamic().expect("dynamic");
        assert!(dynamic.get_vertex(&1.into()).expect("get").is_some());
        assert!(filtered.capabilities().supports(Capability::DynamicOut));
    }

    #[test]
    fn predicate_errors_surface_in_stream() {
        let filtered = FilterGraph::new(source(), |_| {
            Err(GraphError::InvalidArgument("boom".to_string()))
        });
        let first = filtered.get_vertices().next().expect("item");
        assert!(matches!(first, Err(GraphError::InvalidArgument(_))));
    }

    #[test]
    fn non_enumerable_source_fails_at_use() {
        let filtered = FilterGraph::new(Arc::new(InfiniteDirectedGraph::default()), even);
        let first = filtered.get_vertices().next().expect("item");
        assert!(matches!(
            first,
            Err(GraphError::NotSupported {
                capability: Capability::Entire,
                ..
            })
        ));
    }
}
