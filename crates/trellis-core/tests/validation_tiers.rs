//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the engine is INVALID.
//!
//! ## Tiers
//! - T0: Model Integrity
//! - T1: Finite Graph Construction
//! - T2: Wrapper Semantics
//! - T3: Traversal and Pipelines (end-to-end)

use std::sync::Arc;
use trellis_core::{
    Action, Actor, Capability, CompoundIdentifier, Direction, DynamicGraph, DynamicInGraph,
    DynamicOutGraph, Edge, EntireGraph, FilterGraph, FiniteGraph, Graph, GraphError,
    HierarchyGraph, HierarchySelection, Identity, InfiniteDirectedGraph, Pattern, Property,
    ReverseEdgesGraph, RootedGraph, Selector, SharedGraph, TraversalOrder, Value, Vertex,
    VertexStream, complete_graph,
};

fn ids(stream: VertexStream<'_>) -> Vec<String> {
    stream
        .map(|r| r.expect("vertex").id.to_string())
        .collect()
}

fn chain() -> SharedGraph {
    let mut graph = FiniteGraph::directed("chain");
    graph.add_vertex_range(["A", "B", "C"].map(Vertex::new));
    graph.add_edge_range([Edge::new("A", "B"), Edge::new("B", "C")]);
    Arc::new(graph)
}

// =============================================================================
// TIER T0: MODEL INTEGRITY
// =============================================================================

mod t0_model_integrity {
    use super::*;

    /// T0.1: Compound identifiers reject missing parts.
    #[test]
    fn compound_requires_both_parts() {
        let missing_parent = CompoundIdentifier::try_new(None, Some(Identity::from("x")));
        let missing_aux = CompoundIdentifier::try_new(Some(Identity::from("x")), None);
        assert!(matches!(missing_parent, Err(GraphError::InvalidArgument(_))));
        assert!(matches!(missing_aux, Err(GraphError::InvalidArgument(_))));
    }

    /// T0.2: Edges without an explicit id collapse per endpoint pair.
    #[test]
    fn default_edge_ids_collapse_parallel_edges() {
        let mut graph = FiniteGraph::directed("g");
        graph.add_vertex_range(["a", "b"].map(Vertex::new));
        assert!(graph.add_edge(Edge::new("a", "b")));
        assert!(!graph.add_edge(Edge::new("a", "b")));
        assert!(graph.add_edge(Edge::new("a", "b").with_id("second")));
        assert_eq!(graph.edge_count(), 2);
    }

    /// T0.3: Bad patterns fail at construction.
    #[test]
    fn bad_pattern_is_invalid_argument() {
        assert!(matches!(Pattern::new("[unclosed"), Err(GraphError::InvalidArgument(_))));
    }
}

// =============================================================================
// TIER T1: FINITE GRAPH CONSTRUCTION
// =============================================================================

mod t1_finite_graph {
    use super::*;

    /// T1.1: Scenario A. Complete graph on 4 vertices.
    #[test]
    fn complete_graph_counts() {
        let graph = complete_graph(4);
        assert_eq!(graph.edge_count(), 6);
        let vertices: Vec<Vertex> = graph
            .get_vertices()
            .map(|r| r.expect("vertex"))
            .collect();
        assert_eq!(vertices.len(), 4);
        for vertex in vertices {
            assert_eq!(vertex.degree(), 3);
        }
    }

    /// T1.2: Undirected edges make both ends children and parents.
    #[test]
    fn undirected_symmetry() {
        let mut graph = FiniteGraph::undirected("u");
        graph.add_vertex_range(["A", "B"].map(Vertex::new));
        graph.add_edge(Edge::new("A", "B"));

        for (from, to) in [("A", "B"), ("B", "A")] {
            assert_eq!(ids(graph.get_child_vertices(&from.into())), [to]);
            assert_eq!(ids(graph.get_parent_vertices(&from.into())), [to]);
        }
    }

    /// T1.3: Duplicates and absent elements are no-ops.
    #[test]
    fn build_api_is_idempotent() {
        let mut graph = FiniteGraph::directed("g");
        assert!(graph.add_vertex(Vertex::new("a")));
        assert!(!graph.add_vertex(Vertex::new("a")));
        assert!(!graph.remove_vertex(&"missing".into()));
        assert!(!graph.remove_edge(&"missing".into()));
        assert_eq!(graph.vertex_count(), 1);
    }

    /// T1.4: Children whose vertex was never added are skipped.
    #[test]
    fn missing_child_vertices_are_skipped() {
        let mut graph = FiniteGraph::directed("g");
        graph.add_vertex(Vertex::new("a"));
        graph.add_edge(Edge::new("a", "ghost"));
        assert!(ids(graph.get_child_vertices(&"a".into())).is_empty());
    }
}

// =============================================================================
// TIER T2: WRAPPER SEMANTICS
// =============================================================================

mod t2_wrappers {
    use super::*;

    /// T2.1: Filtering keeps exactly the accepted vertices, unchanged.
    #[test]
    fn filter_is_sound() {
        let source = chain();
        let filtered = FilterGraph::new(Arc::clone(&source), |v| Ok(v.id != Identity::from("B")));
        let expected: Vec<Vertex> = source
            .as_entire()
            .expect("entire")
            .get_vertices()
            .map(|r| r.expect("vertex"))
            .filter(|v| v.id != Identity::from("B"))
            .collect();
        let actual: Vec<Vertex> = filtered
            .get_vertices()
            .map(|r| r.expect("vertex"))
            .collect();
        assert_eq!(actual, expected);
    }

    /// T2.2: Surviving vertices keep edges to filtered-out vertices.
    #[test]
    fn filter_preserves_dangling_edges() {
        let filtered = FilterGraph::from_selector(
            chain(),
            Selector::Include {
                ids: vec!["A".into()],
            },
        );
        let a = filtered
            .get_vertices()
            .next()
            .expect("item")
            .expect("A");
        assert_eq!(a.id, Identity::from("A"));
        assert!(a.out_edges().any(|e| e.target == Identity::from("B")));
    }

    /// T2.3: Empty And and Or both select everything.
    #[test]
    fn vacuous_composition_selects_all() {
        let graph = chain();
        for selector in [
            Selector::And { selectors: vec![] },
            Selector::Or { selectors: vec![] },
        ] {
            assert_eq!(ids(selector.select_vertices(&*graph)), ["A", "B", "C"]);
        }
    }

    /// T2.4: Enumeration over an infinite source fails at use.
    #[test]
    fn infinite_source_is_not_enumerable() {
        let filtered = FilterGraph::new(Arc::new(InfiniteDirectedGraph::default()), |_| Ok(true));
        let first = filtered.get_vertices().next().expect("item");
        assert!(matches!(
            first,
            Err(GraphError::NotSupported {
                capability: Capability::Entire,
                ..
            })
        ));
    }

    /// T2.5: Reversal swaps children and parents, and vetoes roots.
    #[test]
    fn reverse_swaps_adjacency() {
        let reversed = ReverseEdgesGraph::new(chain());
        assert_eq!(ids(reversed.get_child_vertices(&"C".into())), ["B"]);
        assert_eq!(ids(reversed.get_parent_vertices(&"A".into())), ["B"]);
        assert!(reversed.as_rooted().is_none());
    }

    /// T2.6: Coercion failures pass the value through.
    #[test]
    fn coercion_failure_is_swallowed() {
        let mut graph = FiniteGraph::directed("g");
        graph.add_vertex(Vertex::new("v").with_property(Property::new("n", "twelve")));
        let actor = Actor::new(Arc::new(graph), Selector::All, Action::StringToNumber);
        let vertex = actor
            .get_vertex(&"v".into())
            .expect("get")
            .expect("vertex");
        assert_eq!(vertex.properties[0].value, Value::from("twelve"));
    }
}

// =============================================================================
// TIER T3: TRAVERSAL AND PIPELINES
// =============================================================================

mod t3_traversal {
    use super::*;

    fn descendants(graph: SharedGraph, order: TraversalOrder) -> Vec<String> {
        let view = HierarchyGraph::descendants(graph, "A").order(order);
        ids(view.as_entire().expect("entire").get_vertices())
    }

    /// T3.1: Scenario C. Pre- and postorder on a chain.
    #[test]
    fn chain_orders() {
        assert_eq!(descendants(chain(), TraversalOrder::Preorder), ["A", "B", "C"]);
        assert_eq!(descendants(chain(), TraversalOrder::Postorder), ["C", "B", "A"]);
    }

    /// T3.2: Depth 0 with roots yields only the root.
    #[test]
    fn depth_zero_is_root_only() {
        let view = HierarchyGraph::descendants(chain(), "A").depth(Some(0));
        assert_eq!(ids(view.as_entire().expect("entire").get_vertices()), ["A"]);
    }

    /// T3.3: A diamond emits each vertex once.
    #[test]
    fn diamond_emits_once() {
        let mut graph = FiniteGraph::directed("diamond");
        graph.add_vertex_range(["A", "B", "C", "D"].map(Vertex::new));
        graph.add_edge_range([
            Edge::new("A", "B"),
            Edge::new("A", "C"),
            Edge::new("B", "D"),
            Edge::new("C", "D"),
        ]);
        assert_eq!(
            descendants(Arc::new(graph), TraversalOrder::Preorder),
            ["A", "B", "D", "C"]
        );
    }

    /// T3.4: A cycle through the root terminates.
    #[test]
    fn cycle_terminates() {
        let mut graph = FiniteGraph::directed("cycle");
        graph.add_vertex_range(["A", "B", "C"].map(Vertex::new));
        graph.add_edge_range([Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("C", "A")]);
        assert_eq!(
            descendants(Arc::new(graph), TraversalOrder::Preorder),
            ["A", "B", "C"]
        );
    }

    /// T3.5: Scenario B. Regex replacement through an actor.
    #[test]
    fn actor_string_replace() {
        let mut graph = FiniteGraph::directed("g");
        graph.add_vertex(Vertex::new("v").with_property(Property::new("name", "foo123")));
        let actor = Actor::new(
            Arc::new(graph),
            Selector::All,
            Action::StringReplace {
                pattern: Pattern::new("[0-9]+").expect("pattern"),
                replacement: String::new(),
            },
        );
        let vertex = actor
            .get_vertices()
            .next()
            .expect("item")
            .expect("vertex");
        assert_eq!(vertex.properties[0].value, Value::from("foo"));
    }

    /// T3.6: Stacked wrappers compose: ancestors of C in the reversed chain
    /// are the descendants of C in the original.
    #[test]
    fn stacked_wrappers_compose() {
        let mut graph = FiniteGraph::directed("g");
        graph.add_vertex_range(["A", "B", "C", "D"].map(Vertex::new));
        graph.add_edge_range([Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("C", "D")]);
        let reversed: SharedGraph = Arc::new(ReverseEdgesGraph::new(Arc::new(graph)));
        let view = HierarchyGraph::new(reversed, Direction::Ancestors, "C").include_roots(false);
        assert_eq!(ids(view.as_entire().expect("entire").get_vertices()), ["D"]);
    }

    /// T3.7: Structural selection over an infinite graph stays lazy.
    #[test]
    fn bounded_selection_on_infinite_graph() {
        let graph = InfiniteDirectedGraph::default();
        let root = graph.roots().next().expect("root").expect("id");
        let selector = Selector::Descendants(HierarchySelection {
            depth: Some(2),
            ..HierarchySelection::new(vec![root.clone()])
        });
        let selected: Vec<Vertex> = selector
            .select_vertices(&graph)
            .take(50)
            .map(|r| r.expect("vertex"))
            .collect();
        assert_eq!(selected.first().map(|v| &v.id), Some(&root));
    }
}
