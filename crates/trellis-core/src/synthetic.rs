//! # Synthetic Graphs
//!
//! Deterministic generators for tests, benches and the CLI.
//!
//! - Shaped finite graphs: complete, path, cyclic, hub.
//! - `random_finite_undirected_graph`: seeded vertex and edge sampling.
//! - `InfiniteDirectedGraph`: a procedurally generated graph that is never
//!   materialized. Each vertex is a pure function of `(seed, id)`.

use crate::element::{Edge, GraphAttributes, GraphInfo, Vertex};
use crate::finite::FiniteGraph;
use crate::graph::{
    DynamicGraph, DynamicOutGraph, Graph, IdentityStream, RootedGraph, VertexStream,
};
use crate::identity::Identity;
use crate::primitives::{
    DEFAULT_CHILD_COUNT, DEFAULT_PROPERTY_COUNT, DEFAULT_PROPERTY_INCLUSION, MAX_GENERATED_INT,
    PSEUDOWORD_SYLLABLES,
};
use crate::property::Property;
use crate::types::{GraphError, Value};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

// =============================================================================
// SHAPED GRAPHS
// =============================================================================

/// Undirected complete graph on vertices `0..n`: `n(n-1)/2` edges.
#[must_use]
pub fn complete_graph(n: usize) -> FiniteGraph {
    let mut graph = FiniteGraph::undirected(format!("complete-{n}"));
    graph.add_vertex_range((0..n).map(Vertex::new));
    for m in 0..n {
        graph.add_edge_range((m.saturating_add(1)..n).map(|k| Edge::new(m, k)));
    }
    graph
}

/// Path `0 - 1 - ... - (n-1)`.
#[must_use]
pub fn path_graph(n: usize, directed: bool) -> FiniteGraph {
    let mut graph = FiniteGraph::new(format!("path-{n}"), directed);
    graph.add_vertex_range((0..n).map(Vertex::new));
    graph.add_edge_range((1..n).map(|k| Edge::new(k.saturating_sub(1), k)));
    graph
}

/// Undirected ring on `0..n`. Fewer than three vertices give a path.
#[must_use]
pub fn cyclic_graph(n: usize) -> FiniteGraph {
    let mut graph = path_graph(n, false).with_info(GraphInfo::new(format!("cycle-{n}")));
    if n >= 3 {
        graph.add_edge(Edge::new(n.saturating_sub(1), 0_usize));
    }
    graph
}

/// Hub `0` with a directed spoke to each of `1..n`.
#[must_use]
pub fn hub_graph(n: usize) -> FiniteGraph {
    let mut graph = FiniteGraph::directed(format!("hub-{n}"));
    graph.add_vertex_range((0..n).map(Vertex::new));
    graph.add_edge_range((1..n).map(|k| Edge::new(0_usize, k)));
    graph
}

// =============================================================================
// RANDOM FINITE GRAPH
// =============================================================================

/// Parameters of `random_finite_undirected_graph`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RandomGraphParameters {
    /// Generator seed.
    pub seed: u64,
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of edges. Clamped to the number of distinct vertex pairs.
    pub edge_count: usize,
    /// Whether vertices get pseudoword labels.
    pub labeled: bool,
}

impl Default for RandomGraphParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            vertex_count: 10,
            edge_count: 15,
            labeled: false,
        }
    }
}

/// Undirected graph on `0..vertex_count` with edges sampled without
/// replacement from the distinct unordered pairs.
#[must_use]
pub fn random_finite_undirected_graph(parameters: &RandomGraphParameters) -> FiniteGraph {
    let mut rng = StdRng::seed_from_u64(parameters.seed);
    let n = parameters.vertex_count;

    let mut graph = FiniteGraph::undirected(format!("random-{}", parameters.seed));
    for id in 0..n {
        let vertex = Vertex::new(id);
        graph.add_vertex(if parameters.labeled {
            vertex.with_label(pseudoword(&mut rng))
        } else {
            vertex
        });
    }

    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|m| (m.saturating_add(1)..n).map(move |k| (m, k)))
        .collect();
    let amount = parameters.edge_count.min(pairs.len());
    if amount < parameters.edge_count {
        debug!(
            requested = parameters.edge_count,
            possible = pairs.len(),
            "edge count clamped"
        );
    }
    graph.add_edge_range(
        pairs
            .choose_multiple(&mut rng, amount)
            .map(|&(m, k)| Edge::new(m, k)),
    );
    graph
}

// =============================================================================
// INFINITE DIRECTED GRAPH
// =============================================================================

/// Parameters of `InfiniteDirectedGraph`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InfiniteDirectedGraphParameters {
    /// Generator seed. Fixes the property schema, the root and every vertex.
    pub seed: u64,
    /// Maximum number of children per vertex. Each vertex draws `0..=child_count`.
    pub child_count: usize,
    /// Number of properties in the schema.
    pub property_count: usize,
    /// Chance, in percent, that a vertex carries each schema property.
    pub property_inclusion: u8,
    /// Whether vertices get pseudoword labels.
    pub labeled: bool,
}

impl Default for InfiniteDirectedGraphParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            child_count: DEFAULT_CHILD_COUNT,
            property_count: DEFAULT_PROPERTY_COUNT,
            property_inclusion: DEFAULT_PROPERTY_INCLUSION,
            labeled: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PropertyKind {
    Int,
    Float,
    Word,
}

/// A procedurally generated, never-ending directed graph.
///
/// Provides lookup, children and roots. Enumeration and parents are not
/// available: the graph is infinite and a vertex does not know its parents.
#[derive(Debug, Clone)]
pub struct InfiniteDirectedGraph {
    info: GraphInfo,
    parameters: InfiniteDirectedGraphParameters,
    schema: Vec<(String, PropertyKind)>,
    root: Identity,
}

impl InfiniteDirectedGraph {
    /// Build the generator. Only the schema and the root are drawn up front.
    #[must_use]
    pub fn new(parameters: InfiniteDirectedGraphParameters) -> Self {
        let mut rng = StdRng::seed_from_u64(parameters.seed);

        let mut names = BTreeSet::new();
        let mut schema = Vec::with_capacity(parameters.property_count);
        let attempts = parameters.property_count.saturating_mul(16);
        for _ in 0..attempts {
            if schema.len() == parameters.property_count {
                break;
            }
            let name = pseudoword(&mut rng);
            let kind = match rng.gen_range(0..3) {
                0 => PropertyKind::Int,
                1 => PropertyKind::Float,
                _ => PropertyKind::Word,
            };
            if names.insert(name.clone()) {
                schema.push((name, kind));
            }
        }

        let root = Identity::from(rng.gen_range(0..i64::MAX));
        Self {
            info: GraphInfo::new(format!("infinite-{}", parameters.seed)),
            parameters,
            schema,
            root,
        }
    }

    /// The generator parameters.
    #[must_use]
    pub fn parameters(&self) -> &InfiniteDirectedGraphParameters {
        &self.parameters
    }

    /// Per-vertex generator, seeded from a blake3 digest of `(seed, id)`.
    fn vertex_rng(&self, id: &Identity) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.parameters.seed.to_le_bytes());
        hasher.update(id.to_string().as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.as_bytes()[..8]);
        StdRng::seed_from_u64(u64::from_le_bytes(bytes))
    }

    fn generate(&self, id: &Identity) -> Vertex {
        let mut rng = self.vertex_rng(id);

        let mut vertex = Vertex::new(id.clone());
        for (name, kind) in &self.schema {
            if rng.gen_range(0..100u8) >= self.parameters.property_inclusion {
                continue;
            }
            let value = match kind {
                PropertyKind::Int => Value::Int(rng.gen_range(1..=MAX_GENERATED_INT)),
                PropertyKind::Float => Value::Float(rng.r#gen::<f64>()),
                PropertyKind::Word => Value::String(pseudoword(&mut rng)),
            };
            vertex.properties.push(Property::new(name.clone(), value));
        }
        if self.parameters.labeled {
            vertex.label = Some(pseudoword(&mut rng));
        }

        let children = rng.gen_range(0..=self.parameters.child_count);
        for _ in 0..children {
            let child = Identity::from(rng.gen_range(0..i64::MAX));
            vertex.edges.push(Edge::new(id.clone(), child));
        }
        vertex
    }
}

impl Default for InfiniteDirectedGraph {
    fn default() -> Self {
        Self::new(InfiniteDirectedGraphParameters::default())
    }
}

impl Graph for InfiniteDirectedGraph {
    fn info(&self) -> &GraphInfo {
        &self.info
    }

    fn attributes(&self) -> GraphAttributes {
        GraphAttributes {
            directed: true,
            dynamic: true,
            finite: false,
        }
    }

    fn as_dynamic(&self) -> Option<&dyn DynamicGraph> {
        Some(self)
    }

    fn as_dynamic_out(&self) -> Option<&dyn DynamicOutGraph> {
        Some(self)
    }

    fn as_rooted(&self) -> Option<&dyn RootedGraph> {
        Some(self)
    }
}

impl DynamicGraph for InfiniteDirectedGraph {
    fn get_vertex(&self, id: &Identity) -> Result<Option<Vertex>, GraphError> {
        Ok(Some(self.generate(id)))
    }
}

impl DynamicOutGraph for InfiniteDirectedGraph {
    fn get_child_vertices<'a>(&'a self, id: &Identity) -> VertexStream<'a> {
        let parent = self.generate(id);
        Box::new(
            parent
                .edges
                .into_iter()
                .map(move |edge| Ok(self.generate(&edge.target))),
        )
    }
}

impl RootedGraph for InfiniteDirectedGraph {
    fn roots(&self) -> IdentityStream<'_> {
        Box::new(std::iter::once(Ok(self.root.clone())))
    }
}

// =============================================================================
// PSEUDOWORDS
// =============================================================================

const ONSETS: [&str; 16] = [
    "b", "d", "f", "g", "k", "l", "m", "n", "p", "r", "s", "t", "v", "z", "sh", "th",
];
const NUCLEI: [&str; 6] = ["a", "e", "i", "o", "u", "ai"];

/// A pronounceable lowercase word of a few syllables.
fn pseudoword(rng: &mut StdRng) -> String {
    let syllables = rng.gen_range(PSEUDOWORD_SYLLABLES);
    let mut word = String::new();
    for _ in 0..syllables {
        if let (Some(onset), Some(nucleus)) = (ONSETS.choose(rng), NUCLEI.choose(rng)) {
            word.push_str(onset);
            word.push_str(nucleus);
        }
    }
    word
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EntireGraph;
    use crate::types::Capability;

    #[test]
    fn complete_graph_has_every_pair() {
        let graph = complete_graph(4);
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 6);
        for vertex in graph.get_vertices() {
            assert_eq!(vertex.expect("vertex").degree(), 3);
        }
    }

    #[test]
    fn shaped_graphs_have_expected_sizes() {
        assert_eq!(path_graph(5, true).edge_count(), 4);
        assert_eq!(cyclic_graph(5).edge_count(), 5);
        assert_eq!(cyclic_graph(2).edge_count(), 1);
        let hub = hub_graph(5);
        assert_eq!(hub.edge_count(), 4);
        let roots: Vec<Identity> = hub.roots().map(|r| r.expect("root")).collect();
        assert_eq!(roots, vec![Identity::from(0)]);
    }

    #[test]
    fn random_graph_is_seeded_and_clamped() {
        let parameters = RandomGraphParameters {
            seed: 7,
            vertex_count: 5,
            edge_count: 100,
            labeled: true,
        };
        let graph = random_finite_undirected_graph(&parameters);
        assert_eq!(graph.edge_count(), 10);

        let parameters = RandomGraphParameters {
            edge_count: 4,
            ..parameters
        };
        let a = random_finite_undirected_graph(&parameters);
        let b = random_finite_undirected_graph(&parameters);
        let edges = |g: &FiniteGraph| -> Vec<Edge> {
            g.get_edges().map(|r| r.expect("edge")).collect()
        };
        assert_eq!(a.edge_count(), 4);
        assert_eq!(edges(&a), edges(&b));
    }

    #[test]
    fn infinite_vertices_are_pure_functions_of_id() {
        let graph = InfiniteDirectedGraph::new(InfiniteDirectedGraphParameters {
            seed: 3,
            labeled: true,
            ..InfiniteDirectedGraphParameters::default()
        });
        let root = graph.roots().next().expect("root").expect("id");
        let once = graph.get_vertex(&root).expect("get").expect("vertex");
        let twice = graph.get_vertex(&root).expect("get").expect("vertex");
        assert_eq!(once, twice);
        assert!(once.label.is_some());

        let children: Vec<Vertex> = graph
            .get_child_vertices(&root)
            .map(|r| r.expect("child"))
            .collect();
        assert_eq!(children.len(), once.out_edges().count());
    }

    #[test]
    fn infinite_graph_refuses_enumeration() {
        let graph = InfiniteDirectedGraph::default();
        assert!(!graph.attributes().finite);
        let caps = graph.capabilities();
        assert!(!caps.supports(Capability::Entire));
        assert!(!caps.supports(Capability::DynamicIn));
        assert!(caps.supports(Capability::DynamicOut));
        assert!(caps.supports(Capability::Rooted));
    }

    #[test]
    fn generated_properties_follow_schema() {
        let graph = InfiniteDirectedGraph::new(InfiniteDirectedGraphParameters {
            property_inclusion: 100,
            ..InfiniteDirectedGraphParameters::default()
        });
        let vertex = graph.get_vertex(&"x".into()).expect("get").expect("vertex");
        assert_eq!(vertex.properties.len(), DEFAULT_PROPERTY_COUNT);
        for property in &vertex.properties {
            if let Value::Int(n) = property.value {
                assert!((1..=MAX_GENERATED_INT).contains(&n));
            }
        }
    }
}
