//! # Finite Graph
//!
//! Materialized, directed-or-undirected in-memory graph.
//!
//! Vertices are stored bare (without edges). Adjacency lives in two indices,
//! `in_edges` and `out_edges`, keyed by vertex identity. A vertex's edge view
//! is rebuilt from the indices on every read, so adding or removing an edge
//! never touches a vertex object and reads are always consistent.
//!
//! Build operations return success flags or counts and are idempotent:
//! duplicate or absent elements are no-ops, never errors.
//!
//! Single writer during build. After build the graph is read-only and may be
//! shared across threads (`Arc<FiniteGraph>`).

use crate::element::{Edge, GraphAttributes, GraphInfo, Vertex};
use crate::graph::{
    DynamicGraph, DynamicInGraph, DynamicOutGraph, EdgeStream, EntireGraph, Graph, IdentityStream,
    RootedGraph, VertexStream,
};
use crate::identity::Identity;
use crate::types::GraphError;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

// =============================================================================
// EDGE SET
// =============================================================================

/// Insertion-ordered set of edges, deduplicated by edge identity.
#[derive(Debug, Clone, Default)]
struct EdgeSet {
    order: Vec<Identity>,
    edges: BTreeMap<Identity, Edge>,
}

impl EdgeSet {
    fn insert(&mut self, edge: Edge) -> bool {
        if self.edges.contains_key(&edge.id) {
            return false;
        }
        self.order.push(edge.id.clone());
        self.edges.insert(edge.id.clone(), edge);
        true
    }

    fn remove(&mut self, id: &Identity) -> bool {
        if self.edges.remove(id).is_none() {
            return false;
        }
        self.order.retain(|existing| existing != id);
        true
    }

    fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.order.iter().filter_map(|id| self.edges.get(id))
    }
}

// =============================================================================
// FINITE GRAPH
// =============================================================================

/// A materialized graph implementing every capability.
#[derive(Debug, Clone)]
pub struct FiniteGraph {
    info: GraphInfo,
    directed: bool,
    /// Bare vertices: id -> vertex without edges.
    vertices: BTreeMap<Identity, Vertex>,
    /// Vertex insertion order.
    vertex_order: Vec<Identity>,
    /// Every stored edge by edge id (undirected edges stored once here).
    edges: EdgeSet,
    /// id -> edges pointing into the vertex.
    in_edges: BTreeMap<Identity, EdgeSet>,
    /// id -> edges pointing out of the vertex.
    out_edges: BTreeMap<Identity, EdgeSet>,
}

impl FiniteGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new(id: impl Into<Identity>, directed: bool) -> Self {
        Self {
            info: GraphInfo::new(id),
            directed,
            vertices: BTreeMap::new(),
            vertex_order: Vec::new(),
            edges: EdgeSet::default(),
            in_edges: BTreeMap::new(),
            out_edges: BTreeMap::new(),
        }
    }

    /// Create an empty directed graph.
    #[must_use]
    pub fn directed(id: impl Into<Identity>) -> Self {
        Self::new(id, true)
    }

    /// Create an empty undirected graph.
    #[must_use]
    pub fn undirected(id: impl Into<Identity>) -> Self {
        Self::new(id, false)
    }

    /// Replace the graph's element data.
    #[must_use]
    pub fn with_info(mut self, info: GraphInfo) -> Self {
        self.info = info;
        self
    }

    /// Materialize an enumerable graph.
    pub fn from_graph(graph: &dyn Graph) -> Result<Self, GraphError> {
        let entire = graph.require_entire("FiniteGraph::from_graph")?;
        let mut finite = Self::new(graph.info().id.clone(), graph.attributes().directed)
            .with_info(graph.info().clone());
        for vertex in entire.get_vertices() {
            finite.add_vertex(vertex?);
        }
        Ok(finite)
    }

    /// Materialize the subgraph induced by `ids` using lookups only.
    ///
    /// Edges with an endpoint outside `ids` are dropped. Unknown ids are skipped.
    pub fn subgraph(graph: &dyn Graph, ids: &[Identity]) -> Result<Self, GraphError> {
        let dynamic = graph.require_dynamic("FiniteGraph::subgraph")?;
        let members: BTreeSet<&Identity> = ids.iter().collect();
        let mut finite = Self::new(graph.info().id.clone(), graph.attributes().directed);
        for vertex in dynamic.get_vertices_by_id(ids) {
            let mut vertex = vertex?;
            vertex
                .edges
                .retain(|e| members.contains(&e.source) && members.contains(&e.target));
            finite.add_vertex(vertex);
        }
        Ok(finite)
    }

    // -------------------------------------------------------------------------
    // Build API
    // -------------------------------------------------------------------------

    /// Register a vertex, then add any edges already attached to it.
    ///
    /// Returns `false` if a vertex with the same identity exists.
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        if self.vertices.contains_key(&vertex.id) {
            trace!(id = %vertex.id, "add_vertex: duplicate ignored");
            return false;
        }
        let Vertex {
            id,
            label,
            description,
            properties,
            edges,
        } = vertex;
        self.vertex_order.push(id.clone());
        self.vertices.insert(
            id.clone(),
            Vertex {
                id,
                label,
                description,
                properties,
                edges: Vec::new(),
            },
        );
        self.add_edge_range(edges);
        true
    }

    /// Add several vertices. Returns how many were new.
    pub fn add_vertex_range(&mut self, vertices: impl IntoIterator<Item = Vertex>) -> usize {
        vertices
            .into_iter()
            .map(|v| self.add_vertex(v))
            .filter(|added| *added)
            .count()
    }

    /// Add an edge to the adjacency indices.
    ///
    /// In an undirected graph (or for an undirected edge) the edge is marked
    /// undirected and stored in both indices of both endpoints. Returns
    /// `false` if an edge with the same identity exists.
    pub fn add_edge(&mut self, mut edge: Edge) -> bool {
        if self.edges.edges.contains_key(&edge.id) {
            trace!(id = %edge.id, "add_edge: duplicate ignored");
            return false;
        }
        if !self.directed {
            edge.directed = false;
        }
        if edge.directed {
            self.in_edges
                .entry(edge.target.clone())
                .or_default()
                .insert(edge.clone());
            self.out_edges
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.clone());
        } else {
            for end in [&edge.source, &edge.target] {
                self.in_edges
                    .entry(end.clone())
                    .or_default()
                    .insert(edge.clone());
                self.out_edges
                    .entry(end.clone())
                    .or_default()
                    .insert(edge.clone());
            }
        }
        self.edges.insert(edge)
    }

    /// Add several edges. Returns how many were new.
    pub fn add_edge_range(&mut self, edges: impl IntoIterator<Item = Edge>) -> usize {
        edges
            .into_iter()
            .map(|e| self.add_edge(e))
            .filter(|added| *added)
            .count()
    }

    /// Remove a vertex. Its edges stay in the adjacency indices.
    pub fn remove_vertex(&mut self, id: &Identity) -> bool {
        if self.vertices.remove(id).is_none() {
            trace!(%id, "remove_vertex: absent");
            return false;
        }
        self.vertex_order.retain(|existing| existing != id);
        true
    }

    /// Remove several vertices. Returns how many existed.
    pub fn remove_vertex_range<'a>(&mut self, ids: impl IntoIterator<Item = &'a Identity>) -> usize {
        ids.into_iter()
            .map(|id| self.remove_vertex(id))
            .filter(|removed| *removed)
            .count()
    }

    /// Remove an edge by identity from every index it appears in.
    pub fn remove_edge(&mut self, id: &Identity) -> bool {
        let Some(edge) = self.edges.edges.get(id).cloned() else {
            trace!(%id, "remove_edge: absent");
            return false;
        };
        for end in [&edge.source, &edge.target] {
            if let Some(set) = self.in_edges.get_mut(end) {
                set.remove(id);
            }
            if let Some(set) = self.out_edges.get_mut(end) {
                set.remove(id);
            }
        }
        self.edges.remove(id)
    }

    /// Remove several edges by identity. Returns how many existed.
    pub fn remove_edge_range<'a>(&mut self, ids: impl IntoIterator<Item = &'a Identity>) -> usize {
        ids.into_iter()
            .map(|id| self.remove_edge(id))
            .filter(|removed| *removed)
            .count()
    }

    /// Remove every vertex and edge.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.vertex_order.clear();
        self.edges = EdgeSet::default();
        self.in_edges.clear();
        self.out_edges.clear();
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Number of stored vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of stored edges. Undirected edges count once.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.edges.len()
    }

    /// Whether a vertex with this identity is stored.
    #[must_use]
    pub fn contains_vertex(&self, id: &Identity) -> bool {
        self.vertices.contains_key(id)
    }

    /// Whether this graph is directed.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Rebuild a vertex from its bare copy and the union of its edge sets.
    fn reconstruct(&self, id: &Identity) -> Option<Vertex> {
        let mut vertex = self.vertices.get(id)?.clone();
        let mut seen = BTreeSet::new();
        let ins = self.in_edges.get(id).into_iter().flat_map(EdgeSet::iter);
        let outs = self.out_edges.get(id).into_iter().flat_map(EdgeSet::iter);
        vertex.edges = ins
            .chain(outs)
            .filter(|e| seen.insert(e.id.clone()))
            .cloned()
            .collect();
        Some(vertex)
    }

    /// Vertices at the other end of each edge in `index[id]`, skipping ends
    /// with no stored vertex.
    fn neighbours<'a>(
        &'a self,
        index: &'a BTreeMap<Identity, EdgeSet>,
        id: &Identity,
    ) -> VertexStream<'a> {
        let edges = index.get(id).into_iter().flat_map(EdgeSet::iter);
        let id = id.clone();
        Box::new(edges.filter_map(move |edge| {
            let other = edge.other_end(&id)?;
            self.reconstruct(other).map(Ok)
        }))
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

impl DynamicGraph for FiniteGraph {
    fn get_vertex(&self, id: &Identity) -> Result<Option<Vertex>, GraphError> {
        Ok(self.reconstruct(id))
    }
}

impl DynamicInGraph for FiniteGraph {
    fn get_parent_vertices<'a>(&'a self, id: &Identity) -> VertexStream<'a> {
        self.neighbours(&self.in_edges, id)
    }
}

impl DynamicOutGraph for FiniteGraph {
    fn get_child_vertices<'a>(&'a self, id: &Identity) -> VertexStream<'a> {
        self.neighbours(&self.out_edges, id)
    }
}

impl EntireGraph for FiniteGraph {
    fn get_vertices(&self) -> VertexStream<'_> {
        Box::new(
            self.vertex_order
                .iter()
                .filter_map(|id| self.reconstruct(id).map(Ok)),
        )
    }

    fn get_edges(&self) -> EdgeStream<'_> {
        Box::new(self.edges.iter().cloned().map(Ok))
    }
}

impl RootedGraph for FiniteGraph {
    fn roots(&self) -> IdentityStream<'_> {
        Box::new(
            self.vertex_order
                .iter()
                .filter(|id| self.in_edges.get(*id).is_none_or(EdgeSet::is_empty))
                .cloned()
                .map(Ok),
        )
    }
}

impl Graph for FiniteGraph {
    fn info(&self) -> &GraphInfo {
        &self.info
    }

    fn attributes(&self) -> GraphAttributes {
        GraphAttributes::materialized(self.directed)
    }

    fn as_dynamic(&self) -> Option<&dyn DynamicGraph> {
        Some(self)
    }

    fn as_dynamic_in(&self) -> Option<&dyn DynamicInGraph> {
        Some(self)
    }

    fn as_dynamic_out(&self) -> Option<&dyn DynamicOutGraph> {
        Some(self)
    }

    fn as_entire(&self) -> Option<&dyn EntireGraph> {
        Some(self)
    }

    fn as_rooted(&self) -> Option<&dyn RootedGraph> {
        Some(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================
