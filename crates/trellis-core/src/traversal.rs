//! # Traversal
//!
//! Cycle-safe, depth-bounded hierarchy walks over the dynamic capabilities.
//!
//! - [`HierarchyWalk`]: depth-first pre/post-order walk driven by an explicit
//!   work stack, pulled lazily one vertex at a time
//! - [`contains_within`]: breadth-first membership search from a candidate
//!   back towards the walk's start
//! - [`frontier_collect`]: breadth-first expansion that fetches each frontier
//!   level concurrently
//!
//! Every call owns its visited state. Nothing is shared between calls.

use crate::element::Vertex;
use crate::graph::{DynamicInGraph, DynamicOutGraph, Graph, VertexStream};
use crate::identity::Identity;
use crate::primitives::FRONTIER_WORKERS;
use crate::types::{Capability, Direction, GraphError, TraversalOrder};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, trace};

// =============================================================================
// NEIGHBOURS
// =============================================================================

/// The adjacency a traversal follows, resolved from one graph.
#[derive(Clone, Copy)]
pub enum Neighbours<'g> {
    /// Follow out-edges.
    Children(&'g dyn DynamicOutGraph),
    /// Follow in-edges.
    Parents(&'g dyn DynamicInGraph),
}

impl<'g> Neighbours<'g> {
    /// Resolve the adjacency for `direction`, if the graph provides it.
    pub fn resolve(graph: &'g dyn Graph, direction: Direction) -> Option<Self> {
        match direction {
            Direction::Descendants => graph.as_dynamic_out().map(Self::Children),
            Direction::Ancestors => graph.as_dynamic_in().map(Self::Parents),
        }
    }

    /// Resolve the adjacency for `direction` or fail with `NotSupported`.
    pub fn require(
        graph: &'g dyn Graph,
        direction: Direction,
        operation: &'static str,
    ) -> Result<Self, GraphError> {
        Self::resolve(graph, direction).ok_or(GraphError::not_supported(
            operation,
            match direction {
                Direction::Descendants => Capability::DynamicOut,
                Direction::Ancestors => Capability::DynamicIn,
            },
        ))
    }

    /// Stream the neighbours of `id`.
    pub fn stream(self, id: &Identity) -> VertexStream<'g> {
        match self {
            Self::Children(g) => g.get_child_vertices(id),
            Self::Parents(g) => g.get_parent_vertices(id),
        }
    }

    /// Look up a single vertex.
    pub fn lookup(self, id: &Identity) -> Result<Option<Vertex>, GraphError> {
        match self {
            Self::Children(g) => g.get_vertex(id),
            Self::Parents(g) => g.get_vertex(id),
        }
    }
}

// =============================================================================
// HIERARCHY WALK
// =============================================================================

/// Whether `new` leaves strictly more room than `old`. `None` is unbounded.
fn deeper(new: Option<usize>, old: Option<usize>) -> bool {
    match (new, old) {
        (None, Some(_)) => true,
        (Some(a), Some(b)) => a > b,
        (_, None) => false,
    }
}

struct Frame<'g> {
    id: Identity,
    vertex: Option<Vertex>,
    remaining: Option<usize>,
    children: Option<VertexStream<'g>>,
    started: bool,
    emit: bool,
}

/// Lazy depth-first walk from a start vertex.
///
/// Each vertex is emitted at most once, and the walk terminates on cycles.
/// `depth = None` is unbounded; `depth = Some(0)` expands nothing. A vertex
/// reached again with more remaining depth than before is expanded again but
/// not re-emitted, so the emitted set is exactly the vertices within `depth`
/// hops of the start.
pub struct HierarchyWalk<'g> {
    neighbours: Neighbours<'g>,
    order: TraversalOrder,
    root: Identity,
    include_roots: bool,
    depth: Option<usize>,
    started: bool,
    stack: Vec<Frame<'g>>,
    emitted: BTreeSet<Identity>,
    best: BTreeMap<Identity, Option<usize>>,
}

impl<'g> HierarchyWalk<'g> {
    /// Walk `graph` from `root` in `direction`.
    ///
    /// Fails with `NotSupported` if the graph lacks the matching adjacency.
    pub fn new(
        graph: &'g dyn Graph,
        direction: Direction,
        root: Identity,
        include_roots: bool,
        depth: Option<usize>,
        order: TraversalOrder,
    ) -> Result<Self, GraphError> {
        let neighbours = Neighbours::require(graph, direction, "HierarchyWalk::new")?;
        Ok(Self::over(neighbours, root, include_roots, depth, order))
    }

    /// Walk an already resolved adjacency.
    #[must_use]
    pub fn over(
        neighbours: Neighbours<'g>,
        root: Identity,
        include_roots: bool,
        depth: Option<usize>,
        order: TraversalOrder,
    ) -> Self {
        Self {
            neighbours,
            order,
            root,
            include_roots,
            depth,
            started: false,
            stack: Vec::new(),
            emitted: BTreeSet::new(),
            best: BTreeMap::new(),
        }
    }

    fn start(&mut self) -> Result<(), GraphError> {
        debug!(root = %self.root, depth = ?self.depth, order = ?self.order, "hierarchy walk");
        let vertex = if self.include_roots {
            match self.neighbours.lookup(&self.root)? {
                Some(vertex) => Some(vertex),
                None => return Ok(()),
            }
        } else {
            None
        };
        if self.include_roots {
            self.emitted.insert(self.root.clone());
        }
        self.best.insert(self.root.clone(), self.depth);
        self.stack.push(Frame {
            id: self.root.clone(),
            vertex,
            remaining: self.depth,
            children: None,
            started: false,
            emit: self.include_roots,
        });
        Ok(())
    }

    /// Decide whether a newly reached vertex gets a frame.
    fn admit(&mut self, vertex: Vertex, remaining: Option<usize>) -> Option<Frame<'g>> {
        let id = vertex.id.clone();
        let excluded_root = !self.include_roots && id == self.root;
        let emit = !excluded_root && !self.emitted.contains(&id);
        let expand = self
            .best
            .get(&id)
            .is_none_or(|previous| deeper(remaining, *previous));
        if !emit && !expand {
            return None;
        }
        if emit {
            self.emitted.insert(id.clone());
        }
        if expand {
            self.best.insert(id.clone(), remaining);
        } else {
            // Already expanded with at least as much room; emit only.
            trace!(%id, "emit without expansion");
        }
        Some(Frame {
            id,
            vertex: Some(vertex),
            remaining: if expand { remaining } else { Some(0) },
            children: None,
            started: false,
            emit,
        })
    }
}

impl Iterator for HierarchyWalk<'_> {
    type Item = Result<Vertex, GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            if let Err(e) = self.start() {
                return Some(Err(e));
            }
        }
        loop {
            let frame = self.stack.last_mut()?;
            if !frame.started {
                frame.started = true;
                if frame.remaining != Some(0) {
                    trace!(id = %frame.id, remaining = ?frame.remaining, "expand");
                    frame.children = Some(self.neighbours.stream(&frame.id));
                }
                if self.order == TraversalOrder::Preorder && frame.emit {
                    if let Some(vertex) = frame.vertex.clone() {
                        return Some(Ok(vertex));
                    }
                }
                continue;
            }

            let remaining = frame.remaining.map(|d| d.saturating_sub(1));
            let next_child = frame.children.as_mut().and_then(Iterator::next);
            match next_child {
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(child)) => {
                    if let Some(child_frame) = self.admit(child, remaining) {
                        self.stack.push(child_frame);
                    }
                }
                None => {
                    let done = self.stack.pop()?;
                    if self.order == TraversalOrder::Postorder && done.emit {
                        if let Some(vertex) = done.vertex {
                            return Some(Ok(vertex));
                        }
                    }
                }
            }
        }
    }
}

// =============================================================================
// MEMBERSHIP
// =============================================================================

fn vertex_exists(graph: &dyn Graph, direction: Direction, id: &Identity) -> Result<bool, GraphError> {
    if let Some(dynamic) = graph.as_dynamic() {
        return Ok(dynamic.get_vertex(id)?.is_some());
    }
    let neighbours = match Neighbours::resolve(graph, direction.inverse()) {
        Some(neighbours) => neighbours,
        None => Neighbours::require(graph, direction, "contains_within")?,
    };
    Ok(neighbours.lookup(id)?.is_some())
}

/// Whether `target` lies within `depth` hops of `root` when walking in
/// `direction`.
///
/// Searches breadth-first from `target` back towards `root` through the
/// inverse adjacency. Falls back to a forward walk from `root` when the
/// inverse adjacency is missing.
pub fn contains_within(
    graph: &dyn Graph,
    direction: Direction,
    root: &Identity,
    target: &Identity,
    include_roots: bool,
    depth: Option<usize>,
) -> Result<bool, GraphError> {
    if target == root {
        return if include_roots {
            vertex_exists(graph, direction, root)
        } else {
            Ok(false)
        };
    }

    let Some(upward) = Neighbours::resolve(graph, direction.inverse()) else {
        let forward = Neighbours::require(graph, direction, "contains_within")?;
        debug!(%root, %target, "membership by forward walk");
        for vertex in HierarchyWalk::over(forward, root.clone(), false, depth, TraversalOrder::Preorder) {
            if vertex?.id == *target {
                return Ok(true);
            }
        }
        return Ok(false);
    };

    let mut visited = BTreeSet::from([target.clone()]);
    let mut queue = VecDeque::from([(target.clone(), 0usize)]);
    while let Some((id, distance)) = queue.pop_front() {
        if depth.is_some_and(|d| distance >= d) {
            continue;
        }
        for vertex in upward.stream(&id) {
            let vertex = vertex?;
            if vertex.id == *root {
                return Ok(true);
            }
            if visited.insert(vertex.id.clone()) {
                queue.push_back((vertex.id, distance.saturating_add(1)));
            }
        }
    }
    Ok(false)
}

// =============================================================================
// FRONTIER COLLECTION
// =============================================================================

/// Collect every vertex within `depth` hops of `start`, excluding `start`.
///
/// Expands one breadth-first level at a time. Each level's neighbour lists are
/// fetched on scoped worker threads and merged in completion order, so the
/// order of the result varies between runs; the set does not.
pub fn frontier_collect(
    neighbours: Neighbours<'_>,
    start: &Identity,
    depth: Option<usize>,
) -> Result<Vec<Vertex>, GraphError> {
    let mut visited = BTreeSet::from([start.clone()]);
    let mut frontier = vec![start.clone()];
    let mut collected = Vec::new();
    let mut level = 0usize;

    while !frontier.is_empty() && depth.is_none_or(|d| level < d) {
        trace!(level, width = frontier.len(), "frontier fetch");
        let workers = frontier.len().min(FRONTIER_WORKERS);
        let fetched: Result<Vec<Vertex>, GraphError> = thread::scope(|scope| {
            let (tx, rx) = mpsc::channel();
            for worker in 0..workers {
                let tx = tx.clone();
                let frontier = &frontier;
                scope.spawn(move || {
                    for id in frontier.iter().skip(worker).step_by(workers) {
                        let batch: Result<Vec<Vertex>, GraphError> = neighbours.stream(id).collect();
                        if tx.send(batch).is_err() {
                            return;
                        }
                    }
                });
            }
            drop(tx);

            let mut merged = Vec::new();
            for batch in rx {
                merged.extend(batch?);
            }
            Ok(merged)
        });

        let mut next = Vec::new();
        for vertex in fetched? {
            if visited.insert(vertex.id.clone()) {
                next.push(vertex.id.clone());
                collected.push(vertex);
            }
        }
        frontier = next;
        level = level.saturating_add(1);
    }
    Ok(collected)
}

// =============================================================================
// TESTS
// =============================================================================
