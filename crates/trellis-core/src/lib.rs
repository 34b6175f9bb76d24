//! # trellis-core
//!
//! The graph abstraction and lazy transformation engine for Trellis.
//!
//! A graph is a bundle of independently implementable capabilities
//! (enumerate-all, lookup-by-id, in/out adjacency, root discovery).
//! Consumers negotiate for a capability before using it; wrappers forward,
//! reinterpret or veto the capabilities of the graph they hold. Every read is
//! a pull-based iterator, so graphs that are slow, remote or infinite are used
//! exactly like in-memory ones.
//!
//! ## Layers
//!
//! - Model: `identity`, `property`, `element`, `types`
//! - Capabilities: `graph`, `wrapper`
//! - Sources: `finite`, `synthetic`
//! - Transformations: `filter`, `reverse`, `hierarchy`, `actor`
//! - Algorithms: `traversal`, `selector`
//!
//! ## Architectural Constraints
//!
//! - Nothing is materialized beyond what a consumer pulls
//! - Missing capabilities are `None`, never errors; a transformation that needs
//!   one fails with `NotSupported` when it is used, not when it is built
//! - Sources are shared read-only after build; per-call visited sets are the
//!   only traversal state
//! - NO async runtime, NO network dependencies

// =============================================================================
// MODULES
// =============================================================================

pub mod actor;
pub mod element;
pub mod filter;
pub mod finite;
pub mod graph;
pub mod hierarchy;
pub mod identity;
pub mod primitives;
pub mod property;
pub mod reverse;
pub mod selector;
pub mod synthetic;
pub mod traversal;
pub mod types;
pub mod wrapper;

// =============================================================================
// RE-EXPORTS: Model
// =============================================================================

pub use element::{Edge, Element, GraphAttributes, GraphInfo, Vertex};
pub use identity::{CompoundIdentifier, Identity};
pub use property::{Property, find_property};
pub use types::{Capability, Direction, GraphError, TraversalOrder, Value};

// =============================================================================
// RE-EXPORTS: Capabilities
// =============================================================================

pub use graph::{
    DynamicGraph, DynamicInGraph, DynamicOutGraph, EdgeStream, EntireGraph, Graph,
    GraphCapabilities, IdentityStream, RootedGraph, SharedGraph, VertexStream,
};
pub use wrapper::WrapperGraph;

// =============================================================================
// RE-EXPORTS: Sources and Transformations
// =============================================================================

pub use actor::{Action, Actor};
pub use filter::{FilterGraph, VertexPredicate};
pub use finite::FiniteGraph;
pub use hierarchy::HierarchyGraph;
pub use reverse::ReverseEdgesGraph;
pub use synthetic::{
    InfiniteDirectedGraph, InfiniteDirectedGraphParameters, RandomGraphParameters,
    complete_graph, cyclic_graph, hub_graph, path_graph, random_finite_undirected_graph,
};

// =============================================================================
// RE-EXPORTS: Algorithms
// =============================================================================

pub use selector::{HierarchySelection, Pattern, Selector};
pub use traversal::{HierarchyWalk, Neighbours, contains_within, frontier_collect};
