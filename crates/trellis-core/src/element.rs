//! # Graph Elements
//!
//! Immutable value types shared by every graph source and wrapper:
//! - `Edge`: a connection between two vertex identities
//! - `Vertex`: a vertex with its full adjacent-edge list
//! - `GraphInfo` / `GraphAttributes`: element data and structural flags of a graph
//!
//! All three element kinds share the `Element` trait shape
//! (identifier + label + description + properties).

use crate::identity::{CompoundIdentifier, Identity};
use crate::property::{Property, find_property};
use serde::{Deserialize, Serialize};

// =============================================================================
// ELEMENT TRAIT
// =============================================================================

/// Base shape shared by vertices, edges and graphs.
pub trait Element {
    /// Identity of this element.
    fn id(&self) -> &Identity;

    /// Human-readable label, if any.
    fn label(&self) -> Option<&str>;

    /// Free-form description, if any.
    fn description(&self) -> Option<&str>;

    /// Attached properties, in insertion order.
    fn properties(&self) -> &[Property];

    /// First top-level property with the given name.
    fn property(&self, name: &str) -> Option<&Property> {
        find_property(self.properties(), name)
    }
}

macro_rules! impl_element {
    ($ty:ty) => {
        impl Element for $ty {
            fn id(&self) -> &Identity {
                &self.id
            }

            fn label(&self) -> Option<&str> {
                self.label.as_deref()
            }

            fn description(&self) -> Option<&str> {
                self.description.as_deref()
            }

            fn properties(&self) -> &[Property] {
                &self.properties
            }
        }
    };
}

// =============================================================================
// EDGE
// =============================================================================

/// A connection from `source` to `target`.
///
/// When no identity is supplied the edge is identified by the compound
/// `(source, target)`, so parallel edges between the same pair collapse
/// unless they carry explicit ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EdgeRecord")]
pub struct Edge {
    /// Edge identity.
    pub id: Identity,
    /// Source vertex identity.
    pub source: Identity,
    /// Target vertex identity.
    pub target: Identity,
    /// Undirected edges count as both in- and out-edges of each endpoint.
    pub directed: bool,
    /// Optional label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attached properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

/// Wire shape of an edge: the id may be omitted.
#[derive(Deserialize)]
struct EdgeRecord {
    #[serde(default)]
    id: Option<Identity>,
    source: Identity,
    target: Identity,
    #[serde(default = "default_directed")]
    directed: bool,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    properties: Vec<Property>,
}

const fn default_directed() -> bool {
    true
}

impl From<EdgeRecord> for Edge {
    fn from(record: EdgeRecord) -> Self {
        let id = record.id.unwrap_or_else(|| {
            CompoundIdentifier::new(record.source.clone(), record.target.clone()).into()
        });
        Self {
            id,
            source: record.source,
            target: record.target,
            directed: record.directed,
            label: record.label,
            description: record.description,
            properties: record.properties,
        }
    }
}

impl Edge {
    /// Create a directed edge with the default `(source, target)` identity.
    #[must_use]
    pub fn new(source: impl Into<Identity>, target: impl Into<Identity>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: CompoundIdentifier::new(source.clone(), target.clone()).into(),
            source,
            target,
            directed: true,
            label: None,
            description: None,
            properties: Vec::new(),
        }
    }

    /// Replace the edge identity.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<Identity>) -> Self {
        self.id = id.into();
        self
    }

    /// Set whether the edge is directed.
    #[must_use]
    pub fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a property.
    #[must_use]
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// The same edge with `source` and `target` swapped. Identity and
    /// properties are kept.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
            ..self.clone()
        }
    }

    /// The endpoint opposite to `id`, or `None` if `id` is not an endpoint.
    #[must_use]
    pub fn other_end(&self, id: &Identity) -> Option<&Identity> {
        if self.source == *id {
            Some(&self.target)
        } else if self.target == *id {
            Some(&self.source)
        } else {
            None
        }
    }

    /// Whether `id` is one of the endpoints.
    #[must_use]
    pub fn touches(&self, id: &Identity) -> bool {
        self.source == *id || self.target == *id
    }

    /// Whether this edge points into `id`. Undirected edges point both ways.
    #[must_use]
    pub fn is_in_edge_of(&self, id: &Identity) -> bool {
        self.target == *id || (!self.directed && self.source == *id)
    }

    /// Whether this edge points out of `id`. Undirected edges point both ways.
    #[must_use]
    pub fn is_out_edge_of(&self, id: &Identity) -> bool {
        self.source == *id || (!self.directed && self.target == *id)
    }
}

impl_element!(Edge);

// =============================================================================
// VERTEX
// =============================================================================

/// A vertex with its full adjacent-edge list.
///
/// In- and out-edges are derived views over `edges`, never stored separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Vertex identity.
    pub id: Identity,
    /// Optional label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attached properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    /// Every edge touching this vertex.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
}

impl Vertex {
    /// Create a bare vertex.
    #[must_use]
    pub fn new(id: impl Into<Identity>) -> Self {
        Self {
            id: id.into(),
            label: None,
            description: None,
            properties: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a property.
    #[must_use]
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Append an edge.
    #[must_use]
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Edges pointing into this vertex.
    pub fn in_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(|e| e.is_in_edge_of(&self.id))
    }

    /// Edges pointing out of this vertex.
    pub fn out_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(|e| e.is_out_edge_of(&self.id))
    }

    /// Number of adjacent edges.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    /// A copy of this vertex without edges.
    #[must_use]
    pub fn bare(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            properties: self.properties.clone(),
            edges: Vec::new(),
        }
    }
}

impl_element!(Vertex);

// =============================================================================
// GRAPH INFO & ATTRIBUTES
// =============================================================================

/// Element data of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphInfo {
    /// Graph identity.
    pub id: Identity,
    /// Optional label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attached properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

impl GraphInfo {
    /// Create graph element data with just an identity.
    #[must_use]
    pub fn new(id: impl Into<Identity>) -> Self {
        Self {
            id: id.into(),
            label: None,
            description: None,
            properties: Vec::new(),
        }
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl_element!(GraphInfo);

/// Structural flags of a graph.
///
/// `finite == false` means full enumeration must never be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphAttributes {
    /// Edges have a direction.
    pub directed: bool,
    /// Vertices are discovered on demand rather than pre-materialized.
    pub dynamic: bool,
    /// The vertex set is countable and fully enumerable.
    pub finite: bool,
}

impl GraphAttributes {
    /// Flags of a materialized in-memory graph.
    #[must_use]
    pub const fn materialized(directed: bool) -> Self {
        Self {
            directed,
            dynamic: false,
            finite: true,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
