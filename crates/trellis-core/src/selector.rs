//! # Selectors
//!
//! Composable predicates over vertices, edges, properties and leaf values.
//!
//! A `Selector` is a closed set of built-in variants. It deserializes from a
//! tagged table (`type = "vertexName"`, `type = "and"`, ...), so pipeline
//! configuration maps straight onto it.
//!
//! Empty `And` and `Or` both select everything.

use crate::element::{Edge, Element, Vertex};
use crate::graph::{Graph, VertexStream, failed_stream};
use crate::identity::Identity;
use crate::property::Property;
use crate::traversal::{HierarchyWalk, Neighbours, contains_within};
use crate::types::{Direction, GraphError, TraversalOrder, Value};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

// =============================================================================
// PATTERN
// =============================================================================

/// A compiled regular expression that (de)serializes as its source string.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern. Fails with `InvalidArgument` on bad syntax.
    pub fn new(pattern: &str) -> Result<Self, GraphError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| GraphError::InvalidArgument(format!("invalid pattern {pattern:?}: {e}")))
    }

    /// Whether the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    /// The compiled expression.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.0
    }

    /// Source text of the pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// SELECTOR
// =============================================================================

/// Parameters of a structural (descendant or ancestor) selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchySelection {
    /// Start vertices.
    pub ids: Vec<Identity>,
    /// Whether the start vertices are selected themselves.
    #[serde(default = "include_roots_default")]
    pub include_roots: bool,
    /// Maximum hops from a start vertex. `None` is unbounded.
    #[serde(default)]
    pub depth: Option<usize>,
    /// Emission order when selecting.
    #[serde(default)]
    pub traversal: TraversalOrder,
}

const fn include_roots_default() -> bool {
    true
}

impl HierarchySelection {
    /// Unbounded selection from `ids`, starts included, preorder.
    #[must_use]
    pub fn new(ids: Vec<Identity>) -> Self {
        Self {
            ids,
            include_roots: true,
            depth: None,
            traversal: TraversalOrder::Preorder,
        }
    }
}

/// A predicate determining inclusion of graph elements and values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Selector {
    /// Everything.
    All,
    /// Nothing.
    None,
    /// Vertices whose identity is listed.
    Include {
        /// Selected identities.
        ids: Vec<Identity>,
    },
    /// Vertices whose identity is not listed.
    Exclude {
        /// Rejected identities.
        ids: Vec<Identity>,
    },
    /// Vertices whose label matches.
    VertexName {
        /// Label pattern.
        pattern: Pattern,
    },
    /// Properties whose name matches, and vertices carrying one.
    PropertyName {
        /// Property name pattern.
        pattern: Pattern,
    },
    /// Numeric values of one property within inclusive bounds.
    PropertyRange {
        /// Property name.
        property: String,
        /// Lower bound, if any.
        #[serde(default)]
        minimum: Option<f64>,
        /// Upper bound, if any.
        #[serde(default)]
        maximum: Option<f64>,
    },
    /// Vertices with exactly the given in- and/or out-degree.
    Degree {
        /// Required in-degree.
        #[serde(default)]
        in_degree: Option<usize>,
        /// Required out-degree.
        #[serde(default)]
        out_degree: Option<usize>,
    },
    /// Intersection. Empty selects everything.
    And {
        /// Operands.
        #[serde(default)]
        selectors: Vec<Selector>,
    },
    /// Union. Empty selects everything.
    Or {
        /// Operands.
        #[serde(default)]
        selectors: Vec<Selector>,
    },
    /// Descendants of the start vertices.
    Descendants(HierarchySelection),
    /// Ancestors of the start vertices.
    Ancestors(HierarchySelection),
}

impl Selector {
    /// Vertices without in-edges.
    #[must_use]
    pub const fn roots() -> Self {
        Self::Degree {
            in_degree: Some(0),
            out_degree: None,
        }
    }

    /// Direct children of `ids`, excluding `ids` themselves.
    #[must_use]
    pub fn children(ids: Vec<Identity>) -> Self {
        Self::Descendants(HierarchySelection {
            include_roots: false,
            depth: Some(1),
            ..HierarchySelection::new(ids)
        })
    }

    /// Label pattern selector.
    pub fn vertex_name(pattern: &str) -> Result<Self, GraphError> {
        Ok(Self::VertexName {
            pattern: Pattern::new(pattern)?,
        })
    }

    /// Property name pattern selector.
    pub fn property_name(pattern: &str) -> Result<Self, GraphError> {
        Ok(Self::PropertyName {
            pattern: Pattern::new(pattern)?,
        })
    }

    // -------------------------------------------------------------------------
    // Membership
    // -------------------------------------------------------------------------

    /// Whether `vertex` is selected. Structural variants consult `graph`.
    pub fn contains_vertex(&self, graph: &dyn Graph, vertex: &Vertex) -> Result<bool, GraphError> {
        match self {
            Self::All => Ok(true),
            Self::None => Ok(false),
            Self::Include { ids } => Ok(ids.contains(&vertex.id)),
            Self::Exclude { ids } => Ok(!ids.contains(&vertex.id)),
            Self::VertexName { pattern } => {
                Ok(vertex.label().is_some_and(|label| pattern.is_match(label)))
            }
            Self::PropertyName { pattern } => Ok(vertex
                .properties
                .iter()
                .any(|p| pattern.is_match(&p.id))),
            Self::PropertyRange { property, .. } => Ok(vertex
                .property(property)
                .is_some_and(|p| self.contains_value(&p.value))),
            Self::Degree {
                in_degree,
                out_degree,
            } => Ok(in_degree.is_none_or(|d| vertex.in_edges().count() == d)
                && out_degree.is_none_or(|d| vertex.out_edges().count() == d)),
            Self::And { selectors } => {
                for selector in selectors {
                    if !selector.contains_vertex(graph, vertex)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or { selectors } => {
                if selectors.is_empty() {
                    return Ok(true);
                }
                for selector in selectors {
                    if selector.contains_vertex(graph, vertex)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Descendants(selection) => {
                Self::contains_structural(graph, Direction::Descendants, selection, &vertex.id)
            }
            Self::Ancestors(selection) => {
                Self::contains_structural(graph, Direction::Ancestors, selection, &vertex.id)
            }
        }
    }

    fn contains_structural(
        graph: &dyn Graph,
        direction: Direction,
        selection: &HierarchySelection,
        id: &Identity,
    ) -> Result<bool, GraphError> {
        for root in &selection.ids {
            if contains_within(
                graph,
                direction,
                root,
                id,
                selection.include_roots,
                selection.depth,
            )? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether `edge` is selected for transformation.
    #[must_use]
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        match self {
            Self::None => false,
            Self::And { selectors } => selectors.iter().all(|s| s.contains_edge(edge)),
            Self::Or { selectors } => {
                selectors.is_empty() || selectors.iter().any(|s| s.contains_edge(edge))
            }
            _ => true,
        }
    }

    /// Whether `property` is selected for transformation.
    #[must_use]
    pub fn contains_property(&self, property: &Property) -> bool {
        match self {
            Self::None => false,
            Self::PropertyName { pattern } => pattern.is_match(&property.id),
            Self::PropertyRange { property: name, .. } => property.id == *name,
            Self::And { selectors } => selectors.iter().all(|s| s.contains_property(property)),
            Self::Or { selectors } => {
                selectors.is_empty() || selectors.iter().any(|s| s.contains_property(property))
            }
            _ => true,
        }
    }

    /// Whether a leaf `value` is selected for transformation.
    #[must_use]
    pub fn contains_value(&self, value: &Value) -> bool {
        match self {
            Self::None => false,
            Self::PropertyRange {
                minimum, maximum, ..
            } => match value {
                Value::List(values) => values.iter().any(|v| self.contains_value(v)),
                other => other.as_f64().is_some_and(|x| {
                    minimum.is_none_or(|min| x >= min) && maximum.is_none_or(|max| x <= max)
                }),
            },
            Self::And { selectors } => selectors.iter().all(|s| s.contains_value(value)),
            Self::Or { selectors } => {
                selectors.is_empty() || selectors.iter().any(|s| s.contains_value(value))
            }
            _ => true,
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Lazily stream the selected vertices of `graph`.
    ///
    /// Identity and structural selectors use lookups and walks when the graph
    /// provides them; everything else filters full enumeration.
    pub fn select_vertices<'g>(&'g self, graph: &'g dyn Graph) -> VertexStream<'g> {
        match self {
            Self::Include { ids } => match graph.as_dynamic() {
                Some(dynamic) => dynamic.get_vertices_by_id(ids),
                None => self.filter_enumeration(graph),
            },
            Self::Degree {
                in_degree: Some(0),
                out_degree: None,
            } => match (graph.as_rooted(), graph.as_dynamic()) {
                // Reported roots are candidates only; a view's roots may have in-edges.
                (Some(rooted), Some(dynamic)) => Box::new(rooted.roots().filter_map(move |id| {
                    id.and_then(|id| match dynamic.get_vertex(&id)? {
                        Some(vertex) if self.contains_vertex(graph, &vertex)? => Ok(Some(vertex)),
                        _ => Ok(None),
                    })
                    .transpose()
                })),
                _ => self.filter_enumeration(graph),
            },
            Self::And { selectors } => match selectors.split_first() {
                None => self.filter_enumeration(graph),
                Some((first, rest)) => Box::new(first.select_vertices(graph).filter_map(
                    move |result| {
                        let keep = result.and_then(|vertex| {
                            for selector in rest {
                                if !selector.contains_vertex(graph, &vertex)? {
                                    return Ok(None);
                                }
                            }
                            Ok(Some(vertex))
                        });
                        keep.transpose()
                    },
                )),
            },
            Self::Or { selectors } if !selectors.is_empty() => {
                let mut seen = BTreeSet::new();
                Box::new(
                    selectors
                        .iter()
                        .flat_map(move |selector| selector.select_vertices(graph))
                        .filter(move |result| match result {
                            Ok(vertex) => seen.insert(vertex.id.clone()),
                            Err(_) => true,
                        }),
                )
            }
            Self::Descendants(selection) => {
                self.select_structural(graph, Direction::Descendants, selection)
            }
            Self::Ancestors(selection) => {
                self.select_structural(graph, Direction::Ancestors, selection)
            }
            _ => self.filter_enumeration(graph),
        }
    }

    fn select_structural<'g>(
        &'g self,
        graph: &'g dyn Graph,
        direction: Direction,
        selection: &'g HierarchySelection,
    ) -> VertexStream<'g> {
        let Some(neighbours) = Neighbours::resolve(graph, direction) else {
            debug!(?direction, "walk adjacency missing: selecting by enumeration");
            return self.filter_enumeration(graph);
        };
        let mut seen = BTreeSet::new();
        Box::new(
            selection
                .ids
                .iter()
                .flat_map(move |root| {
                    HierarchyWalk::over(
                        neighbours,
                        root.clone(),
                        selection.include_roots,
                        selection.depth,
                        selection.traversal,
                    )
                })
                .filter(move |result| match result {
                    Ok(vertex) => seen.insert(vertex.id.clone()),
                    Err(_) => true,
                }),
        )
    }

    fn filter_enumeration<'g>(&'g self, graph: &'g dyn Graph) -> VertexStream<'g> {
        let entire = match graph.require_entire("Selector::select_vertices") {
            Ok(entire) => entire,
            Err(e) => return failed_stream(e),
        };
        Box::new(entire.get_vertices().filter_map(move |result| {
            result
                .and_then(|vertex| {
                    self.contains_vertex(graph, &vertex)
                        .map(|keep| keep.then_some(vertex))
                })
                .transpose()
        }))
    }
}

// =============================================================================
// TESTS
// =============================================================================
