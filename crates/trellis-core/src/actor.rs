//! # Actors
//!
//! Selector-gated transformations applied while vertices are pulled.
//!
//! An `Actor` wraps a graph, a `Selector` and an `Action`. Every vertex it
//! produces is rebuilt: when the selector contains the vertex, the action is
//! applied at vertex granularity first, then to each selected edge, property
//! and leaf value. Sub-properties and list values are rebuilt recursively.
//! Edges are re-derived the way `FiniteGraph` derives them: in-edges first,
//! then out-edges, deduplicated by edge id.
//!
//! Coercion failures are swallowed. The offending value passes through
//! unchanged and a `debug!` event is emitted.

use crate::element::{Edge, Vertex};
use crate::graph::{
    DynamicGraph, DynamicInGraph, DynamicOutGraph, EntireGraph, Graph, SharedGraph, VertexStream,
    failed_stream,
};
use crate::identity::Identity;
use crate::property::Property;
use crate::selector::{Pattern, Selector};
use crate::traversal::{Neighbours, frontier_collect};
use crate::types::{Capability, Direction, GraphError, Value};
use crate::wrapper::WrapperGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace};

// =============================================================================
// ACTION
// =============================================================================

/// The transformation an actor applies to the elements it selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    /// Replace every match of `pattern` in string values.
    ///
    /// `replacement` may reference capture groups as `$1` or `${name}`.
    StringReplace {
        /// Expression to search for.
        pattern: Pattern,
        /// Substitution text.
        #[serde(default)]
        replacement: String,
    },
    /// Parse string values as integers, falling back to floats.
    StringToNumber,
    /// Collect the property values of all descendants onto the vertex.
    Aggregate {
        /// Maximum hops. `None` is unbounded.
        #[serde(default)]
        depth: Option<usize>,
    },
    /// Collect the property values of all ancestors onto the vertex.
    Propagate {
        /// Maximum hops. `None` is unbounded.
        #[serde(default)]
        depth: Option<usize>,
    },
}

impl Action {
    /// Transform a single leaf value.
    ///
    /// Values the action does not apply to pass through unchanged.
    pub fn transform_value(&self, value: &Value) -> Result<Value, GraphError> {
        match (self, value) {
            (
                Self::StringReplace {
                    pattern,
                    replacement,
                },
                Value::String(text),
            ) => Ok(Value::String(
                pattern
                    .regex()
                    .replace_all(text, replacement.as_str())
                    .into_owned(),
            )),
            (Self::StringToNumber, Value::String(text)) => {
                let text = text.trim();
                if let Ok(n) = text.parse::<i64>() {
                    return Ok(Value::Int(n));
                }
                text.parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| GraphError::Coercion(format!("{text:?} is not a number")))
            }
            _ => Ok(value.clone()),
        }
    }

    /// Transform a whole vertex. Only the structural actions act here.
    ///
    /// The structural actions need the adjacency of `graph` in their
    /// direction. Without it the vertex passes through unchanged.
    pub fn transform_vertex(&self, graph: &dyn Graph, vertex: Vertex) -> Result<Vertex, GraphError> {
        let (direction, depth, flatten) = match self {
            Self::Aggregate { depth } => (Direction::Descendants, *depth, false),
            Self::Propagate { depth } => (Direction::Ancestors, *depth, true),
            _ => return Ok(vertex),
        };
        let Some(neighbours) = Neighbours::resolve(graph, direction) else {
            debug!(id = %vertex.id, ?direction, "collection adjacency missing: vertex unchanged");
            return Ok(vertex);
        };

        let reached = frontier_collect(neighbours, &vertex.id, depth)?;
        trace!(id = %vertex.id, reached = reached.len(), "collected properties");

        let mut collected: Vec<(String, Vec<Value>)> = Vec::new();
        for property in vertex.properties.iter().chain(reached.iter().flat_map(|v| &v.properties)) {
            let slot = match collected.iter().position(|(name, _)| *name == property.id) {
                Some(index) => &mut collected[index].1,
                None => {
                    collected.push((property.id.clone(), Vec::new()));
                    let last = collected.len().saturating_sub(1);
                    &mut collected[last].1
                }
            };
            match &property.value {
                Value::List(values) if flatten => slot.extend(values.iter().cloned()),
                value => slot.push(value.clone()),
            }
        }

        Ok(Vertex {
            properties: collected
                .into_iter()
                .map(|(name, values)| Property::new(name, Value::List(values)))
                .collect(),
            ..vertex
        })
    }
}

// =============================================================================
// ACTOR
// =============================================================================

/// A graph whose selected vertices are rebuilt through an `Action`.
pub struct Actor {
    inner: SharedGraph,
    selector: Selector,
    action: Action,
}

impl Actor {
    /// Apply `action` to the elements of `inner` that `selector` contains.
    #[must_use]
    pub fn new(inner: SharedGraph, selector: Selector, action: Action) -> Self {
        Self {
            inner,
            selector,
            action,
        }
    }

    /// The selector gating this actor.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The action this actor applies.
    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    fn reconstruct_value(&self, value: Value) -> Value {
        if let Value::List(values) = value {
            return Value::List(
                values
                    .into_iter()
                    .map(|v| self.reconstruct_value(v))
                    .collect(),
            );
        }
        if !self.selector.contains_value(&value) {
            return value;
        }
        match self.action.transform_value(&value) {
            Ok(transformed) => transformed,
            Err(e) => {
                debug!(error = %e, "value passed through");
                value
            }
        }
    }

    fn reconstruct_property(&self, property: Property) -> Property {
        let selected = self.selector.contains_property(&property);
        let Property {
            id,
            value,
            subproperties,
        } = property;
        Property {
            id,
            value: if selected {
                self.reconstruct_value(value)
            } else {
                value
            },
            subproperties: subproperties
                .into_iter()
                .map(|p| self.reconstruct_property(p))
                .collect(),
        }
    }

    fn reconstruct_edge(&self, edge: Edge) -> Edge {
        if !self.selector.contains_edge(&edge) {
            return edge;
        }
        Edge {
            properties: edge
                .properties
                .into_iter()
                .map(|p| self.reconstruct_property(p))
                .collect(),
            ..edge
        }
    }

    fn reconstruct_vertex(&self, vertex: Vertex) -> Result<Vertex, GraphError> {
        if !self.selector.contains_vertex(&*self.inner, &vertex)? {
            return Ok(vertex);
        }
        let vertex = self.action.transform_vertex(&*self.inner, vertex)?;

        let mut seen = BTreeSet::new();
        let edges = vertex
            .in_edges()
            .chain(vertex.out_edges())
            .filter(|edge| seen.insert(edge.id.clone()))
            .cloned()
            .map(|edge| self.reconstruct_edge(edge))
            .collect();

        Ok(Vertex {
            properties: vertex
                .properties
                .into_iter()
                .map(|p| self.reconstruct_property(p))
                .collect(),
            edges,
            ..vertex
        })
    }

    fn reconstruct_stream<'a>(&'a self, stream: VertexStream<'a>) -> VertexStream<'a> {
        Box::new(stream.map(move |r| r.and_then(|v| self.reconstruct_vertex(v))))
    }
}

impl WrapperGraph for Actor {
    fn wrapped(&self) -> &dyn Graph {
        &*self.inner
    }

    fn provide_dynamic(&self) -> Option<&dyn DynamicGraph> {
        self.inner.as_dynamic().map(|_| self as &dyn DynamicGraph)
    }

    fn provide_dynamic_in(&self) -> Option<&dyn DynamicInGraph> {
        self.inner.as_dynamic_in().map(|_| self as &dyn DynamicInGraph)
    }

    fn provide_dynamic_out(&self) -> Option<&dyn DynamicOutGraph> {
        self.inner.as_dynamic_out().map(|_| self as &dyn DynamicOutGraph)
    }

    fn provide_entire(&self) -> Option<&dyn EntireGraph> {
        self.inner.as_entire().map(|_| self as &dyn EntireGraph)
    }
}

impl DynamicGraph for Actor {
    fn get_vertex(&self, id: &Identity) -> Result<Option<Vertex>, GraphError> {
        self.inner
            .require_dynamic("Actor::get_vertex")?
            .get_vertex(id)?
            .map(|v| self.reconstruct_vertex(v))
            .transpose()
    }
}

impl DynamicInGraph for Actor {
    fn get_parent_vertices<'a>(&'a self, id: &Identity) -> VertexStream<'a> {
        match self.inner.as_dynamic_in() {
            Some(graph) => self.reconstruct_stream(graph.get_parent_vertices(id)),
            None => failed_stream(GraphError::not_supported(
                "Actor::get_parent_vertices",
                Capability::DynamicIn,
            )),
        }
    }
}

impl DynamicOutGraph for Actor {
    fn get_child_vertices<'a>(&'a self, id: &Identity) -> VertexStream<'a> {
        match self.inner.as_dynamic_out() {
            Some(graph) => self.reconstruct_stream(graph.get_child_vertices(id)),
            None => failed_stream(GraphError::not_supported(
                "Actor::get_child_vertices",
                Capability::DynamicOut,
            )),
        }
    }
}

impl EntireGraph for Actor {
    fn get_vertices(&self) -> VertexStream<'_> {
        match self.inner.require_entire("Actor::get_vertices") {
            Ok(entire) => self.reconstruct_stream(entire.get_vertices()),
            Err(e) => failed_stream(e),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite::FiniteGraph;
    use std::sync::Arc;

    fn replace(pattern: &str, replacement: &str) -> Action {
        Action::StringReplace {
            pattern: Pattern::new(pattern).expect("pattern"),
            replacement: replacement.to_string(),
        }
    }

    fn single(vertex: Vertex) -> SharedGraph {
        let mut graph = FiniteGraph::directed("g");
        graph.add_vertex(vertex);
        Arc::new(graph)
    }

    fn first(actor: &Actor) -> Vertex {
        actor
            .get_vertices()
            .next()
            .expect("item")
            .expect("vertex")
    }

    #[test]
    fn replaces_digits_in_selected_values() {
        let source = single(Vertex::new("v").with_property(Property::new("name", "foo123")));
        let actor = Actor::new(source, Selector::All, replace("[0-9]+", ""));
        let vertex = first(&actor);
        assert_eq!(vertex.properties[0].value, Value::from("foo"));
    }

    #[test]
    fn replacement_uses_capture_groups() {
        let action = replace(r"(\w+)@(\w+)", "$2 at $1");
        let out = action
            .transform_value(&Value::from("me@home"))
            .expect("replace");
        assert_eq!(out, Value::from("home at me"));
    }

    #[test]
    fn unselected_vertices_pass_through() {
        let vertex = Vertex::new("v").with_property(Property::new("name", "foo123"));
        let source = single(vertex.clone());
        let actor = Actor::new(source, Selector::None, replace("[0-9]+", ""));
        assert_eq!(first(&actor), vertex);
    }

    #[test]
    fn coercion_failure_is_swallowed() {
        let source = single(
            Vertex::new("v")
                .with_property(Property::new("a", "42"))
                .with_property(Property::new("b", " 2.5 "))
                .with_property(Property::new("c", "n/a")),
        );
        let actor = Actor::new(source, Selector::All, Action::StringToNumber);
        let vertex = first(&actor);
        let values: Vec<&Value> = vertex.properties.iter().map(|p| &p.value).collect();
        assert_eq!(
            values,
            [&Value::Int(42), &Value::Float(2.5), &Value::from("n/a")]
        );
    }

    #[test]
    fn recurses_into_subproperties_and_lists() {
        let source = single(
            Vertex::new("v").with_property(
                Property::new("outer", Value::List(vec![Value::from("x1"), Value::from(7)]))
                    .with_subproperty(Property::new("inner", "y22")),
            ),
        );
        let actor = Actor::new(source, Selector::All, replace("[0-9]", ""));
        let vertex = first(&actor);
        let outer = &vertex.properties[0];
        assert_eq!(
            outer.value,
            Value::List(vec![Value::from("x"), Value::from(7)])
        );
        assert_eq!(outer.subproperties[0].value, Value::from("y"));
    }

    #[test]
    fn property_selector_limits_transformed_properties() {
        let source = single(
            Vertex::new("v")
                .with_property(Property::new("keep", "a1"))
                .with_property(Property::new("strip", "b2")),
        );
        let selector = Selector::property_name("^strip$").expect("pattern");
        let actor = Actor::new(source, selector, replace("[0-9]", ""));
        let vertex = first(&actor);
        assert_eq!(vertex.properties[0].value, Value::from("a1"));
        assert_eq!(vertex.properties[1].value, Value::from("b"));
    }

    fn tree() -> SharedGraph {
        let mut graph = FiniteGraph::directed("tree");
        graph.add_vertex(Vertex::new("r").with_property(Property::new("n", 1)));
        graph.add_vertex(Vertex::new("a").with_property(Property::new("n", 2)));
        graph.add_vertex(Vertex::new("b").with_property(Property::new("n", 3)));
        graph.add_vertex(Vertex::new("c").with_property(Property::new("n", 4)));
        graph.add_edge_range([Edge::new("r", "a"), Edge::new("r", "b"), Edge::new("a", "c")]);
        Arc::new(graph)
    }

    fn collected(vertex: &Vertex) -> BTreeSet<i64> {
        let Value::List(values) = &vertex.properties[0].value else {
            return BTreeSet::new();
        };
        values
            .iter()
            .filter_map(|v| match v {
                Value::Int(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn aggregate_collects_descendant_values() {
        let actor = Actor::new(
            tree(),
            Selector::Include { ids: vec!["r".into()] },
            Action::Aggregate { depth: None },
        );
        let root = actor.get_vertex(&"r".into()).expect("get").expect("r");
        assert_eq!(collected(&root), BTreeSet::from([1, 2, 3, 4]));
        // Edges survive reconstruction.
        assert_eq!(root.out_edges().count(), 2);

        let bounded = Actor::new(
            tree(),
            Selector::All,
            Action::Aggregate { depth: Some(1) },
        );
        let root = bounded.get_vertex(&"r".into()).expect("get").expect("r");
        assert_eq!(collected(&root), BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn propagate_collects_ancestor_values() {
        let actor = Actor::new(tree(), Selector::All, Action::Propagate { depth: None });
        let leaf = actor.get_vertex(&"c".into()).expect("get").expect("c");
        assert_eq!(collected(&leaf), BTreeSet::from([1, 2, 4]));
    }

    #[test]
    fn adjacency_is_remapped() {
        let actor = Actor::new(tree(), Selector::All, Action::Aggregate { depth: None });
        assert!(actor.capabilities().supports(Capability::DynamicOut));
        let children: Vec<Vertex> = actor
            .get_child_vertices(&"a".into())
            .map(|r| r.expect("child"))
            .collect();
        assert_eq!(children.len(), 1);
        assert_eq!(collected(&children[0]), BTreeSet::from([4]));
    }

    #[test]
    fn deserializes_tagged_actions() {
        let action: Action =
            serde_json::from_str(r##"{"type": "stringReplace", "pattern": "\\d", "replacement": "#"}"##)
                .expect("action");
        assert_eq!(action, replace(r"\d", "#"));
        let action: Action =
            serde_json::from_str(r#"{"type": "aggregate", "depth": 2}"#).expect("action");
        assert_eq!(action, Action::Aggregate { depth: Some(2) });
    }
}
