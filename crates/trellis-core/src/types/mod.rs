//! # Core Type Definitions
//!
//! Shared leaf types for the Trellis engine:
//! - Leaf property payloads (`Value`)
//! - Traversal parameters (`TraversalOrder`, `Direction`)
//! - Capability names used in diagnostics (`Capability`)
//! - Error types (`GraphError`)

use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// VALUE
// =============================================================================

/// The typed payload stored at the leaf of a property.
///
/// Serialized untagged so that configuration and graph files can use plain
/// scalars (`3`, `"foo"`, `true`) and arrays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    String(String),
    /// An ordered list of values.
    List(Vec<Value>),
}

impl Value {
    /// Numeric view of this value, if it is an integer or a float.
    ///
    /// Strings are not parsed here; coercion is an explicit actor step.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// String view of this value, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s}"),
            Self::List(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// =============================================================================
// TRAVERSAL PARAMETERS
// =============================================================================

/// Emission order of a hierarchical traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalOrder {
    /// Emit a vertex before expanding it.
    #[default]
    Preorder,
    /// Emit a vertex after all of its neighbours have been expanded.
    Postorder,
}

/// Which adjacency a hierarchical traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow out-edges (children).
    #[default]
    Descendants,
    /// Follow in-edges (parents).
    Ancestors,
}

impl Direction {
    /// The opposite direction, used for upward membership checks.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Descendants => Self::Ancestors,
            Self::Ancestors => Self::Descendants,
        }
    }
}

// =============================================================================
// CAPABILITY NAMES
// =============================================================================

/// Names of the independently implementable graph access patterns.
///
/// Only used to describe missing capabilities in errors and logs; the
/// capabilities themselves are traits in [`crate::graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Enumerate every vertex.
    Entire,
    /// Look up a vertex by identity.
    Dynamic,
    /// Stream parents of a vertex.
    DynamicIn,
    /// Stream children of a vertex.
    DynamicOut,
    /// Stream root identities.
    Rooted,
}

impl Capability {
    /// Every capability, in display order.
    pub const ALL: [Self; 5] = [
        Self::Entire,
        Self::Dynamic,
        Self::DynamicIn,
        Self::DynamicOut,
        Self::Rooted,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entire => "entire",
            Self::Dynamic => "dynamic",
            Self::DynamicIn => "dynamic-in",
            Self::DynamicOut => "dynamic-out",
            Self::Rooted => "rooted",
        };
        f.pad(name)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Trellis engine.
///
/// - Capability absence is not an error: accessors return `None`
/// - Cycles are not an error: traversals terminate through visited sets
/// - Use `Result<T, GraphError>` for fallible operations
#[derive(Debug, Error)]
pub enum GraphError {
    /// An operation needs a capability that the underlying graph lacks.
    #[error("{operation} requires the {capability} capability, which the underlying graph does not provide")]
    NotSupported {
        /// The operation that was attempted.
        operation: &'static str,
        /// The capability it needs.
        capability: Capability,
    },

    /// A constructor or parameter received malformed input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A vertex that had to exist was not found.
    #[error("Vertex not found: {0}")]
    VertexNotFound(Identity),

    /// A value could not be converted to the requested type.
    #[error("Coercion failed: {0}")]
    Coercion(String),

    /// A remote or generated graph provider failed.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl GraphError {
    /// Shorthand for a `NotSupported` error.
    #[must_use]
    pub const fn not_supported(operation: &'static str, capability: Capability) -> Self {
        Self::NotSupported {
            operation,
            capability,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_numeric_view() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::from("3").as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn value_untagged_json() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 4, 1.5, "x", [1, "y"]]"#)
            .expect("deserialize");
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(4),
                Value::Float(1.5),
                Value::from("x"),
                Value::List(vec![Value::Int(1), Value::from("y")]),
            ]
        );
    }

    #[test]
    fn value_display_lists() {
        let value = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(value.to_string(), "[1, a]");
    }

    #[test]
    fn direction_inverse() {
        assert_eq!(Direction::Descendants.inverse(), Direction::Ancestors);
        assert_eq!(Direction::Ancestors.inverse(), Direction::Descendants);
    }

    #[test]
    fn not_supported_message_names_capability() {
        let err = GraphError::not_supported("FilterGraph::get_vertices", Capability::Entire);
        assert!(err.to_string().contains("entire"));
    }
}
