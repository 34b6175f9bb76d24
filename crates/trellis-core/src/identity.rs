//! # Identity
//!
//! Representation-independent element keys.
//!
//! An [`Identity`] wraps a string, an integer or a [`CompoundIdentifier`].
//! Equality, ordering and hashing all go through a canonical key, so two
//! identities built from equal underlying values are the same identity no
//! matter how they were constructed: `Identity::from("42")` equals
//! `Identity::from(42)`. Only the canonical spelling counts: `"042"` stays a
//! string.
//!
//! Canonical ordering: integers < strings < compounds.

use crate::types::GraphError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// =============================================================================
// IDENTITY
// =============================================================================

/// An opaque, comparable and hashable element key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Repr);

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Repr {
    Int(i64),
    Str(String),
    Compound(Box<CompoundIdentifier>),
}

/// Canonical comparison key. Strings in canonical integer spelling collapse onto it.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Key<'a> {
    Int(i64),
    Str(&'a str),
    Compound(&'a CompoundIdentifier),
}

impl Identity {
    /// Create an identity from any supported underlying value.
    #[must_use]
    pub fn new(value: impl Into<Self>) -> Self {
        value.into()
    }

    fn key(&self) -> Key<'_> {
        match &self.0 {
            Repr::Int(n) => Key::Int(*n),
            Repr::Str(s) => s
                .parse::<i64>()
                .ok()
                .filter(|n| n.to_string() == *s)
                .map_or(Key::Str(s), Key::Int),
            Repr::Compound(c) => Key::Compound(c),
        }
    }

    /// Integer view of this identity, parsing canonical string spellings.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self.key() {
            Key::Int(n) => Some(n),
            _ => None,
        }
    }

    /// The compound parts of this identity, if it is compound.
    #[must_use]
    pub fn as_compound(&self) -> Option<&CompoundIdentifier> {
        match &self.0 {
            Repr::Compound(c) => Some(c),
            _ => None,
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Identity {}

impl PartialOrd for Identity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Int(n) => write!(f, "{n}"),
            Repr::Str(s) => f.write_str(s),
            Repr::Compound(c) => write!(f, "{c}"),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({self})")
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(Repr::Str(s.to_string()))
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(Repr::Str(s))
    }
}

impl From<&String> for Identity {
    fn from(s: &String) -> Self {
        Self(Repr::Str(s.clone()))
    }
}

impl From<i64> for Identity {
    fn from(n: i64) -> Self {
        Self(Repr::Int(n))
    }
}

impl From<i32> for Identity {
    fn from(n: i32) -> Self {
        Self(Repr::Int(i64::from(n)))
    }
}

impl From<usize> for Identity {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or_else(|_| Self(Repr::Str(n.to_string())), |n| Self(Repr::Int(n)))
    }
}

impl From<u64> for Identity {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or_else(|_| Self(Repr::Str(n.to_string())), |n| Self(Repr::Int(n)))
    }
}

impl From<CompoundIdentifier> for Identity {
    fn from(c: CompoundIdentifier) -> Self {
        Self(Repr::Compound(Box::new(c)))
    }
}

impl From<&Identity> for Identity {
    fn from(id: &Identity) -> Self {
        id.clone()
    }
}

// =============================================================================
// COMPOUND IDENTIFIER
// =============================================================================

/// An identifier made of a parent identity and an auxiliary identity.
///
/// Compares by `parent` first and `aux` second.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompoundIdentifier {
    /// The parent part, compared first.
    pub parent: Identity,
    /// The auxiliary part, compared second.
    pub aux: Identity,
}

impl CompoundIdentifier {
    /// Create a compound identifier from both parts.
    #[must_use]
    pub fn new(parent: impl Into<Identity>, aux: impl Into<Identity>) -> Self {
        Self {
            parent: parent.into(),
            aux: aux.into(),
        }
    }

    /// Create a compound identifier from parts that may be absent.
    ///
    /// Fails with `InvalidArgument` if either part is missing.
    pub fn try_new(parent: Option<Identity>, aux: Option<Identity>) -> Result<Self, GraphError> {
        let parent = parent.ok_or_else(|| {
            GraphError::InvalidArgument("compound identifier requires a parent".to_string())
        })?;
        let aux = aux.ok_or_else(|| {
            GraphError::InvalidArgument(
                "compound identifier requires an auxiliary identifier".to_string(),
            )
        })?;
        Ok(Self { parent, aux })
    }
}

impl fmt::Display for CompoundIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.parent, self.aux)
    }
}

// =============================================================================
// TESTS
// =============================================================================
