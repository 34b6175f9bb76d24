//! # Property
//!
//! Named, recursive metadata attached to any graph element.

use crate::types::Value;
use serde::{Deserialize, Serialize};

/// A named property with a typed leaf value and ordered sub-properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Property {
    /// Property name.
    pub id: String,
    /// Leaf payload.
    #[serde(default)]
    pub value: Value,
    /// Nested properties, in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subproperties: Vec<Property>,
}

impl Property {
    /// Create a leaf property.
    #[must_use]
    pub fn new(id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            subproperties: Vec::new(),
        }
    }

    /// Append a sub-property.
    #[must_use]
    pub fn with_subproperty(mut self, property: Property) -> Self {
        self.subproperties.push(property);
        self
    }

    /// Look up a nested sub-property by name path.
    ///
    /// An empty path returns `self`. The first match at each level wins.
    #[must_use]
    pub fn find(&self, path: &[&str]) -> Option<&Property> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };
        self.subproperties
            .iter()
            .find(|sub| sub.id == *head)
            .and_then(|sub| sub.find(rest))
    }
}

/// Find a property by name in a slice, first match wins.
#[must_use]
pub fn find_property<'a>(properties: &'a [Property], name: &str) -> Option<&'a Property> {
    properties.iter().find(|p| p.id == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_lookup_by_path() {
        let property = Property::new("address", Value::Null).with_subproperty(
            Property::new("city", "Lyon").with_subproperty(Property::new("zip", 69000)),
        );

        assert_eq!(property.find(&[]).map(|p| p.id.as_str()), Some("address"));
        assert_eq!(
            property.find(&["city", "zip"]).map(|p| &p.value),
            Some(&Value::Int(69000))
        );
        assert!(property.find(&["street"]).is_none());
    }

    #[test]
    fn leaf_property_omits_empty_subproperties() {
        let json = serde_json::to_string(&Property::new("name", "foo")).expect("serialize");
        assert_eq!(json, r#"{"id":"name","value":"foo"}"#);
        let back: Property = serde_json::from_str(r#"{"id":"n"}"#).expect("deserialize");
        assert!(back.value.is_null());
    }

    #[test]
    fn find_property_first_match() {
        let props = vec![Property::new("a", 1), Property::new("a", 2)];
        assert_eq!(find_property(&props, "a").map(|p| &p.value), Some(&Value::Int(1)));
        assert!(find_property(&props, "b").is_none());
    }
}
