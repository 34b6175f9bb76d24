//! # Wrapper Graphs
//!
//! Decorator base for transformations.
//!
//! A wrapper holds exactly one wrapped graph and is itself a [`Graph`]. Its
//! structural flags and every capability accessor forward to the wrapped
//! graph unless overridden. An override may:
//! - answer with `Some(self)` (the wrapper implements the capability itself)
//! - synthesize the capability from a different wrapped capability
//! - veto it by returning `None`, when the transformation invalidates its
//!   meaning (root discovery after edge reversal, for instance)

use crate::element::{GraphAttributes, GraphInfo};
use crate::graph::{DynamicGraph, DynamicInGraph, DynamicOutGraph, EntireGraph, Graph, RootedGraph};

/// A graph that decorates another graph.
///
/// Implementors get [`Graph`] through a blanket impl; override the
/// `provide_*` methods to change what is forwarded.
pub trait WrapperGraph: Send + Sync {
    /// The decorated graph.
    fn wrapped(&self) -> &dyn Graph;

    /// Element data. Forwards by default.
    fn provide_info(&self) -> &GraphInfo {
        self.wrapped().info()
    }

    /// Structural flags. Forwards by default.
    fn provide_attributes(&self) -> GraphAttributes {
        self.wrapped().attributes()
    }

    /// Lookup capability. Forwards by default.
    fn provide_dynamic(&self) -> Option<&dyn DynamicGraph> {
        self.wrapped().as_dynamic()
    }

    /// Parent-streaming capability. Forwards by default.
    fn provide_dynamic_in(&self) -> Option<&dyn DynamicInGraph> {
        self.wrapped().as_dynamic_in()
    }

    /// Child-streaming capability. Forwards by default.
    fn provide_dynamic_out(&self) -> Option<&dyn DynamicOutGraph> {
        self.wrapped().as_dynamic_out()
    }

    /// Enumeration capability. Forwards by default.
    fn provide_entire(&self) -> Option<&dyn EntireGraph> {
        self.wrapped().as_entire()
    }

    /// Root-discovery capability. Forwards by default.
    fn provide_rooted(&self) -> Option<&dyn RootedGraph> {
        self.wrapped().as_rooted()
    }
}

impl<W: WrapperGraph> Graph for W {
    fn info(&self) -> &GraphInfo {
        self.provide_info()
    }

    fn attributes(&self) -> GraphAttributes {
        self.provide_attributes()
    }

    fn as_dynamic(&self) -> Option<&dyn DynamicGraph> {
        self.provide_dynamic()
    }

    fn as_dynamic_in(&self) -> Option<&dyn DynamicInGraph> {
        self.provide_dynamic_in()
    }

    fn as_dynamic_out(&self) -> Option<&dyn DynamicOutGraph> {
        self.provide_dynamic_out()
    }

    fn as_entire(&self) -> Option<&dyn EntireGraph> {
        self.provide_entire()
    }

    fn as_rooted(&self) -> Option<&dyn RootedGraph> {
        self.provide_rooted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite::FiniteGraph;
    use crate::graph::SharedGraph;
    use crate::types::Capability;
    use std::sync::Arc;

    struct Passthrough(SharedGraph);

    impl WrapperGraph for Passthrough {
        fn wrapped(&self) -> &dyn Graph {
            &*self.0
        }
    }

    struct NoRoots(SharedGraph);

    impl WrapperGraph for NoRoots {
        fn wrapped(&self) -> &dyn Graph {
            &*self.0
        }

        fn provide_rooted(&self) -> Option<&dyn RootedGraph> {
            None
        }
    }

    #[test]
    fn default_wrapper_forwards_everything() {
        let source: SharedGraph = Arc::new(FiniteGraph::directed("src"));
        let wrapper = Passthrough(Arc::clone(&source));
        assert_eq!(
            wrapper.capabilities().available(),
            source.capabilities().available()
        );
        assert_eq!(wrapper.info().id, source.info().id);
        assert_eq!(wrapper.attributes(), source.attributes());
    }

    #[test]
    fn override_vetoes_single_capability() {
        let source: SharedGraph = Arc::new(FiniteGraph::directed("src"));
        let wrapper = NoRoots(Arc::clone(&source));
        let caps = wrapper.capabilities();
        assert!(!caps.supports(Capability::Rooted));
        assert!(caps.supports(Capability::Entire));

        // Vetoes compose through further wrapping.
        let outer = Passthrough(Arc::new(wrapper));
        assert!(!outer.capabilities().supports(Capability::Rooted));
    }
}
