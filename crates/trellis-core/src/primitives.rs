//! # Engine Primitives
//!
//! Fixed runtime constants for the Trellis engine.
//!
//! These are compiled into the binary and immutable at runtime.

// =============================================================================
// TRAVERSAL
// =============================================================================

/// Maximum number of scoped worker threads used to fetch one breadth-first
/// frontier level.
///
/// A level narrower than this spawns one worker per vertex.
pub const FRONTIER_WORKERS: usize = 8;

// =============================================================================
// SYNTHETIC GRAPHS
// =============================================================================

/// Default maximum number of children of a generated vertex.
pub const DEFAULT_CHILD_COUNT: usize = 3;

/// Default number of property names in a generated property schema.
pub const DEFAULT_PROPERTY_COUNT: usize = 4;

/// Default chance, in percent, that a generated vertex carries a given
/// schema property.
pub const DEFAULT_PROPERTY_INCLUSION: u8 = 50;

/// Largest integer a generated integer property can take. The smallest is 1.
pub const MAX_GENERATED_INT: i64 = 10;

/// Syllable bounds of generated pseudowords (labels, property names, values).
pub const PSEUDOWORD_SYLLABLES: std::ops::RangeInclusive<usize> = 2..=4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontier_has_workers() {
        assert!(FRONTIER_WORKERS >= 1);
    }

    #[test]
    fn inclusion_is_a_percentage() {
        assert!(DEFAULT_PROPERTY_INCLUSION <= 100);
    }

    #[test]
    fn pseudowords_are_never_empty() {
        assert!(*PSEUDOWORD_SYLLABLES.start() >= 1);
    }
}
