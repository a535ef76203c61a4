//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based index so the drawing layer can map a
//! pointer position back to the person drawn there.

mod rtree;

pub use rtree::{PersonIndex, PersonPoint};
