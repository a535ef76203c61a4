//! Layout algorithms for the family diagram.
//!
//! This module computes target positions for persons and marriages. The
//! drawing layer reads the resulting coordinate maps and never lays anything
//! out itself.

pub mod coordinates;
pub mod generations;

pub use coordinates::{
    FamilyLayout, GenerationLayout, LayoutConfig, LayoutRoot, Point, compute_layout,
};
pub use generations::{Generations, compute_generations};
