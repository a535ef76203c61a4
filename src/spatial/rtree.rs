//! R-tree based hit testing using the rstar crate.
//!
//! Provides O(log n) spatial queries over laid-out persons:
//! - Nearest person to a point, optionally within a radius
//! - Persons inside a rectangle (rubber-band selection)

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::layout::FamilyLayout;

/// A placed person in the spatial index.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonPoint {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

impl RTreeObject for PersonPoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for PersonPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over the persons of one layout.
#[derive(Default)]
pub struct PersonIndex {
    tree: RTree<PersonPoint>,
}

impl PersonIndex {
    /// Bulk load every placed person of `layout`.
    pub fn from_layout(layout: &FamilyLayout) -> Self {
        let points = layout
            .persons
            .iter()
            .map(|(id, point)| PersonPoint {
                id: id.clone(),
                x: point.x,
                y: point.y,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Find the nearest person to a point.
    pub fn nearest(&self, x: f32, y: f32) -> Option<&str> {
        self.tree
            .nearest_neighbor(&[x, y])
            .map(|point| point.id.as_str())
    }

    /// Find the nearest person within `max_distance` of a point.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<&str> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.id.as_str())
    }

    /// Find all persons within a rectangle.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&str> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
