//! Generation row layout.
//!
//! Turns generation numbers into 2D positions:
//!
//! 1. **Rows:** persons are grouped by generation. Ids are taken in
//!    generation order (stable over visit order) and each placed person pulls
//!    any same-generation spouse in right after them, keeping couples adjacent.
//! 2. **Columns:** each row is centered on x = 0 with a fixed spacing between
//!    centers. Row `g` sits at y = `g * vertical_spacing`, so ancestors
//!    (negative generations) are drawn above descendants.
//! 3. **Marriages:** a marriage sits at the midpoint of its two spouses, and
//!    only when both spouses were placed.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::generations::{Generations, generations_in};
use crate::graph::FamilyGraph;
use crate::tree::FamilyTree;

/// A position in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Arithmetic midpoint of `self` and `other`.
    #[inline]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Which person anchors generation 0.
///
/// The root never follows UI selection, so selecting a person does not
/// re-flow the diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum LayoutRoot {
    /// The first-inserted person of the snapshot.
    #[default]
    FirstPerson,
    /// A fixed person id. An id missing from the tree yields an empty layout.
    Person(String),
}

/// Configuration for the generation layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Distance between neighbouring person centers within a row.
    pub horizontal_spacing: f32,
    /// Distance between generation rows.
    pub vertical_spacing: f32,
    /// Anchor for generation 0.
    pub root: LayoutRoot,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 160.0,
            vertical_spacing: 120.0,
            root: LayoutRoot::FirstPerson,
        }
    }
}

/// Result of a layout computation.
///
/// Persons and marriages without an entry are not drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyLayout {
    /// Person that was placed at generation 0.
    pub root: Option<String>,
    pub generations: Generations,
    pub persons: IndexMap<String, Point>,
    pub marriages: IndexMap<String, Point>,
}

impl FamilyLayout {
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn person_position(&self, id: &str) -> Option<Point> {
        self.persons.get(id).copied()
    }

    pub fn marriage_position(&self, id: &str) -> Option<Point> {
        self.marriages.get(id).copied()
    }

    /// Persons of generation `generation`, left to right.
    pub fn row(&self, generation: i32) -> Vec<&str> {
        let mut row: Vec<(&str, f32)> = self
            .persons
            .iter()
            .filter(|(id, _)| self.generations.get(id.as_str()) == Some(&generation))
            .map(|(id, point)| (id.as_str(), point.x))
            .collect();
        row.sort_by(|a, b| a.1.total_cmp(&b.1));
        row.into_iter().map(|(id, _)| id).collect()
    }

    /// Bounding box of all placed persons as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        if self.persons.is_empty() {
            return None;
        }

        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for point in self.persons.values() {
            min_x = min_x.min(point.x);
            max_x = max_x.max(point.x);
            min_y = min_y.min(point.y);
            max_y = max_y.max(point.y);
        }

        Some((min_x, min_y, max_x, max_y))
    }
}

/// The generation row layout engine.
pub struct GenerationLayout {
    config: LayoutConfig,
}

impl GenerationLayout {
    /// Create a layout engine with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute positions for every person connected to the configured root.
    pub fn compute(&self, tree: &FamilyTree) -> FamilyLayout {
        let root = match &self.config.root {
            LayoutRoot::FirstPerson => tree.first_person_id(),
            LayoutRoot::Person(id) => Some(id.as_str()),
        };
        let Some(root) = root else {
            return FamilyLayout::default();
        };

        let graph = FamilyGraph::from_tree(tree);
        let generations = generations_in(&graph, root);
        if generations.is_empty() {
            return FamilyLayout::default();
        }

        let rows = Self::build_rows(&graph, &generations);
        let persons = self.place_rows(&rows);

        let marriages: IndexMap<String, Point> = tree
            .marriages
            .iter()
            .filter_map(|(id, marriage)| {
                let a = persons.get(&marriage.spouse1)?;
                let b = persons.get(&marriage.spouse2)?;
                Some((id.clone(), a.midpoint(*b)))
            })
            .collect();

        debug!(
            "layout from {root}: {} of {} persons, {} of {} marriages in {} rows",
            persons.len(),
            tree.persons.len(),
            marriages.len(),
            tree.marriages.len(),
            rows.len()
        );

        FamilyLayout {
            root: Some(root.to_string()),
            generations,
            persons,
            marriages,
        }
    }

    /// Group persons into generation rows, keeping spouses adjacent.
    fn build_rows<'a>(
        graph: &'a FamilyGraph,
        generations: &'a Generations,
    ) -> BTreeMap<i32, Vec<&'a str>> {
        let mut order: Vec<(&str, i32)> = generations
            .iter()
            .map(|(id, &generation)| (id.as_str(), generation))
            .collect();
        // Stable: ties keep visit order.
        order.sort_by_key(|&(_, generation)| generation);

        let mut placed: HashSet<&str> = HashSet::with_capacity(order.len());
        let mut rows: BTreeMap<i32, Vec<&str>> = BTreeMap::new();

        for (id, generation) in order {
            if !placed.insert(id) {
                continue;
            }
            let row = rows.entry(generation).or_default();
            row.push(id);

            for marriage in graph.marriages_of(id) {
                let Some(spouse) = graph.partner(marriage, id) else {
                    continue;
                };
                if generations.get(spouse) == Some(&generation) && placed.insert(spouse) {
                    row.push(spouse);
                }
            }
        }

        rows
    }

    /// Center each row on x = 0 and stack rows by generation.
    fn place_rows(&self, rows: &BTreeMap<i32, Vec<&str>>) -> IndexMap<String, Point> {
        let spacing = self.config.horizontal_spacing;
        let mut persons = IndexMap::with_capacity(rows.values().map(Vec::len).sum());

        for (&generation, row) in rows {
            let total_width = (row.len() as f32 - 1.0) * spacing;
            let y = generation as f32 * self.config.vertical_spacing;
            for (index, &id) in row.iter().enumerate() {
                let x = index as f32 * spacing - total_width / 2.0;
                persons.insert(id.to_string(), Point::new(x, y));
            }
        }

        persons
    }
}

/// Compute the layout of `tree` with `config`.
pub fn compute_layout(tree: &FamilyTree, config: &LayoutConfig) -> FamilyLayout {
    GenerationLayout::new(config.clone()).compute(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::mutation::{add_child, add_marriage, add_person};
    use crate::tree::{Marriage, Person, Sex};

    fn with_people(ids: &[&str]) -> FamilyTree {
        ids.iter().fold(FamilyTree::new(), |tree, id| {
            add_person(&tree, Person::new(*id, id.to_uppercase(), Sex::Male))
        })
    }

    /// r & s -> c; c & d -> e
    fn three_generations() -> FamilyTree {
        let mut tree = with_people(&["r", "s", "c", "d", "e"]);
        tree = add_marriage(&tree, Marriage::new("m1", "r", "s"));
        tree = add_child(&tree, "m1", "c");
        tree = add_marriage(&tree, Marriage::new("m2", "c", "d"));
        add_child(&tree, "m2", "e")
    }

    #[test]
    fn test_empty_tree() {
        let layout = GenerationLayout::with_defaults().compute(&FamilyTree::new());
        assert!(layout.is_empty());
        assert!(layout.marriages.is_empty());
        assert_eq!(layout.root, None);
        assert_eq!(layout.bounds(), None);
    }

    #[test]
    fn test_three_generation_rows() {
        let layout = GenerationLayout::new(LayoutConfig {
            horizontal_spacing: 100.0,
            vertical_spacing: 50.0,
            ..Default::default()
        })
        .compute(&three_generations());

        assert_eq!(layout.root.as_deref(), Some("r"));
        assert_eq!(layout.person_position("r"), Some(Point::new(-50.0, 0.0)));
        assert_eq!(layout.person_position("s"), Some(Point::new(50.0, 0.0)));
        assert_eq!(layout.person_position("c"), Some(Point::new(-50.0, 50.0)));
        assert_eq!(layout.person_position("d"), Some(Point::new(50.0, 50.0)));
        assert_eq!(layout.person_position("e"), Some(Point::new(0.0, 100.0)));
    }

    #[test]
    fn test_marriage_is_spouse_midpoint() {
        let layout = GenerationLayout::with_defaults().compute(&three_generations());

        for (id, marriage) in &three_generations().marriages {
            let a = layout.person_position(&marriage.spouse1).unwrap();
            let b = layout.person_position(&marriage.spouse2).unwrap();
            let m = layout.marriage_position(id).unwrap();
            assert_eq!(m.x, (a.x + b.x) / 2.0);
            assert_eq!(m.y, (a.y + b.y) / 2.0);
        }
    }

    #[test]
    fn test_ancestors_above() {
        let mut tree = with_people(&["kid", "dad", "mum"]);
        tree = add_marriage(&tree, Marriage::new("m", "dad", "mum"));
        tree = add_child(&tree, "m", "kid");

        let layout = GenerationLayout::with_defaults().compute(&tree);
        let kid = layout.person_position("kid").unwrap();
        let dad = layout.person_position("dad").unwrap();
        assert_eq!(kid, Point::new(0.0, 0.0));
        assert_eq!(dad.y, -120.0);
        assert!(layout.marriage_position("m").unwrap().y < kid.y);
    }

    #[test]
    fn test_row_is_centered_and_evenly_spaced() {
        // Five children in one row.
        let mut tree = with_people(&["a", "b", "k1", "k2", "k3", "k4", "k5"]);
        tree = add_marriage(&tree, Marriage::new("m", "a", "b"));
        for kid in ["k1", "k2", "k3", "k4", "k5"] {
            tree = add_child(&tree, "m", kid);
        }

        let spacing = 80.0;
        let layout = GenerationLayout::new(LayoutConfig {
            horizontal_spacing: spacing,
            ..Default::default()
        })
        .compute(&tree);

        let row = layout.row(1);
        assert_eq!(row, vec!["k1", "k2", "k3", "k4", "k5"]);

        let xs: Vec<f32> = row
            .iter()
            .map(|id| layout.person_position(id).unwrap().x)
            .collect();
        assert_eq!(xs, vec![-160.0, -80.0, 0.0, 80.0, 160.0]);
        for pair in xs.windows(2) {
            assert_eq!(pair[1] - pair[0], spacing);
        }
        let mut mirrored: Vec<f32> = xs.iter().map(|x| -x).collect();
        mirrored.reverse();
        assert_eq!(mirrored, xs);
    }

    #[test]
    fn test_spouses_stay_adjacent() {
        // Siblings k1, k2; k1 marries an outsider w who is visited last.
        let mut tree = with_people(&["a", "b", "k1", "k2", "w"]);
        tree = add_marriage(&tree, Marriage::new("m", "a", "b"));
        tree = add_child(&tree, "m", "k1");
        tree = add_child(&tree, "m", "k2");
        tree = add_marriage(&tree, Marriage::new("mk", "k1", "w"));

        let layout = GenerationLayout::with_defaults().compute(&tree);
        assert_eq!(layout.row(1), vec!["k1", "w", "k2"]);
    }

    #[test]
    fn test_disconnected_persons_are_not_placed() {
        let mut tree = three_generations();
        tree = add_person(&tree, Person::new("x", "X", Sex::Female));
        tree = add_person(&tree, Person::new("y", "Y", Sex::Male));
        tree = add_marriage(&tree, Marriage::new("mx", "x", "y"));

        let layout = GenerationLayout::with_defaults().compute(&tree);
        assert!(!layout.generations.contains_key("x"));
        assert!(layout.person_position("x").is_none());
        assert!(layout.marriage_position("mx").is_none());
        assert_eq!(layout.persons.len(), 5);
    }

    #[test]
    fn test_marriage_with_unplaced_spouse_is_skipped() {
        let mut tree = three_generations();
        tree = add_marriage(&tree, Marriage::new("mg", "e", "ghost"));

        let layout = GenerationLayout::with_defaults().compute(&tree);
        assert!(layout.marriage_position("mg").is_none());
        assert_eq!(layout.marriages.len(), 2);
    }

    #[test]
    fn test_fixed_root() {
        let layout = compute_layout(
            &three_generations(),
            &LayoutConfig {
                root: LayoutRoot::Person("e".into()),
                ..Default::default()
            },
        );
        assert_eq!(layout.generations["e"], 0);
        assert_eq!(layout.generations["r"], -2);
        assert_eq!(layout.person_position("e"), Some(Point::new(0.0, 0.0)));

        let missing = compute_layout(
            &three_generations(),
            &LayoutConfig {
                root: LayoutRoot::Person("nobody".into()),
                ..Default::default()
            },
        );
        assert!(missing.is_empty());
    }

    #[test]
    fn test_bounds() {
        let layout = GenerationLayout::new(LayoutConfig {
            horizontal_spacing: 100.0,
            vertical_spacing: 50.0,
            ..Default::default()
        })
        .compute(&three_generations());
        assert_eq!(layout.bounds(), Some((-50.0, 0.0, 50.0, 100.0)));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"horizontalSpacing": 200, "root": {"kind": "person", "id": "e"}}"#)
                .unwrap();
        assert_eq!(config.horizontal_spacing, 200.0);
        assert_eq!(config.vertical_spacing, 120.0);
        assert_eq!(config.root, LayoutRoot::Person("e".into()));
    }
}
