//! Generation assignment by breadth-first traversal.
//!
//! The traversal walks persons through marriages:
//! - a spouse shares the current person's generation
//! - children of any of their marriages are one generation below (+1)
//! - the parents of their (first) parent marriage are one generation above (-1)
//!
//! Each person is enqueued at most once, so the walk is O(P + M) over the
//! reachable persons and marriages and terminates on cyclic data. Persons not
//! connected to the start get no generation at all.

use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};

use crate::graph::FamilyGraph;
use crate::tree::FamilyTree;

/// Person id -> generation, in the order persons were visited.
pub type Generations = IndexMap<String, i32>;

/// Assign generations relative to `start_id` (generation 0).
///
/// Returns an empty map when `start_id` is not in the tree.
pub fn compute_generations(tree: &FamilyTree, start_id: &str) -> Generations {
    generations_in(&FamilyGraph::from_tree(tree), start_id)
}

/// Same as [`compute_generations`] over an already built graph.
pub fn generations_in(graph: &FamilyGraph, start_id: &str) -> Generations {
    let mut generations = Generations::new();
    if !graph.contains_person(start_id) {
        return generations;
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, i32)> = VecDeque::new();
    visited.insert(start_id);
    queue.push_back((start_id, 0));

    while let Some((id, level)) = queue.pop_front() {
        generations.insert(id.to_string(), level);

        for marriage in graph.marriages_of(id) {
            if let Some(spouse) = graph.partner(marriage, id) {
                if visited.insert(spouse) {
                    queue.push_back((spouse, level));
                }
            }
            for child in graph.children_of(marriage) {
                if visited.insert(child) {
                    queue.push_back((child, level + 1));
                }
            }
        }

        if let Some(parents) = graph.parent_marriage(id) {
            for parent in graph.spouses_in(parents) {
                if visited.insert(parent) {
                    queue.push_back((parent, level - 1));
                }
            }
        }
    }

    generations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::mutation::{add_child, add_marriage, add_person};
    use crate::tree::{Marriage, Person, Sex};

    fn with_people(ids: &[&str]) -> FamilyTree {
        ids.iter().fold(FamilyTree::new(), |tree, id| {
            add_person(&tree, Person::new(*id, id.to_uppercase(), Sex::Female))
        })
    }

    fn gen_pairs(generations: &Generations) -> Vec<(&str, i32)> {
        generations.iter().map(|(id, &g)| (id.as_str(), g)).collect()
    }

    #[test]
    fn test_three_generations() {
        let mut tree = with_people(&["r", "s", "c", "d", "e"]);
        tree = add_marriage(&tree, Marriage::new("m1", "r", "s"));
        tree = add_child(&tree, "m1", "c");
        tree = add_marriage(&tree, Marriage::new("m2", "c", "d"));
        tree = add_child(&tree, "m2", "e");

        let generations = compute_generations(&tree, "r");
        assert_eq!(
            gen_pairs(&generations),
            vec![("r", 0), ("s", 0), ("c", 1), ("d", 1), ("e", 2)]
        );
    }

    #[test]
    fn test_parents_are_one_above() {
        let mut tree = with_people(&["kid", "mum", "dad", "gran", "grandad"]);
        tree = add_marriage(&tree, Marriage::new("m1", "dad", "mum"));
        tree = add_child(&tree, "m1", "kid");
        tree = add_marriage(&tree, Marriage::new("m0", "grandad", "gran"));
        tree = add_child(&tree, "m0", "mum");

        let generations = compute_generations(&tree, "kid");
        assert_eq!(generations["kid"], 0);
        assert_eq!(generations["dad"], -1);
        assert_eq!(generations["mum"], -1);
        assert_eq!(generations["gran"], -2);
        assert_eq!(generations["grandad"], -2);
    }

    #[test]
    fn test_siblings_share_generation() {
        let mut tree = with_people(&["a", "b", "x", "y"]);
        tree = add_marriage(&tree, Marriage::new("m", "a", "b"));
        tree = add_child(&tree, "m", "x");
        tree = add_child(&tree, "m", "y");

        // From one sibling: up to the parents, then down to the other sibling.
        let generations = compute_generations(&tree, "x");
        assert_eq!(generations["y"], 0);
        assert_eq!(generations["a"], -1);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tree = with_people(&["a"]);
        assert!(compute_generations(&tree, "zzz").is_empty());
        assert!(compute_generations(&FamilyTree::new(), "a").is_empty());
    }

    #[test]
    fn test_disconnected_person_is_absent() {
        let mut tree = with_people(&["a", "b", "loner"]);
        tree = add_marriage(&tree, Marriage::new("m", "a", "b"));

        let generations = compute_generations(&tree, "a");
        assert_eq!(generations.len(), 2);
        assert!(!generations.contains_key("loner"));
    }

    #[test]
    fn test_cycles_terminate() {
        // a marries b twice, and their child marries a.
        let mut tree = with_people(&["a", "b", "c"]);
        tree = add_marriage(&tree, Marriage::new("m1", "a", "b"));
        tree = add_marriage(&tree, Marriage::new("m2", "b", "a"));
        tree = add_child(&tree, "m1", "c");
        tree = add_marriage(&tree, Marriage::new("m3", "c", "a"));
        tree = add_child(&tree, "m3", "b");

        let generations = compute_generations(&tree, "a");
        assert_eq!(generations.len(), 3);
        assert_eq!(generations["a"], 0);
        assert_eq!(generations["b"], 0);
        // c is reached as a child of m1 before a's marriage m3 is expanded.
        assert_eq!(generations["c"], 1);
    }

    #[test]
    fn test_only_first_parent_link_is_followed() {
        let mut tree = with_people(&["kid", "p1", "p2", "q1", "q2"]);
        tree = add_marriage(&tree, Marriage::new("mp", "p1", "p2"));
        tree = add_marriage(&tree, Marriage::new("mq", "q1", "q2"));
        tree = add_child(&tree, "mp", "kid");
        tree = add_child(&tree, "mq", "kid");

        let generations = compute_generations(&tree, "kid");
        assert_eq!(generations["p1"], -1);
        assert!(!generations.contains_key("q1"));
    }
}
