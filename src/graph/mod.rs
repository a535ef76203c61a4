//! FamilyGraph - the family snapshot as a petgraph structure.
//!
//! Persons and marriages are both nodes, giving a bipartite-like graph:
//! - `Spouse` edges run person -> marriage
//! - `Child` edges run marriage -> person
//!
//! Neighbors are always reported in edge insertion order, which follows
//! marriage order and then child-link order of the snapshot. References to
//! persons or marriages missing from the snapshot are dropped while building.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use crate::tree::FamilyTree;

/// Node weight: the id of the entity the node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyNode {
    Person(String),
    Marriage(String),
}

impl FamilyNode {
    pub fn id(&self) -> &str {
        match self {
            FamilyNode::Person(id) | FamilyNode::Marriage(id) => id,
        }
    }
}

/// Edge weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Person is a spouse in the marriage.
    Spouse,
    /// Marriage produced the person.
    Child,
}

/// Read-only graph view over one snapshot.
pub struct FamilyGraph {
    graph: StableGraph<FamilyNode, Relation, Directed>,

    /// Map from person id to node index
    persons: HashMap<String, NodeIndex>,

    /// Map from marriage id to node index
    marriages: HashMap<String, NodeIndex>,

    /// First child link of each person, kept even when its marriage is missing
    first_parent: HashMap<String, String>,
}

impl FamilyGraph {
    /// Build the graph for `tree`.
    pub fn from_tree(tree: &FamilyTree) -> Self {
        let node_capacity = tree.persons.len() + tree.marriages.len();
        let edge_capacity = tree.marriages.len() * 2 + tree.children.len();

        let mut graph = StableGraph::with_capacity(node_capacity, edge_capacity);
        let mut persons = HashMap::with_capacity(tree.persons.len());
        let mut marriages = HashMap::with_capacity(tree.marriages.len());
        let mut first_parent = HashMap::new();

        for id in tree.persons.keys() {
            let index = graph.add_node(FamilyNode::Person(id.clone()));
            persons.insert(id.clone(), index);
        }

        for (id, marriage) in &tree.marriages {
            let index = graph.add_node(FamilyNode::Marriage(id.clone()));
            marriages.insert(id.clone(), index);
            for spouse in marriage.spouses() {
                if let Some(&person) = persons.get(spouse) {
                    graph.add_edge(person, index, Relation::Spouse);
                }
            }
        }

        for link in &tree.children {
            first_parent
                .entry(link.person_id.clone())
                .or_insert_with(|| link.marriage_id.clone());
            if let (Some(&marriage), Some(&person)) =
                (marriages.get(&link.marriage_id), persons.get(&link.person_id))
            {
                graph.add_edge(marriage, person, Relation::Child);
            }
        }

        Self {
            graph,
            persons,
            marriages,
            first_parent,
        }
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn marriage_count(&self) -> usize {
        self.marriages.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_person(&self, id: &str) -> bool {
        self.persons.contains_key(id)
    }

    /// Marriages in which `person_id` is a spouse.
    pub fn marriages_of(&self, person_id: &str) -> Vec<&str> {
        self.persons
            .get(person_id)
            .map(|&index| self.related(index, Direction::Outgoing, Relation::Spouse))
            .unwrap_or_default()
    }

    /// Spouses of `marriage_id` that exist in the snapshot, in slot order.
    pub fn spouses_in(&self, marriage_id: &str) -> Vec<&str> {
        self.marriages
            .get(marriage_id)
            .map(|&index| self.related(index, Direction::Incoming, Relation::Spouse))
            .unwrap_or_default()
    }

    /// The other spouse of `marriage_id`, seen from `person_id`.
    pub fn partner(&self, marriage_id: &str, person_id: &str) -> Option<&str> {
        self.spouses_in(marriage_id)
            .into_iter()
            .find(|&spouse| spouse != person_id)
    }

    /// Children of `marriage_id`, in link order.
    pub fn children_of(&self, marriage_id: &str) -> Vec<&str> {
        self.marriages
            .get(marriage_id)
            .map(|&index| self.related(index, Direction::Outgoing, Relation::Child))
            .unwrap_or_default()
    }

    /// The marriage that produced `person_id`.
    ///
    /// Only the first parent link is followed when the data holds several. If
    /// that link names a missing marriage the person has no parents here,
    /// matching [`FamilyTree::parents_of`].
    pub fn parent_marriage(&self, person_id: &str) -> Option<&str> {
        let marriage_id = self.first_parent.get(person_id)?;
        self.marriages
            .contains_key(marriage_id)
            .then_some(marriage_id.as_str())
    }

    /// Ids on the far side of `relation` edges, ordered by edge insertion.
    fn related(&self, index: NodeIndex, direction: Direction, relation: Relation) -> Vec<&str> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(index, direction)
            .filter(|edge| *edge.weight() == relation)
            .map(|edge| {
                // Person and marriage nodes never share an edge with themselves.
                let other = if edge.source() == index {
                    edge.target()
                } else {
                    edge.source()
                };
                (edge.id(), other)
            })
            .collect();
        edges.sort_unstable_by_key(|&(edge, _)| edge);

        edges
            .into_iter()
            .filter_map(|(_, other)| self.graph.node_weight(other).map(FamilyNode::id))
            .collect()
    }
}
