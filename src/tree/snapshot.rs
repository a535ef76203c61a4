//! FamilyTree - the immutable snapshot aggregate.
//!
//! A snapshot owns every person, marriage and child link. It is the sole input
//! and output of the mutation functions and the unit of import/export. Maps
//! keep insertion order so that "first person" and exported documents are
//! stable across round trips.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::marriage::{ChildLink, Marriage};
use super::person::Person;
use crate::error::ImportError;

/// One immutable instance of the family graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTree {
    pub persons: IndexMap<String, Person>,
    pub marriages: IndexMap<String, Marriage>,
    pub children: Vec<ChildLink>,
}

impl FamilyTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.persons.get(id)
    }

    pub fn marriage(&self, id: &str) -> Option<&Marriage> {
        self.marriages.get(id)
    }

    pub fn contains_person(&self, id: &str) -> bool {
        self.persons.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Id of the first-inserted person, used as the default layout root.
    pub fn first_person_id(&self) -> Option<&str> {
        self.persons.keys().next().map(String::as_str)
    }

    /// Marriages in which `person_id` is a spouse, in insertion order.
    pub fn marriages_of<'a>(&'a self, person_id: &'a str) -> impl Iterator<Item = &'a Marriage> {
        self.marriages.values().filter(move |m| m.involves(person_id))
    }

    /// Spouses of `person_id` across all their marriages.
    pub fn spouses_of<'a>(&'a self, person_id: &'a str) -> impl Iterator<Item = &'a str> {
        self.marriages_of(person_id)
            .filter_map(move |m| m.spouse_of(person_id))
    }

    /// Ids of the children of `marriage_id`, in link order.
    pub fn children_of<'a>(&'a self, marriage_id: &'a str) -> impl Iterator<Item = &'a str> {
        self.children
            .iter()
            .filter(move |link| link.marriage_id == marriage_id)
            .map(|link| link.person_id.as_str())
    }

    /// The first child link naming `person_id` as the child.
    ///
    /// A person is expected to have at most one parent link; when the data
    /// holds more, only the first is reported.
    pub fn parent_link(&self, person_id: &str) -> Option<&ChildLink> {
        self.children.iter().find(|link| link.person_id == person_id)
    }

    /// The marriage that produced `person_id`, if it exists.
    pub fn parents_of(&self, person_id: &str) -> Option<&Marriage> {
        self.parent_link(person_id)
            .and_then(|link| self.marriages.get(&link.marriage_id))
    }

    pub fn has_child_link(&self, marriage_id: &str, person_id: &str) -> bool {
        self.children
            .iter()
            .any(|link| link.marriage_id == marriage_id && link.person_id == person_id)
    }

    // =========================================================================
    // Import / Export
    // =========================================================================

    /// Parse and validate a snapshot document.
    ///
    /// The document must have the `persons` / `marriages` / `children` shape,
    /// every entry must be stored under its own id, and every reference must
    /// resolve. Nothing partial is ever returned.
    pub fn from_json(raw: &str) -> Result<Self, ImportError> {
        let tree: FamilyTree = serde_json::from_str(raw).map_err(ImportError::Malformed)?;
        tree.check_integrity()?;
        Ok(tree)
    }

    /// Serialize to the snapshot document format.
    pub fn to_json(&self) -> Result<String, ImportError> {
        serde_json::to_string_pretty(self).map_err(ImportError::Serialize)
    }

    /// Verify keys match ids and every reference resolves.
    pub fn check_integrity(&self) -> Result<(), ImportError> {
        for (key, person) in &self.persons {
            if *key != person.id {
                return Err(ImportError::KeyMismatch {
                    kind: "person",
                    key: key.clone(),
                    id: person.id.clone(),
                });
            }
        }

        for (key, marriage) in &self.marriages {
            if *key != marriage.id {
                return Err(ImportError::KeyMismatch {
                    kind: "marriage",
                    key: key.clone(),
                    id: marriage.id.clone(),
                });
            }
            for spouse in marriage.spouses() {
                if !self.persons.contains_key(spouse) {
                    return Err(ImportError::DanglingReference {
                        from: format!("marriage `{}`", marriage.id),
                        kind: "person",
                        id: spouse.to_string(),
                    });
                }
            }
        }

        let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(self.children.len());
        for link in &self.children {
            let from = || format!("child link (`{}`, `{}`)", link.marriage_id, link.person_id);
            if !self.marriages.contains_key(&link.marriage_id) {
                return Err(ImportError::DanglingReference {
                    from: from(),
                    kind: "marriage",
                    id: link.marriage_id.clone(),
                });
            }
            if !self.persons.contains_key(&link.person_id) {
                return Err(ImportError::DanglingReference {
                    from: from(),
                    kind: "person",
                    id: link.person_id.clone(),
                });
            }
            if !seen.insert((link.marriage_id.as_str(), link.person_id.as_str())) {
                return Err(ImportError::DuplicateChildLink {
                    marriage: link.marriage_id.clone(),
                    person: link.person_id.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Sex;
    use proptest::prelude::*;

    fn sample() -> FamilyTree {
        let mut tree = FamilyTree::new();
        for (id, sex) in [("r", Sex::Male), ("s", Sex::Female), ("c", Sex::Female)] {
            tree.persons.insert(id.into(), Person::new(id, id.to_uppercase(), sex));
        }
        tree.marriages
            .insert("m1".into(), Marriage::new("m1", "r", "s").in_year(1970));
        tree.children.push(ChildLink::new("m1", "c"));
        tree
    }

    #[test]
    fn test_queries() {
        let tree = sample();
        assert_eq!(tree.first_person_id(), Some("r"));
        assert_eq!(tree.spouses_of("r").collect::<Vec<_>>(), vec!["s"]);
        assert_eq!(tree.children_of("m1").collect::<Vec<_>>(), vec!["c"]);
        assert_eq!(tree.parents_of("c").map(|m| m.id.as_str()), Some("m1"));
        assert!(tree.parents_of("r").is_none());
        assert!(tree.has_child_link("m1", "c"));
    }

    #[test]
    fn test_round_trip() {
        let tree = sample();
        let json = tree.to_json().unwrap();
        let back = FamilyTree::from_json(&json).unwrap();
        assert_eq!(back, tree);
        assert_eq!(back.first_person_id(), Some("r"));
    }

    #[test]
    fn test_document_shape() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["persons"]["r"]["gender"], "male");
        assert_eq!(json["marriages"]["m1"]["spouse2Id"], "s");
        assert_eq!(json["children"][0]["personId"], "c");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            FamilyTree::from_json("not json"),
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(
            FamilyTree::from_json(r#"{"persons": [], "marriages": {}, "children": []}"#),
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(
            FamilyTree::from_json(r#"{"persons": {}, "marriages": {}}"#),
            Err(ImportError::Malformed(_))
        ));
    }

    #[test]
    fn test_rejects_key_mismatch() {
        let raw = r#"{
            "persons": {"a": {"id": "b", "name": "B", "gender": "male"}},
            "marriages": {},
            "children": []
        }"#;
        assert!(matches!(
            FamilyTree::from_json(raw),
            Err(ImportError::KeyMismatch { kind: "person", .. })
        ));
    }

    #[test]
    fn test_rejects_dangling_spouse() {
        let raw = r#"{
            "persons": {"a": {"id": "a", "name": "A", "gender": "male"}},
            "marriages": {"m": {"id": "m", "spouse1Id": "a", "spouse2Id": "ghost"}},
            "children": []
        }"#;
        match FamilyTree::from_json(raw) {
            Err(ImportError::DanglingReference { kind, id, .. }) => {
                assert_eq!(kind, "person");
                assert_eq!(id, "ghost");
            }
            other => panic!("expected dangling reference, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_duplicate_child_link() {
        let mut tree = sample();
        tree.children.push(ChildLink::new("m1", "c"));
        let json = tree.to_json().unwrap();
        assert!(matches!(
            FamilyTree::from_json(&json),
            Err(ImportError::DuplicateChildLink { .. })
        ));
    }

    /// Random trees with optional fields filled in. Spouse and child indices
    /// point at existing entries, so most samples are valid.
    fn arb_tree() -> impl Strategy<Value = FamilyTree> {
        let people = prop::collection::vec(
            (
                any::<bool>(),
                prop::option::of(1700i32..2030),
                prop::option::of("[a-zA-Z ,.]{0,16}"),
                prop::option::of(any::<bool>()),
            ),
            1..7,
        );
        people
            .prop_flat_map(|people| {
                let n = people.len();
                (
                    Just(people),
                    prop::collection::vec((0..n, 0..n, prop::option::of(1750i32..2030)), 0..5),
                    prop::collection::vec((0usize..5, 0..n), 0..8),
                )
            })
            .prop_map(|(people, pairs, links)| {
                let mut tree = FamilyTree::new();
                for (i, (male, born, notes, external)) in people.into_iter().enumerate() {
                    let sex = if male { Sex::Male } else { Sex::Female };
                    let mut person = Person::new(format!("p{i}"), format!("Person {i}"), sex);
                    person.birth_year = born;
                    person.notes = notes;
                    person.external = external;
                    tree.persons.insert(person.id.clone(), person);
                }
                for (i, (a, b, year)) in pairs.iter().enumerate() {
                    let mut marriage = Marriage::new(format!("m{i}"), format!("p{a}"), format!("p{b}"));
                    marriage.marriage_year = *year;
                    tree.marriages.insert(marriage.id.clone(), marriage);
                }
                for (m, p) in links {
                    let (marriage, person) = (format!("m{m}"), format!("p{p}"));
                    if m < pairs.len() && !tree.has_child_link(&marriage, &person) {
                        tree.children.push(ChildLink::new(marriage, person));
                    }
                }
                tree
            })
    }

    proptest! {
        #[test]
        fn prop_export_import_round_trip(tree in arb_tree()) {
            prop_assume!(tree.check_integrity().is_ok());
            let json = tree.to_json().unwrap();
            let back = FamilyTree::from_json(&json).unwrap();
            prop_assert_eq!(back, tree);
        }
    }
}
