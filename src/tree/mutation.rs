//! Pure snapshot-to-snapshot edits.
//!
//! Every function borrows the current snapshot and returns a new one; the
//! input is never touched. Two families of edits exist:
//!
//! - **Permissive** (`add_person`, `add_marriage`, `add_child`, ...): trust the
//!   caller to pass existing ids. These never fail.
//! - **Checked** (`try_*` and the compound edits): validate references and the
//!   single parent-link rule, returning a [`TreeError`] instead of producing a
//!   snapshot with dangling semantics. Compound edits also never overwrite an
//!   existing person or marriage.
//!
//! Multiple edits in one turn are applied strictly in sequence, the output of
//! one being the input of the next.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use super::marriage::{ChildLink, Marriage};
use super::person::Person;
use super::snapshot::FamilyTree;
use crate::error::TreeError;

// =============================================================================
// Permissive edits
// =============================================================================

/// Insert `person`, overwriting any entry with the same id.
pub fn add_person(tree: &FamilyTree, person: Person) -> FamilyTree {
    let mut next = tree.clone();
    next.persons.insert(person.id.clone(), person);
    next
}

/// Replace the person stored under `person.id` with all fields of `person`.
///
/// There are no partial updates: unchanged fields must be carried by the caller.
pub fn update_person(tree: &FamilyTree, person: Person) -> FamilyTree {
    add_person(tree, person)
}

/// Insert `marriage`, overwriting any entry with the same id.
pub fn add_marriage(tree: &FamilyTree, marriage: Marriage) -> FamilyTree {
    let mut next = tree.clone();
    next.marriages.insert(marriage.id.clone(), marriage);
    next
}

/// Append a child link unless the exact pair is already present.
pub fn add_child(tree: &FamilyTree, marriage_id: &str, person_id: &str) -> FamilyTree {
    let mut next = tree.clone();
    if !tree.has_child_link(marriage_id, person_id) {
        next.children.push(ChildLink::new(marriage_id, person_id));
    }
    next
}

/// Remove a person and cascade.
///
/// 1. Drop the person.
/// 2. Drop every marriage in which they are a spouse.
/// 3. Keep only child links that neither name the person nor point at a
///    marriage that no longer exists.
///
/// Step 3 runs against the marriages left by step 2, so the children of a
/// removed marriage lose their parent link too.
pub fn delete_person(tree: &FamilyTree, person_id: &str) -> FamilyTree {
    let persons = tree
        .persons
        .iter()
        .filter(|(id, _)| id.as_str() != person_id)
        .map(|(id, person)| (id.clone(), person.clone()))
        .collect();

    let marriages: IndexMap<String, Marriage> = tree
        .marriages
        .iter()
        .filter(|(_, marriage)| !marriage.involves(person_id))
        .map(|(id, marriage)| (id.clone(), marriage.clone()))
        .collect();

    let children: Vec<ChildLink> = tree
        .children
        .iter()
        .filter(|link| link.person_id != person_id && marriages.contains_key(&link.marriage_id))
        .cloned()
        .collect();

    debug!(
        "deleted person {person_id}: {} marriage(s), {} child link(s) cascaded",
        tree.marriages.len() - marriages.len(),
        tree.children.len() - children.len()
    );

    FamilyTree {
        persons,
        marriages,
        children,
    }
}

// =============================================================================
// Checked edits
// =============================================================================

/// Like [`update_person`], but the person must already exist.
pub fn try_update_person(tree: &FamilyTree, person: Person) -> Result<FamilyTree, TreeError> {
    require_person(tree, &person.id)?;
    Ok(update_person(tree, person))
}

/// Like [`add_marriage`], but both spouses must exist.
pub fn try_add_marriage(tree: &FamilyTree, marriage: Marriage) -> Result<FamilyTree, TreeError> {
    require_person(tree, &marriage.spouse1)?;
    require_person(tree, &marriage.spouse2)?;
    Ok(add_marriage(tree, marriage))
}

/// Like [`add_child`], but both ids must exist and the person may not already
/// be the child of a different marriage.
pub fn try_add_child(
    tree: &FamilyTree,
    marriage_id: &str,
    person_id: &str,
) -> Result<FamilyTree, TreeError> {
    require_marriage(tree, marriage_id)?;
    require_person(tree, person_id)?;
    require_no_other_parents(tree, person_id, marriage_id)?;
    Ok(add_child(tree, marriage_id, person_id))
}

/// Insert `spouse` and a marriage between them and `person_id`.
///
/// The spouse and the marriage must both be new. The spouse is marked
/// external unless the caller decided otherwise.
pub fn add_spouse(
    tree: &FamilyTree,
    person_id: &str,
    mut spouse: Person,
    marriage_id: &str,
    marriage_year: Option<i32>,
) -> Result<FamilyTree, TreeError> {
    require_person(tree, person_id)?;
    if spouse.id == person_id {
        return Err(TreeError::SelfMarriage(person_id.to_string()));
    }
    require_new_person(tree, &spouse.id)?;
    require_new_marriage(tree, marriage_id)?;
    if spouse.external.is_none() {
        spouse.external = Some(true);
    }

    let mut marriage = Marriage::new(marriage_id, person_id, spouse.id.as_str());
    marriage.marriage_year = marriage_year;

    let next = add_person(tree, spouse);
    Ok(add_marriage(&next, marriage))
}

/// Insert `child` as a new person born to `marriage_id`.
pub fn add_child_of(
    tree: &FamilyTree,
    marriage_id: &str,
    child: Person,
) -> Result<FamilyTree, TreeError> {
    require_marriage(tree, marriage_id)?;
    require_new_person(tree, &child.id)?;
    // Permissive edits can leave links naming an id that has no person yet.
    require_no_other_parents(tree, &child.id, marriage_id)?;
    let child_id = child.id.clone();
    let next = add_person(tree, child);
    Ok(add_child(&next, marriage_id, &child_id))
}

/// Insert two parents for `child_id`, their marriage, and the child link.
///
/// Both parents and the marriage must be new.
pub fn add_parents(
    tree: &FamilyTree,
    child_id: &str,
    father: Person,
    mother: Person,
    marriage_id: &str,
    marriage_year: Option<i32>,
) -> Result<FamilyTree, TreeError> {
    require_person(tree, child_id)?;
    require_no_other_parents(tree, child_id, marriage_id)?;
    require_new_marriage(tree, marriage_id)?;
    require_new_person(tree, &father.id)?;
    require_new_person(tree, &mother.id)?;
    if father.id == mother.id {
        return Err(TreeError::SelfMarriage(father.id));
    }

    let mut marriage = Marriage::new(marriage_id, father.id.as_str(), mother.id.as_str());
    marriage.marriage_year = marriage_year;

    let next = add_person(tree, father);
    let next = add_person(&next, mother);
    let next = add_marriage(&next, marriage);
    Ok(add_child(&next, marriage_id, child_id))
}

fn require_person(tree: &FamilyTree, id: &str) -> Result<(), TreeError> {
    if tree.contains_person(id) {
        Ok(())
    } else {
        Err(TreeError::UnknownPerson(id.to_string()))
    }
}

fn require_marriage(tree: &FamilyTree, id: &str) -> Result<(), TreeError> {
    if tree.marriages.contains_key(id) {
        Ok(())
    } else {
        Err(TreeError::UnknownMarriage(id.to_string()))
    }
}

fn require_new_person(tree: &FamilyTree, id: &str) -> Result<(), TreeError> {
    if tree.contains_person(id) {
        Err(TreeError::DuplicatePerson(id.to_string()))
    } else {
        Ok(())
    }
}

fn require_new_marriage(tree: &FamilyTree, id: &str) -> Result<(), TreeError> {
    if tree.marriages.contains_key(id) {
        Err(TreeError::DuplicateMarriage(id.to_string()))
    } else {
        Ok(())
    }
}

fn require_no_other_parents(
    tree: &FamilyTree,
    person_id: &str,
    marriage_id: &str,
) -> Result<(), TreeError> {
    match tree.parent_link(person_id) {
        Some(link) if link.marriage_id != marriage_id => Err(TreeError::AlreadyHasParents {
            person: person_id.to_string(),
            marriage: link.marriage_id.clone(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Edits as data
// =============================================================================

/// An edit described as plain data, as sent by the host UI.
///
/// Serialized as `{"kind": "addPerson", "person": {...}}` and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Edit {
    AddPerson {
        person: Person,
    },
    UpdatePerson {
        person: Person,
    },
    AddMarriage {
        marriage: Marriage,
    },
    AddChild {
        marriage_id: String,
        person_id: String,
    },
    DeletePerson {
        person_id: String,
    },
    AddSpouse {
        person_id: String,
        spouse: Person,
        marriage_id: String,
        #[serde(default)]
        marriage_year: Option<i32>,
    },
    AddChildOf {
        marriage_id: String,
        child: Person,
    },
    AddParents {
        child_id: String,
        father: Person,
        mother: Person,
        marriage_id: String,
        #[serde(default)]
        marriage_year: Option<i32>,
    },
}

impl Edit {
    /// Apply the edit to `tree`, producing the next snapshot.
    ///
    /// Reference-carrying edits go through their checked variants.
    pub fn apply(&self, tree: &FamilyTree) -> Result<FamilyTree, TreeError> {
        match self {
            Edit::AddPerson { person } => Ok(add_person(tree, person.clone())),
            Edit::UpdatePerson { person } => try_update_person(tree, person.clone()),
            Edit::AddMarriage { marriage } => try_add_marriage(tree, marriage.clone()),
            Edit::AddChild {
                marriage_id,
                person_id,
            } => try_add_child(tree, marriage_id, person_id),
            Edit::DeletePerson { person_id } => Ok(delete_person(tree, person_id)),
            Edit::AddSpouse {
                person_id,
                spouse,
                marriage_id,
                marriage_year,
            } => add_spouse(tree, person_id, spouse.clone(), marriage_id, *marriage_year),
            Edit::AddChildOf { marriage_id, child } => {
                add_child_of(tree, marriage_id, child.clone())
            }
            Edit::AddParents {
                child_id,
                father,
                mother,
                marriage_id,
                marriage_year,
            } => add_parents(
                tree,
                child_id,
                father.clone(),
                mother.clone(),
                marriage_id,
                *marriage_year,
            ),
        }
    }
}
