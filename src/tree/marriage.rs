//! Marriage and child-link structures.
//!
//! A marriage joins two persons and is the parent of zero or more children.
//! Child links are plain `(marriage, person)` pairs with no identity of their own.

use serde::{Deserialize, Serialize};

/// A union between two persons.
///
/// The spouses are conceptually unordered but stored in two fixed slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marriage {
    pub id: String,
    #[serde(rename = "spouse1Id")]
    pub spouse1: String,
    #[serde(rename = "spouse2Id")]
    pub spouse2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marriage_year: Option<i32>,
}

impl Marriage {
    pub fn new(
        id: impl Into<String>,
        spouse1: impl Into<String>,
        spouse2: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            spouse1: spouse1.into(),
            spouse2: spouse2.into(),
            marriage_year: None,
        }
    }

    /// Builder-style setter for the marriage year.
    pub fn in_year(mut self, year: i32) -> Self {
        self.marriage_year = Some(year);
        self
    }

    /// Whether `person_id` is one of the two spouses.
    #[inline]
    pub fn involves(&self, person_id: &str) -> bool {
        self.spouse1 == person_id || self.spouse2 == person_id
    }

    /// The partner of `person_id`, or `None` if they are not a spouse here.
    pub fn spouse_of(&self, person_id: &str) -> Option<&str> {
        if self.spouse1 == person_id {
            Some(&self.spouse2)
        } else if self.spouse2 == person_id {
            Some(&self.spouse1)
        } else {
            None
        }
    }

    /// Both spouse ids in slot order.
    #[inline]
    pub fn spouses(&self) -> [&str; 2] {
        [&self.spouse1, &self.spouse2]
    }
}

/// States that `person_id` is a child of `marriage_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildLink {
    pub marriage_id: String,
    pub person_id: String,
}

impl ChildLink {
    pub fn new(marriage_id: impl Into<String>, person_id: impl Into<String>) -> Self {
        Self {
            marriage_id: marriage_id.into(),
            person_id: person_id.into(),
        }
    }
}
