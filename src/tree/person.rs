//! Person type and related structures.
//!
//! A person is a vertex of the family graph. Each person has:
//! - A unique string identifier
//! - A display name and a sex
//! - Optional life dates, notes and contact fields
//! - An "external" flag for people who joined the family by marriage

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sex of a person, stored under the `gender` key in snapshot documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("male"),
            Sex::Female => f.write_str("female"),
        }
    }
}

/// A member of the family tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Left empty by hosts that want the module to assign an id.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "gender")]
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Joined the family by marriage rather than by birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Person {
    /// Create a person with only the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, sex: Sex) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sex,
            birth_year: None,
            death_year: None,
            notes: None,
            external: None,
            email: None,
            phone: None,
        }
    }

    /// Builder-style setter for the birth year.
    pub fn born(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    /// Builder-style setter for the death year.
    pub fn died(mut self, year: i32) -> Self {
        self.death_year = Some(year);
        self
    }

    /// Mark the person as having joined the family by marriage.
    pub fn as_external(mut self) -> Self {
        self.external = Some(true);
        self
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.external.unwrap_or(false)
    }

    /// Years lived, when both dates are known.
    pub fn lifespan(&self) -> Option<i32> {
        match (self.birth_year, self.death_year) {
            (Some(born), Some(died)) if died >= born => Some(died - born),
            _ => None,
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match (self.birth_year, self.death_year) {
            (Some(born), Some(died)) => write!(f, " ({born}-{died})"),
            (Some(born), None) => write!(f, " (b. {born})"),
            (None, Some(died)) => write!(f, " (d. {died})"),
            (None, None) => Ok(()),
        }
    }
}
