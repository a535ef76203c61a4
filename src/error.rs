//! Error types for tree edits and snapshot import.
//!
//! Pure functions never fail on structurally valid input. These errors cover
//! the checked edit variants and the import boundary, where bad data has to
//! be reported instead of silently degraded.

use thiserror::Error;

/// A checked edit referenced something the snapshot does not contain, would
/// overwrite an existing entry, or would break the single parent-link rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown person `{0}`")]
    UnknownPerson(String),

    #[error("unknown marriage `{0}`")]
    UnknownMarriage(String),

    /// The person is already the child of another marriage.
    #[error("person `{person}` already has parents (marriage `{marriage}`)")]
    AlreadyHasParents { person: String, marriage: String },

    /// A compound edit tried to insert a person under an id already in use.
    #[error("person `{0}` already exists")]
    DuplicatePerson(String),

    #[error("marriage `{0}` already exists")]
    DuplicateMarriage(String),

    #[error("person `{0}` cannot marry themself")]
    SelfMarriage(String),
}

/// A snapshot document could not be imported or exported.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document is not JSON of the expected shape.
    #[error("malformed family tree document: {0}")]
    Malformed(#[source] serde_json::Error),

    /// A `persons`/`marriages` entry is stored under a key that differs from its `id`.
    #[error("{kind} stored under key `{key}` has id `{id}`")]
    KeyMismatch {
        kind: &'static str,
        key: String,
        id: String,
    },

    #[error("{from} references missing {kind} `{id}`")]
    DanglingReference {
        from: String,
        kind: &'static str,
        id: String,
    },

    #[error("child link (`{marriage}`, `{person}`) appears more than once")]
    DuplicateChildLink { marriage: String, person: String },

    #[error("failed to serialize family tree: {0}")]
    Serialize(#[source] serde_json::Error),
}
