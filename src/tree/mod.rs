//! Family tree data model and edits.
//!
//! A [`FamilyTree`] snapshot holds persons, marriages and child links. Edits
//! in [`mutation`] produce new snapshots and never modify their input.

mod ids;
mod marriage;
pub mod mutation;
mod person;
mod snapshot;

pub use ids::{IdGenerator, RandomIds, SequentialIds, RANDOM_ID_LEN};
pub use marriage::{ChildLink, Marriage};
pub use mutation::Edit;
pub use person::{Person, Sex};
pub use snapshot::FamilyTree;
