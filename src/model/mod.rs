//! Domain model for the Place graph
//!
//! - `EntityKind` / `Collection`: what can be referenced and where it lives
//! - `PlaceKind`: the closed Place kind enumeration
//! - `Reference`: DBRef-shaped, non-owning pointer
//! - `Place` / `PlaceLinks`: typed record and relationship view

mod kind;
mod place;
mod reference;

pub use kind::{Collection, EntityKind, PlaceKind};
pub use place::{fields, Place, PlaceLinks};
pub use reference::{Reference, ReferenceShapeError, DB_KEY, ID_KEY, REF_KEY};
