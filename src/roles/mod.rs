//! Roles: the capability table and legality queries.

pub mod definition;
pub mod registry;

pub use definition::{AbilityKind, Faction, Role, RoleSpec};
pub use registry::{LegalNightAction, RoleRegistry};
