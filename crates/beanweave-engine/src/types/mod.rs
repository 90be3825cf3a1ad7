//! Subtyping and assignability over the program model

pub mod assignability;
pub mod subtyping;

pub use assignability::AssignabilityContext;
pub use subtyping::SubtypingContext;
