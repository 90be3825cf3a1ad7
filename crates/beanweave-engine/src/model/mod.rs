//! Read-only program model consumed by the engine
//!
//! The front end (a compiler plugin, an IDE, a test) provides declared types through
//! [`ProgramModel`]. The engine never mutates the model.

mod element;
mod memory;
mod ty;

pub use element::{
    Constructor, DeclaredType, ElementKind, ElementRef, FieldDecl, Member, MemberId, MethodDecl,
    Modifiers, Parameter, PropertyDecl, Span, TypeKind, TypeParam, Visibility,
};
pub use memory::{InMemoryModel, ModelError, TypeBuilder};
pub use ty::{PrimitiveKind, TypeRef, OBJECT_TYPE};

/// Source of declared types for one compilation unit
///
/// Implementations must be shareable across threads: independent types may be
/// processed in parallel against the same model.
pub trait ProgramModel: Send + Sync {
    /// Candidate types of the unit, in declaration order
    fn declared_types(&self) -> Vec<&DeclaredType>;

    /// Resolve a type by qualified name, including types outside the unit
    fn resolve_type(&self, qualified_name: &str) -> Option<&DeclaredType>;
}
