//! Assignability of signature types
//!
//! Implements the relation used when matching one method signature against
//! another: T ~> U (a value of T can be passed where U is expected). Type
//! arguments are erased; type variables are replaced by their bindings, or by
//! their bound when unbound.

use super::subtyping::SubtypingContext;
use crate::model::{ProgramModel, TypeRef, OBJECT_TYPE};
use rustc_hash::FxHashMap;

/// Context for checking assignability
pub struct AssignabilityContext<'a> {
    /// Subtyping context
    subtyping: SubtypingContext<'a>,

    /// Bound type variables
    bindings: FxHashMap<String, TypeRef>,
}

impl<'a> AssignabilityContext<'a> {
    /// Create a new assignability context
    pub fn new(model: &'a dyn ProgramModel) -> Self {
        AssignabilityContext {
            subtyping: SubtypingContext::new(model),
            bindings: FxHashMap::default(),
        }
    }

    /// Use `bindings` for type variables on either side
    pub fn with_bindings(mut self, bindings: FxHashMap<String, TypeRef>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Check if `source` is assignable to `target` (source ~> target)
    ///
    /// Primitives box to the root type and to unbound type variables; primitives
    /// otherwise only match themselves.
    pub fn is_assignable(&self, source: &TypeRef, target: &TypeRef) -> bool {
        match (source, target) {
            (TypeRef::Var { name, bound }, _) => match self.bindings.get(name) {
                Some(bound_to) => self.is_assignable(bound_to, target),
                None => match bound {
                    Some(bound) => self.is_assignable(bound, target),
                    None => self.is_assignable(&TypeRef::object(), target),
                },
            },

            (_, TypeRef::Var { name, bound }) => match self.bindings.get(name) {
                Some(bound_to) => self.is_assignable(source, bound_to),
                None => match bound {
                    Some(bound) => self.is_assignable(source, bound),
                    None => !source.is_void(),
                },
            },

            (TypeRef::Void, TypeRef::Void) => true,
            (TypeRef::Void, _) | (_, TypeRef::Void) => false,

            (TypeRef::Primitive { primitive: a }, TypeRef::Primitive { primitive: b }) => a == b,
            (TypeRef::Primitive { .. }, TypeRef::Named { name, .. }) => name == OBJECT_TYPE,
            (TypeRef::Named { .. }, TypeRef::Primitive { .. }) => false,

            (TypeRef::Named { name: sub, .. }, TypeRef::Named { name: sup, .. }) => {
                self.subtyping.is_subtype_name(sub, sup)
            }

            (TypeRef::Array { element: a }, TypeRef::Array { element: b }) => {
                if a.is_primitive() || b.is_primitive() {
                    a == b
                } else {
                    self.is_assignable(a, b)
                }
            }
            (TypeRef::Array { .. }, TypeRef::Named { name, .. }) => name == OBJECT_TYPE,
            (_, TypeRef::Array { .. }) => false,
            (TypeRef::Array { .. }, TypeRef::Primitive { .. }) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InMemoryModel, PrimitiveKind, TypeBuilder};

    fn model() -> InMemoryModel {
        InMemoryModel::new()
            .with_library(
                TypeBuilder::class("lang.String")
                    .implements(TypeRef::named("lang.CharSequence"))
                    .build(),
            )
            .with_library(TypeBuilder::interface("lang.CharSequence").build())
    }

    #[test]
    fn test_named_subtype() {
        let model = model();
        let ctx = AssignabilityContext::new(&model);
        assert!(ctx.is_assignable(
            &TypeRef::named("lang.String"),
            &TypeRef::named("lang.CharSequence")
        ));
        assert!(!ctx.is_assignable(
            &TypeRef::named("lang.CharSequence"),
            &TypeRef::named("lang.String")
        ));
    }

    #[test]
    fn test_type_arguments_are_erased() {
        let model = model();
        let ctx = AssignabilityContext::new(&model);
        assert!(ctx.is_assignable(
            &TypeRef::generic("util.List", vec![TypeRef::named("lang.String")]),
            &TypeRef::named("util.List")
        ));
    }

    #[test]
    fn test_bound_variable() {
        let model = model();
        let mut bindings = FxHashMap::default();
        bindings.insert("T".to_string(), TypeRef::named("lang.String"));
        let ctx = AssignabilityContext::new(&model).with_bindings(bindings);
        assert!(ctx.is_assignable(&TypeRef::named("lang.String"), &TypeRef::var("T")));
        assert!(!ctx.is_assignable(&TypeRef::named("lang.Integer"), &TypeRef::var("T")));
    }

    #[test]
    fn test_primitives() {
        let model = model();
        let ctx = AssignabilityContext::new(&model);
        let int = TypeRef::primitive(PrimitiveKind::Int);
        let long = TypeRef::primitive(PrimitiveKind::Long);
        assert!(ctx.is_assignable(&int, &int));
        assert!(!ctx.is_assignable(&int, &long));
        assert!(ctx.is_assignable(&int, &TypeRef::object()));
        assert!(ctx.is_assignable(&int, &TypeRef::var("T")));
        assert!(!ctx.is_assignable(&TypeRef::array(int.clone()), &TypeRef::array(long)));
    }
}
