//! Nominal subtyping over declared types
//!
//! A type is a subtype of another when the latter is reachable through its
//! superclass and interface declarations. Every reference type is a subtype of the
//! root type.

use crate::model::{DeclaredType, ProgramModel, OBJECT_TYPE};
use rustc_hash::FxHashSet;

/// Context for nominal subtype checks
pub struct SubtypingContext<'a> {
    model: &'a dyn ProgramModel,
}

impl<'a> SubtypingContext<'a> {
    pub fn new(model: &'a dyn ProgramModel) -> Self {
        SubtypingContext { model }
    }

    /// Check if the type named `sub` is `sup` or one of its subtypes
    pub fn is_subtype_name(&self, sub: &str, sup: &str) -> bool {
        if sub == sup || sup == OBJECT_TYPE {
            return true;
        }
        match self.model.resolve_type(sub) {
            Some(decl) => self.is_subtype(decl, sup),
            None => false,
        }
    }

    /// Check if `ty` is `sup` or one of its subtypes
    pub fn is_subtype(&self, ty: &DeclaredType, sup: &str) -> bool {
        let mut visited = FxHashSet::default();
        self.walk(ty, sup, &mut visited)
    }

    fn walk(&self, ty: &DeclaredType, sup: &str, visited: &mut FxHashSet<String>) -> bool {
        let name = ty.qualified_name();
        if name == sup || sup == OBJECT_TYPE {
            return true;
        }
        if !visited.insert(name) {
            return false;
        }
        let supertypes = ty.superclass.iter().chain(ty.interfaces.iter());
        for parent in supertypes {
            let Some(parent_name) = parent.name() else {
                continue;
            };
            if parent_name == sup {
                return true;
            }
            if let Some(decl) = self.model.resolve_type(parent_name) {
                if self.walk(decl, sup, visited) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InMemoryModel, TypeBuilder, TypeRef};

    #[test]
    fn test_transitive_interfaces() {
        let model = InMemoryModel::new()
            .with(
                TypeBuilder::class("app.Impl")
                    .extends(TypeRef::named("app.Base"))
                    .build(),
            )
            .with(
                TypeBuilder::class("app.Base")
                    .implements(TypeRef::named("lib.Api"))
                    .build(),
            );
        let ctx = SubtypingContext::new(&model);
        assert!(ctx.is_subtype_name("app.Impl", "lib.Api"));
        assert!(ctx.is_subtype_name("app.Impl", OBJECT_TYPE));
        assert!(!ctx.is_subtype_name("app.Base", "app.Impl"));
        assert!(!ctx.is_subtype_name("unknown.Type", "lib.Api"));
    }

    #[test]
    fn test_cyclic_hierarchy_terminates() {
        let model = InMemoryModel::new()
            .with(TypeBuilder::interface("a.A").implements(TypeRef::named("a.B")).build())
            .with(TypeBuilder::interface("a.B").implements(TypeRef::named("a.A")).build());
        let ctx = SubtypingContext::new(&model);
        assert!(!ctx.is_subtype_name("a.A", "a.C"));
    }
}
