//! In-memory program model and declaration builders

use super::element::{
    Constructor, DeclaredType, FieldDecl, Member, MemberId, MethodDecl, Parameter, PropertyDecl,
    Span, TypeKind, TypeParam,
};
use super::ty::TypeRef;
use super::ProgramModel;
use crate::annotations::AnnotationUse;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors loading a serialized model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Property '{property}' of {type_name} refers to unknown member {id}")]
    UnknownMember {
        type_name: String,
        property: String,
        id: MemberId,
    },
}

/// Model holding a fixed set of types
///
/// The first `unit_len` types are the candidates of the unit; types added with
/// [`InMemoryModel::add_library`] are resolvable but never processed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModel {
    types: Vec<DeclaredType>,
    candidates: Vec<usize>,
    index: FxHashMap<String, usize>,
}

#[derive(Deserialize)]
struct ModelFile {
    #[serde(default)]
    types: Vec<DeclaredType>,
    #[serde(default)]
    library: Vec<DeclaredType>,
}

impl InMemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate type, replacing any type with the same qualified name
    pub fn add(&mut self, ty: DeclaredType) -> &mut Self {
        let idx = self.insert(ty);
        if !self.candidates.contains(&idx) {
            self.candidates.push(idx);
        }
        self
    }

    /// Add a resolvable type that is not itself processed
    pub fn add_library(&mut self, ty: DeclaredType) -> &mut Self {
        self.insert(ty);
        self
    }

    /// Builder-style [`InMemoryModel::add`]
    pub fn with(mut self, ty: DeclaredType) -> Self {
        self.add(ty);
        self
    }

    /// Builder-style [`InMemoryModel::add_library`]
    pub fn with_library(mut self, ty: DeclaredType) -> Self {
        self.add_library(ty);
        self
    }

    fn insert(&mut self, ty: DeclaredType) -> usize {
        let name = ty.qualified_name();
        match self.index.get(&name) {
            Some(&idx) => {
                self.types[idx] = ty;
                idx
            }
            None => {
                self.types.push(ty);
                let idx = self.types.len() - 1;
                self.index.insert(name, idx);
                idx
            }
        }
    }

    /// Load a model from its JSON form: `{"types": [...], "library": [...]}`
    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_str(content)?;
        let mut model = InMemoryModel::new();
        for ty in file.types {
            validate_properties(&ty)?;
            model.add(ty);
        }
        for ty in file.library {
            validate_properties(&ty)?;
            model.add_library(ty);
        }
        Ok(model)
    }

    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn validate_properties(ty: &DeclaredType) -> Result<(), ModelError> {
    for prop in &ty.properties {
        for id in prop.members() {
            if ty.member(id).is_none() {
                return Err(ModelError::UnknownMember {
                    type_name: ty.qualified_name(),
                    property: prop.name.clone(),
                    id,
                });
            }
        }
    }
    Ok(())
}

impl ProgramModel for InMemoryModel {
    fn declared_types(&self) -> Vec<&DeclaredType> {
        self.candidates.iter().map(|&i| &self.types[i]).collect()
    }

    fn resolve_type(&self, qualified_name: &str) -> Option<&DeclaredType> {
        self.index.get(qualified_name).map(|&i| &self.types[i])
    }
}

/// Fluent construction of a [`DeclaredType`]
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    ty: DeclaredType,
}

impl TypeBuilder {
    fn new(qualified_name: &str, kind: TypeKind) -> Self {
        let (package, name) = match qualified_name.rsplit_once('.') {
            Some((package, name)) => (package.to_string(), name.to_string()),
            None => (String::new(), qualified_name.to_string()),
        };
        TypeBuilder {
            ty: DeclaredType {
                name,
                package,
                kind,
                ..DeclaredType::default()
            },
        }
    }

    pub fn class(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeKind::Class)
    }

    pub fn interface(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeKind::Interface)
    }

    pub fn record(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeKind::Record)
    }

    pub fn enumeration(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeKind::Enum)
    }

    pub fn annotation(qualified_name: &str) -> Self {
        Self::new(qualified_name, TypeKind::Annotation)
    }

    pub fn annotated(self, annotation: impl Into<String>) -> Self {
        self.annotated_with(AnnotationUse::new(annotation))
    }

    pub fn annotated_with(mut self, annotation: AnnotationUse) -> Self {
        self.ty.annotations.push(annotation);
        self
    }

    pub fn inherits(mut self, annotation: impl Into<String>) -> Self {
        self.ty
            .inherited_annotations
            .push(AnnotationUse::new(annotation));
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.ty.modifiers.is_abstract = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.ty.modifiers.is_final = true;
        self
    }

    pub fn constructor(mut self, params: Vec<Parameter>) -> Self {
        self.ty.constructor = Some(Constructor::new(params));
        self
    }

    pub fn constructor_with(mut self, constructor: Constructor) -> Self {
        self.ty.constructor = Some(constructor);
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.ty.members.push(Member::Field(field));
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.ty.members.push(Member::Method(method));
        self
    }

    /// Group already added members into a property, looked up by name
    pub fn property(
        mut self,
        name: &str,
        ty: TypeRef,
        read: Option<&str>,
        write: Option<&str>,
        field: Option<&str>,
    ) -> Self {
        let find = |members: &[Member], wanted: &str, is_field: bool| {
            members
                .iter()
                .position(|m| m.name() == wanted && m.as_field().is_some() == is_field)
                .map(MemberId)
        };
        let prop = PropertyDecl {
            name: name.to_string(),
            ty,
            read: read.and_then(|r| find(&self.ty.members, r, false)),
            write: write.and_then(|w| find(&self.ty.members, w, false)),
            field: field.and_then(|f| find(&self.ty.members, f, true)),
        };
        self.ty.properties.push(prop);
        self
    }

    pub fn type_param(mut self, name: &str, bound: Option<TypeRef>) -> Self {
        self.ty.type_params.push(TypeParam {
            name: name.to_string(),
            bound,
        });
        self
    }

    pub fn extends(mut self, superclass: TypeRef) -> Self {
        self.ty.superclass = Some(superclass);
        self
    }

    pub fn implements(mut self, interface: TypeRef) -> Self {
        self.ty.interfaces.push(interface);
        self
    }

    pub fn nested_in(mut self, enclosing: &str) -> Self {
        self.ty.enclosing = Some(enclosing.to_string());
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.ty.span = Some(span);
        self
    }

    pub fn build(self) -> DeclaredType {
        self.ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_add_replaces_same_name() {
        let mut model = InMemoryModel::new();
        model.add(TypeBuilder::class("app.Foo").build());
        model.add(TypeBuilder::class("app.Foo").with_final().build());
        assert_eq!(model.len(), 1);
        assert_eq!(model.declared_types().len(), 1);
        assert!(model.resolve_type("app.Foo").unwrap().is_final());
    }

    #[test]
    fn test_library_types_are_not_candidates() {
        let model = InMemoryModel::new()
            .with(TypeBuilder::class("app.Foo").build())
            .with_library(TypeBuilder::interface("lib.Api").build());
        assert_eq!(model.declared_types().len(), 1);
        assert!(model.resolve_type("lib.Api").is_some());
    }

    #[test]
    fn test_property_resolves_members() {
        let ty = TypeBuilder::class("app.Conf")
            .field(FieldDecl::new("port", TypeRef::named("lang.Integer")).private())
            .method(MethodDecl::new("getPort").returns(TypeRef::named("lang.Integer")))
            .method(MethodDecl::new("setPort").param("port", TypeRef::named("lang.Integer")))
            .property(
                "port",
                TypeRef::named("lang.Integer"),
                Some("getPort"),
                Some("setPort"),
                Some("port"),
            )
            .build();
        let prop = &ty.properties[0];
        assert_eq!(prop.field, Some(MemberId(0)));
        assert_eq!(prop.read, Some(MemberId(1)));
        assert_eq!(prop.write, Some(MemberId(2)));
    }

    #[test]
    fn test_from_json_rejects_dangling_property() {
        let json = r#"{"types":[{"name":"Foo","package":"app","properties":[
            {"name":"x","ty":{"kind":"void"},"read":3}]}]}"#;
        let err = InMemoryModel::from_json(json).unwrap_err();
        assert!(matches!(err, ModelError::UnknownMember { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"types":[{{"name":"Foo","package":"app","annotations":[{{"name":"inject.Singleton"}}]}}]}}"#
        )
        .unwrap();
        let model = InMemoryModel::from_file(file.path()).unwrap();
        let foo = model.resolve_type("app.Foo").unwrap();
        assert_eq!(foo.annotations[0].name, "inject.Singleton");
    }
}
