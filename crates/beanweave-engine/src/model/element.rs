//! Declared program elements: types, members, properties
//!
//! These are the read-only views the front end hands to the engine. Members of a
//! type are addressed by [`MemberId`], their index in [`DeclaredType::members`].

use super::ty::TypeRef;
use crate::annotations::AnnotationUse;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// File id within the host's file database
    pub file_id: usize,
    /// Byte offset of the first character
    pub start: u32,
    /// Byte offset one past the last character
    pub end: u32,
}

impl Span {
    pub fn new(file_id: usize, start: u32, end: u32) -> Self {
        Span {
            file_id,
            start,
            end,
        }
    }
}

/// Declared visibility of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    PackagePrivate,
    Private,
}

/// Modifier flags of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_static: bool,
}

impl Modifiers {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn is_package_private(&self) -> bool {
        self.visibility == Visibility::PackagePrivate
    }
}

/// Kind of declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Record,
    Enum,
    Annotation,
}

/// A declared type parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<TypeRef>,
}

/// A method or constructor parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationUse>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Parameter {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(AnnotationUse::new(annotation));
        self
    }
}

/// The constructor the container uses to instantiate a type
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Constructor {
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub span: Option<Span>,
}

impl Constructor {
    pub fn new(params: Vec<Parameter>) -> Self {
        Constructor {
            params,
            ..Constructor::default()
        }
    }
}

/// A field declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    /// Annotations inherited from overridden declarations
    #[serde(default)]
    pub inherited_annotations: Vec<AnnotationUse>,
    /// Qualified name of the declaring type when inherited from a supertype
    #[serde(default)]
    pub declaring_type: Option<String>,
    #[serde(default)]
    pub span: Option<Span>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        FieldDecl {
            name: name.into(),
            ty,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            inherited_annotations: Vec::new(),
            declaring_type: None,
            span: None,
        }
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(AnnotationUse::new(annotation));
        self
    }

    pub fn annotated_with(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.modifiers.visibility = visibility;
        self
    }

    pub fn private(self) -> Self {
        self.with_visibility(Visibility::Private)
    }

    pub fn with_static(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.modifiers.is_final = true;
        self
    }

    pub fn declared_in(mut self, type_name: impl Into<String>) -> Self {
        self.declaring_type = Some(type_name.into());
        self
    }
}

/// A method declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default = "void_type")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    /// Annotations inherited from overridden declarations
    #[serde(default)]
    pub inherited_annotations: Vec<AnnotationUse>,
    /// Qualified name of the declaring type when inherited from a supertype
    #[serde(default)]
    pub declaring_type: Option<String>,
    /// Interface method with a body
    #[serde(default)]
    pub is_default: bool,
    /// Coroutine-style method taking a trailing continuation
    #[serde(default)]
    pub is_suspend: bool,
    /// Compiler-generated bridge or accessor
    #[serde(default)]
    pub is_synthetic: bool,
    #[serde(default)]
    pub span: Option<Span>,
}

fn void_type() -> TypeRef {
    TypeRef::Void
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        MethodDecl {
            name: name.into(),
            params: Vec::new(),
            return_type: TypeRef::Void,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            inherited_annotations: Vec::new(),
            declaring_type: None,
            is_default: false,
            is_suspend: false,
            is_synthetic: false,
            span: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(Parameter::new(name, ty));
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(AnnotationUse::new(annotation));
        self
    }

    pub fn annotated_with(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn inherits(mut self, annotation: impl Into<String>) -> Self {
        self.inherited_annotations.push(AnnotationUse::new(annotation));
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.modifiers.visibility = visibility;
        self
    }

    pub fn private(self) -> Self {
        self.with_visibility(Visibility::Private)
    }

    pub fn with_static(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.modifiers.is_final = true;
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.modifiers.is_abstract = true;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_suspend(mut self) -> Self {
        self.is_suspend = true;
        self
    }

    pub fn with_synthetic(mut self) -> Self {
        self.is_synthetic = true;
        self
    }

    pub fn declared_in(mut self, type_name: impl Into<String>) -> Self {
        self.declaring_type = Some(type_name.into());
        self
    }

    /// `name(T1, T2)` form used in messages
    pub fn description(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// A field or method of a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Field(f) => &f.name,
            Member::Method(m) => &m.name,
        }
    }

    pub fn modifiers(&self) -> &Modifiers {
        match self {
            Member::Field(f) => &f.modifiers,
            Member::Method(m) => &m.modifiers,
        }
    }

    pub fn annotations(&self) -> &[AnnotationUse] {
        match self {
            Member::Field(f) => &f.annotations,
            Member::Method(m) => &m.annotations,
        }
    }

    pub fn inherited_annotations(&self) -> &[AnnotationUse] {
        match self {
            Member::Field(f) => &f.inherited_annotations,
            Member::Method(m) => &m.inherited_annotations,
        }
    }

    pub fn declaring_type(&self) -> Option<&str> {
        match self {
            Member::Field(f) => f.declaring_type.as_deref(),
            Member::Method(m) => m.declaring_type.as_deref(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Member::Field(f) => f.span,
            Member::Method(m) => m.span,
        }
    }

    pub fn as_field(&self) -> Option<&FieldDecl> {
        match self {
            Member::Field(f) => Some(f),
            Member::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodDecl> {
        match self {
            Member::Method(m) => Some(m),
            Member::Field(_) => None,
        }
    }
}

/// Index of a member within its declaring type's member list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub usize);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A bean property grouping a backing field and its accessors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub read: Option<MemberId>,
    #[serde(default)]
    pub write: Option<MemberId>,
    #[serde(default)]
    pub field: Option<MemberId>,
}

impl PropertyDecl {
    /// Members consumed by this property
    pub fn members(&self) -> impl Iterator<Item = MemberId> + '_ {
        [self.write, self.read, self.field].into_iter().flatten()
    }
}

/// A type declared in the compilation unit (or resolvable from it)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclaredType {
    /// Simple name
    pub name: String,
    /// Package, empty for the default package
    pub package: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationUse>,
    /// Annotations inherited from supertypes
    pub inherited_annotations: Vec<AnnotationUse>,
    pub constructor: Option<Constructor>,
    pub members: Vec<Member>,
    pub properties: Vec<PropertyDecl>,
    pub type_params: Vec<TypeParam>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    /// Qualified name of the enclosing type for nested types
    pub enclosing: Option<String>,
    pub span: Option<Span>,
}

impl DeclaredType {
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    /// Abstract classes and interfaces
    pub fn is_abstract(&self) -> bool {
        self.modifiers.is_abstract || self.is_interface()
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.is_final
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(id.0)
    }

    pub fn method(&self, id: MemberId) -> Option<&MethodDecl> {
        self.member(id).and_then(Member::as_method)
    }

    pub fn field(&self, id: MemberId) -> Option<&FieldDecl> {
        self.member(id).and_then(Member::as_field)
    }

    /// Methods with their ids, in declaration order
    pub fn methods(&self) -> impl Iterator<Item = (MemberId, &MethodDecl)> {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.as_method().map(|m| (MemberId(i), m)))
    }

    /// Whether `method` has no body in this type
    pub fn is_abstract_method(&self, method: &MethodDecl) -> bool {
        method.modifiers.is_abstract
            || (self.is_interface() && !method.is_default && !method.modifiers.is_static)
    }

    /// Whether a member was declared by this type rather than inherited
    pub fn declares(&self, declaring_type: Option<&str>) -> bool {
        match declaring_type {
            None => true,
            Some(name) => name == self.qualified_name(),
        }
    }

    pub fn element_ref(&self) -> ElementRef {
        ElementRef {
            kind: ElementKind::Type,
            type_name: self.qualified_name(),
            member: None,
            span: self.span,
        }
    }

    pub fn member_ref(&self, id: MemberId) -> ElementRef {
        match self.member(id) {
            Some(member) => ElementRef {
                kind: match member {
                    Member::Field(_) => ElementKind::Field,
                    Member::Method(_) => ElementKind::Method,
                },
                type_name: self.qualified_name(),
                member: Some(match member {
                    Member::Field(f) => f.name.clone(),
                    Member::Method(m) => m.description(),
                }),
                span: member.span().or(self.span),
            },
            None => self.element_ref(),
        }
    }

    pub fn constructor_ref(&self) -> ElementRef {
        ElementRef {
            kind: ElementKind::Constructor,
            type_name: self.qualified_name(),
            member: Some("<init>".to_string()),
            span: self.constructor.as_ref().and_then(|c| c.span).or(self.span),
        }
    }
}

/// Kind of element a diagnostic points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Type,
    Constructor,
    Field,
    Method,
    Property,
}

/// Reference to the offending element of an error or warning
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub type_name: String,
    pub member: Option<String>,
    pub span: Option<Span>,
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}#{}", self.type_name, member),
            None => write!(f, "{}", self.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_default_package() {
        let ty = DeclaredType {
            name: "Foo".to_string(),
            ..DeclaredType::default()
        };
        assert_eq!(ty.qualified_name(), "Foo");
    }

    #[test]
    fn test_interface_methods_are_abstract_unless_default() {
        let ty = DeclaredType {
            name: "Api".to_string(),
            package: "app".to_string(),
            kind: TypeKind::Interface,
            ..DeclaredType::default()
        };
        assert!(ty.is_abstract_method(&MethodDecl::new("call")));
        assert!(!ty.is_abstract_method(&MethodDecl::new("call").with_default()));
        assert!(!ty.is_abstract_method(&MethodDecl::new("of").with_static()));
    }

    #[test]
    fn test_member_ref_display() {
        let ty = DeclaredType {
            name: "Foo".to_string(),
            package: "app".to_string(),
            members: vec![Member::Method(
                MethodDecl::new("run").param("n", TypeRef::named("lang.String")),
            )],
            ..DeclaredType::default()
        };
        assert_eq!(ty.member_ref(MemberId(0)).to_string(), "app.Foo#run(lang.String)");
    }
}
