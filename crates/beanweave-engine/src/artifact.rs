//! Generation artifacts: the descriptions handed to code generation
//!
//! Artifacts are plain data. The engine fills them while visiting a type and
//! never reads them back except to link an interception plan to its definition.

use crate::config::ProxyTargetMode;
use crate::model::{ElementRef, MemberId, Parameter, TypeRef};
use crate::annotations::AnnotationValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Something code generation must emit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "artifact", rename_all = "snake_case")]
pub enum GenerationArtifact {
    BeanDefinition(BeanDefinition),
    InterceptionPlan(InterceptionPlan),
}

impl GenerationArtifact {
    pub fn name(&self) -> &str {
        match self {
            GenerationArtifact::BeanDefinition(d) => &d.name,
            GenerationArtifact::InterceptionPlan(p) => &p.name,
        }
    }

    pub fn as_definition(&self) -> Option<&BeanDefinition> {
        match self {
            GenerationArtifact::BeanDefinition(d) => Some(d),
            GenerationArtifact::InterceptionPlan(_) => None,
        }
    }

    pub fn as_plan(&self) -> Option<&InterceptionPlan> {
        match self {
            GenerationArtifact::InterceptionPlan(p) => Some(p),
            GenerationArtifact::BeanDefinition(_) => None,
        }
    }
}

/// A member the generated code calls or assigns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPoint {
    pub name: String,
    /// Qualified name of the type declaring the member
    pub declaring_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Field type or method return type
    pub ty: TypeRef,
    /// Generated code cannot reach the member directly
    pub requires_reflection: bool,
}

/// The constructor a definition instantiates through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorPoint {
    pub parameters: Vec<Parameter>,
    pub requires_reflection: bool,
}

/// A member receiving a resolved value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuePoint {
    pub point: MemberPoint,
    /// Configuration path or value expression, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A configuration builder exposed as a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderPoint {
    pub point: MemberPoint,
    pub builder_type: TypeRef,
    /// Configuration paths of the builder's setters
    pub paths: Vec<String>,
}

/// How a produced bean is obtained from its factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerKind {
    Method,
    Field,
    Property,
}

/// The factory member producing a bean
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryProducer {
    pub factory_type: String,
    pub member: String,
    pub kind: ProducerKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    pub requires_reflection: bool,
}

/// Description of one injectable bean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeanDefinition {
    /// Name of the generated definition
    pub name: String,
    pub bean_type: TypeRef,
    /// Element the definition was derived from
    pub origin: ElementRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<String>,
    /// Names of all annotations on the bean
    pub annotations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<ConstructorPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<FactoryProducer>,
    pub field_injections: Vec<MemberPoint>,
    pub method_injections: Vec<MemberPoint>,
    pub field_values: Vec<ValuePoint>,
    pub configuration_values: Vec<ValuePoint>,
    pub builder_properties: Vec<BuilderPoint>,
    pub post_construct: Vec<MemberPoint>,
    pub pre_destroy: Vec<MemberPoint>,
    pub executable_methods: Vec<MemberPoint>,
    /// Name of the interception plan proxying this bean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intercepted_by: Option<String>,
}

impl BeanDefinition {
    pub fn new(name: impl Into<String>, bean_type: TypeRef, origin: ElementRef) -> Self {
        BeanDefinition {
            name: name.into(),
            bean_type,
            origin,
            scope: None,
            qualifiers: Vec::new(),
            annotations: Vec::new(),
            constructor: None,
            producer: None,
            field_injections: Vec::new(),
            method_injections: Vec::new(),
            field_values: Vec::new(),
            configuration_values: Vec::new(),
            builder_properties: Vec::new(),
            post_construct: Vec::new(),
            pre_destroy: Vec::new(),
            executable_methods: Vec::new(),
            intercepted_by: None,
        }
    }

    pub fn has_executable(&self, name: &str) -> bool {
        self.executable_methods.iter().any(|p| p.name == name)
    }
}

/// How advice is applied to a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    /// Wraps an existing implementation
    Around,
    /// Supplies an implementation for an abstract method
    Introduction,
}

/// An interceptor applied to a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterceptorBinding {
    /// Annotation naming the interceptor
    pub interceptor: String,
    pub kind: AdviceKind,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, AnnotationValue>,
}

/// The bean method an adapter forwards to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdaptedMethod {
    pub bean_type: String,
    pub method: String,
    pub argument_types: Vec<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

/// A method the generated proxy overrides
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisedMethod {
    pub name: String,
    pub declaring_type: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeRef,
    pub kind: AdviceKind,
    pub bindings: Vec<InterceptorBinding>,
    /// Configuration path an introduced getter resolves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapted: Option<AdaptedMethod>,
}

/// How to fill one constructor argument of a proxied produced type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorFill {
    Null,
    Zero,
}

/// Construction constraints of a proxy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProxyConstraints {
    /// Delegate to a separately resolved target bean
    pub proxy_target: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_mode: Option<ProxyTargetMode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constructor_fills: Vec<ConstructorFill>,
}

/// Description of a generated proxy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterceptionPlan {
    pub name: String,
    /// Definition registered for the proxy itself
    pub definition: BeanDefinition,
    /// Definition of the advised bean, when the proxy wraps one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_definition: Option<String>,
    /// Type the proxy extends or implements
    pub target_type: TypeRef,
    /// The proxy implements abstract methods rather than wrapping a bean
    pub introduction: bool,
    /// Additional interfaces the proxy implements
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    pub advised_methods: Vec<AdvisedMethod>,
    /// Type variable bindings per implemented interface
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub type_arguments: BTreeMap<String, BTreeMap<String, TypeRef>>,
    pub constraints: ProxyConstraints,
}

impl InterceptionPlan {
    pub fn advised(&self, name: &str) -> Option<&AdvisedMethod> {
        self.advised_methods.iter().find(|m| m.name == name)
    }
}

/// Generation responsibility a member was claimed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Responsibility {
    FieldInjection,
    MethodInjection,
    FieldValue,
    ConfigurationValue,
    BuilderProperty,
    LifecycleInit,
    LifecycleDestroy,
    Executable,
    Intercepted,
    FactoryProducer,
    Ignored,
}

/// Which responsibility a member ended up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemberClaim {
    pub member: MemberId,
    pub responsibility: Responsibility,
}
