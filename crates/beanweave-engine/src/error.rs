//! Errors and warnings reported while processing a type
//!
//! Every error names the offending element. Processing of a type stops at its
//! first error; warnings accumulate alongside the produced artifacts.

use crate::model::ElementRef;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Family an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The type cannot be a bean at all
    Structural,
    /// A member cannot be reached by generated code
    Accessibility,
    /// Advice cannot be applied
    Aop,
    /// An adapter method does not fit its target interface
    Adapter,
    /// A factory producer is invalid
    Factory,
}

/// What kind of produced type an unsupported factory feature was applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducedKind {
    Array,
    Primitive,
}

impl fmt::Display for ProducedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProducedKind::Array => write!(f, "array"),
            ProducedKind::Primitive => write!(f, "primitive"),
        }
    }
}

/// Processing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    // ------------------------------------------------------------------
    // Structural
    // ------------------------------------------------------------------
    /// Type declared in the default package
    #[error("Beans cannot be defined in the default package: {element}")]
    DefaultPackage { element: ElementRef },

    /// Enum declared as a bean
    #[error("Enum types cannot be defined as beans: {element}")]
    EnumBean { element: ElementRef },

    /// Singleton marker from the wrong namespace
    #[error("Type {element} is annotated with {found} instead of {expected}. Use {expected} to define a singleton bean")]
    ForeignSingleton {
        element: ElementRef,
        found: String,
        expected: String,
    },

    /// A referenced type is not part of the program model
    #[error("Cannot resolve type {name} referenced by {element}")]
    UnresolvedType { element: ElementRef, name: String },

    /// Non-getter method on a configuration-properties interface
    #[error("Only getter methods are allowed on configuration-properties interfaces: {element}")]
    InvalidConfigurationMethod { element: ElementRef },

    // ------------------------------------------------------------------
    // Accessibility
    // ------------------------------------------------------------------
    /// Static method without an explicit executable marker
    #[error("Static methods only support {executable}: {element}")]
    StaticMemberNotExecutable {
        element: ElementRef,
        executable: String,
    },

    /// Static method that cannot be called directly
    #[error("Method {element} is not accessible for the invocation. To invoke the method using reflection annotate it with {reflective}")]
    InaccessibleMember {
        element: ElementRef,
        reflective: String,
    },

    /// Executable method that cannot be called directly
    #[error("Method {element} is annotated as executable but is declared private. To invoke the method using reflection annotate it with {reflective}")]
    PrivateExecutable {
        element: ElementRef,
        reflective: String,
    },

    /// Injection point needing reflection without the reflective-access marker
    #[error("Injection point {element} requires reflective access but is not annotated with {reflective}")]
    ReflectionNotPermitted {
        element: ElementRef,
        reflective: String,
    },

    // ------------------------------------------------------------------
    // AOP
    // ------------------------------------------------------------------
    /// Advice on a final class
    #[error("Cannot apply AOP advice to final class. Class must be made non-final to support proxying: {element}")]
    FinalClassAdvised { element: ElementRef },

    /// Advice declared directly on a final method
    #[error("Method {element} defines AOP advice but is declared final. Change the method to be non-final in order for AOP advice to be applied")]
    FinalMethodAdvised { element: ElementRef },

    /// Final public method on a proxied class
    #[error("Public method {element} inherits AOP advice but is declared final. Either make the method non-public or apply AOP advice only to public methods declared on the class")]
    FinalMethodInheritsAdvice { element: ElementRef },

    /// Advice on a private method
    #[error("Method {element} defines AOP advice but is declared private. Change the method to be non-private in order for AOP advice to be applied")]
    PrivateMethodAdvised { element: ElementRef },

    /// Advice on a static method
    #[error("Method {element} defines AOP advice but is declared static")]
    StaticMethodAdvised { element: ElementRef },

    // ------------------------------------------------------------------
    // Adapter
    // ------------------------------------------------------------------
    /// Adapter target is a class
    #[error("Adapter target {target} of {element} must be an interface")]
    AdapterTargetNotInterface { element: ElementRef, target: String },

    /// Adapter target does not have exactly one abstract method
    #[error("Interface {target} to adapt by {element} is not a SAM type: {}", sam_problem(.found))]
    NotSamType {
        element: ElementRef,
        target: String,
        found: usize,
    },

    /// Parameter counts differ
    #[error("Cannot adapt method [{source_method}] to target method [{target_method}]. Argument lengths don't match")]
    AdapterArityMismatch {
        element: ElementRef,
        source_method: String,
        target_method: String,
    },

    /// A source parameter does not accept the target argument
    #[error("Cannot adapt method [{source_method}] to target method [{target_method}]. Type [{actual}] at position {position} is not a subtype of [{expected}]")]
    AdapterTypeMismatch {
        element: ElementRef,
        source_method: String,
        target_method: String,
        position: usize,
        actual: String,
        expected: String,
    },

    /// Coroutine-style adapter method
    #[error("Suspend methods cannot be adapted: {element}")]
    SuspendAdapter { element: ElementRef },

    // ------------------------------------------------------------------
    // Factory
    // ------------------------------------------------------------------
    /// Executable marker on an array or primitive producer
    #[error("Executable not allowed on {kind} type beans: {element}")]
    ExecutableOnUnsupportedType {
        element: ElementRef,
        kind: ProducedKind,
    },

    /// Pre-destroy attribute on an array or primitive producer
    #[error("PreDestroy not allowed on {kind} type beans: {element}")]
    PreDestroyOnUnsupportedType {
        element: ElementRef,
        kind: ProducedKind,
    },

    /// Advice on an array or primitive producer
    #[error("AOP advice not allowed on {kind} type beans: {element}")]
    AopOnUnsupportedType {
        element: ElementRef,
        kind: ProducedKind,
    },

    /// Advised produced type has constructor parameters and proxy target mode is `error`
    #[error("The produced type {produced} of {element} defines a constructor with arguments and cannot be proxied. Set the proxy target mode to allow or warn to construct the proxy with empty arguments")]
    UnproxyableConstructor { element: ElementRef, produced: String },

    /// Producer field is private
    #[error("Beans produced from fields cannot be private: {element}")]
    PrivateProducerField { element: ElementRef },

    /// Named pre-destroy method is not on the produced type
    #[error("Method {method} specified by preDestroy does not exist on type {produced}: {element}")]
    MissingPreDestroyMethod {
        element: ElementRef,
        method: String,
        produced: String,
    },
}

fn sam_problem(found: &usize) -> &'static str {
    if *found == 0 {
        "no abstract methods found"
    } else {
        "more than one abstract method declared"
    }
}

impl ProcessingError {
    /// The offending element
    pub fn element(&self) -> &ElementRef {
        use ProcessingError::*;

        match self {
            DefaultPackage { element }
            | EnumBean { element }
            | ForeignSingleton { element, .. }
            | UnresolvedType { element, .. }
            | InvalidConfigurationMethod { element }
            | StaticMemberNotExecutable { element, .. }
            | InaccessibleMember { element, .. }
            | PrivateExecutable { element, .. }
            | ReflectionNotPermitted { element, .. }
            | FinalClassAdvised { element }
            | FinalMethodAdvised { element }
            | FinalMethodInheritsAdvice { element }
            | PrivateMethodAdvised { element }
            | StaticMethodAdvised { element }
            | AdapterTargetNotInterface { element, .. }
            | NotSamType { element, .. }
            | AdapterArityMismatch { element, .. }
            | AdapterTypeMismatch { element, .. }
            | SuspendAdapter { element }
            | ExecutableOnUnsupportedType { element, .. }
            | PreDestroyOnUnsupportedType { element, .. }
            | AopOnUnsupportedType { element, .. }
            | UnproxyableConstructor { element, .. }
            | PrivateProducerField { element }
            | MissingPreDestroyMethod { element, .. } => element,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        use ProcessingError::*;

        match self {
            DefaultPackage { .. }
            | EnumBean { .. }
            | ForeignSingleton { .. }
            | UnresolvedType { .. }
            | InvalidConfigurationMethod { .. } => ErrorCategory::Structural,
            StaticMemberNotExecutable { .. }
            | InaccessibleMember { .. }
            | PrivateExecutable { .. }
            | ReflectionNotPermitted { .. } => ErrorCategory::Accessibility,
            FinalClassAdvised { .. }
            | FinalMethodAdvised { .. }
            | FinalMethodInheritsAdvice { .. }
            | PrivateMethodAdvised { .. }
            | StaticMethodAdvised { .. } => ErrorCategory::Aop,
            AdapterTargetNotInterface { .. }
            | NotSamType { .. }
            | AdapterArityMismatch { .. }
            | AdapterTypeMismatch { .. }
            | SuspendAdapter { .. } => ErrorCategory::Adapter,
            ExecutableOnUnsupportedType { .. }
            | PreDestroyOnUnsupportedType { .. }
            | AopOnUnsupportedType { .. }
            | UnproxyableConstructor { .. }
            | PrivateProducerField { .. }
            | MissingPreDestroyMethod { .. } => ErrorCategory::Factory,
        }
    }
}

/// Processing warnings
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ProcessingWarning {
    /// Advised produced type will be constructed with null/zero arguments
    #[error("The produced type {produced} of {element} defines a constructor with arguments. The proxy will be constructed with empty arguments")]
    ProxiedWithEmptyArguments { element: ElementRef, produced: String },
}

impl ProcessingWarning {
    pub fn element(&self) -> &ElementRef {
        match self {
            ProcessingWarning::ProxiedWithEmptyArguments { element, .. } => element,
        }
    }
}
