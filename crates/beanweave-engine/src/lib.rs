//! Beanweave Engine
//!
//! Compile-time dependency injection and AOP classification:
//! - **Model**: the declared types of a program, supplied by a front end (`model` module)
//! - **Annotations**: stereotype resolution over meta-annotations (`annotations` module)
//! - **Classify**: strategy selection, member rules, interception plans, adapters,
//!   factory producers and configuration paths (`classify` module)
//! - **Driver**: per-unit processing and diagnostics (`driver`, `diagnostic` modules)
//!
//! # Example
//!
//! ```rust,ignore
//! use beanweave_engine::{InMemoryModel, ProcessingContext, ProcessorConfig};
//!
//! let model = InMemoryModel::from_file(Path::new("unit.json"))?;
//! let config = ProcessorConfig::from_file(Path::new("beanweave.toml"))?;
//!
//! let unit = ProcessingContext::new(&model, &config).process_unit();
//! for artifact in unit.artifacts() {
//!     println!("{}", artifact.name());
//! }
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Program model: declared types, members and type references
pub mod model;

/// Annotation metadata and stereotype resolution
pub mod annotations;

/// Subtyping and assignability of type references
pub mod types;

/// Strategy and member classification
pub mod classify;

/// Generation artifacts handed to code generation
pub mod artifact;

/// Processor configuration
pub mod config;

/// Processing errors and warnings
pub mod error;

/// Terminal and JSON diagnostics
pub mod diagnostic;

/// Compilation-unit driver
pub mod driver;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    DeclaredType, ElementKind, ElementRef, FieldDecl, InMemoryModel, Member, MemberId,
    MethodDecl, ModelError, Parameter, ProgramModel, PropertyDecl, TypeBuilder, TypeRef,
};

pub use annotations::{AnnotationMetadata, AnnotationUse, AnnotationValue, MetadataResolver};

pub use classify::{
    kebab_case, merge_factory_metadata, resolve_bindings, AdapterMatch, AdapterMatcher,
    ConfigurationMetadata, ConfigurationProperty, Strategy, StrategyClassifier, TypeOutput,
};

pub use artifact::{
    AdviceKind, BeanDefinition, GenerationArtifact, InterceptionPlan, InterceptorBinding,
    MemberClaim, Responsibility,
};

pub use config::{ConfigError, Markers, ProcessorConfig, ProxyTargetMode};

pub use error::{ErrorCategory, ProcessingError, ProcessingWarning};

pub use diagnostic::{Diagnostic, ErrorCode};

pub use driver::{ProcessingContext, UnitOutput};
