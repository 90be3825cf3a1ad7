//! Shared fixtures: the framework annotations every test unit resolves against

#![allow(dead_code)]

use beanweave_engine::config::names;
use beanweave_engine::model::{InMemoryModel, MethodDecl, TypeBuilder, TypeRef};
use beanweave_engine::{
    AnnotationUse, DeclaredType, ProcessingContext, ProcessingError, ProcessorConfig, ProgramModel,
    TypeOutput,
};

pub const LOGGED: &str = "app.Logged";
pub const TIMED: &str = "app.Timed";
pub const CLIENT: &str = "app.HttpClient";
pub const PRIMARY: &str = "app.Primary";
pub const PROTOTYPE: &str = "app.Prototype";

/// Framework annotations and a few library types
pub fn framework() -> InMemoryModel {
    InMemoryModel::new()
        .with_library(TypeBuilder::annotation(names::SINGLETON).annotated(names::SCOPE).build())
        .with_library(TypeBuilder::annotation(PROTOTYPE).annotated(names::SCOPE).build())
        .with_library(TypeBuilder::annotation(names::NAMED).annotated(names::QUALIFIER).build())
        .with_library(TypeBuilder::annotation(PRIMARY).annotated(names::QUALIFIER).build())
        .with_library(
            TypeBuilder::annotation(names::EACH_PROPERTY)
                .annotated(names::CONFIGURATION_READER)
                .build(),
        )
        .with_library(TypeBuilder::annotation(LOGGED).annotated(names::AROUND).build())
        .with_library(TypeBuilder::annotation(TIMED).annotated(names::AROUND).build())
        .with_library(TypeBuilder::annotation(CLIENT).annotated(names::INTRODUCTION).build())
        .with_library(TypeBuilder::class("lang.String").with_final().build())
        .with_library(
            TypeBuilder::interface("event.Listener")
                .type_param("E", None)
                .method(MethodDecl::new("onEvent").param("event", TypeRef::var("E")))
                .build(),
        )
        .with_library(TypeBuilder::class("event.Startup").build())
        .with_library(TypeBuilder::class("event.Shutdown").build())
}

pub fn string() -> TypeRef {
    TypeRef::named("lang.String")
}

pub fn adapter(target: &str) -> AnnotationUse {
    AnnotationUse::new(names::ADAPTER).with("value", target)
}

pub fn process_with(
    model: &InMemoryModel,
    config: &ProcessorConfig,
    name: &str,
) -> Result<TypeOutput, ProcessingError> {
    let ty: &DeclaredType = model.resolve_type(name).expect("type in model");
    ProcessingContext::new(model, config).process_type(ty)
}

pub fn process(model: &InMemoryModel, name: &str) -> Result<TypeOutput, ProcessingError> {
    process_with(model, &ProcessorConfig::default(), name)
}
