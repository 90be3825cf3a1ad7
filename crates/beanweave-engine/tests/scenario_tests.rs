//! End-to-end classification scenarios
//!
//! Each test builds a small compilation unit, processes one type and checks the
//! artifacts handed to code generation.

mod common;

use beanweave_engine::config::names;
use beanweave_engine::model::{FieldDecl, MethodDecl, Parameter, PrimitiveKind, TypeBuilder, TypeRef};
use beanweave_engine::{
    AdviceKind, AnnotationUse, MemberId, ProcessingError, Responsibility, Strategy,
};
use common::{adapter, framework, process, string, CLIENT, LOGGED};

fn greeter(advised: bool) -> TypeBuilder {
    let mut builder = TypeBuilder::class("app.Greeter").annotated(names::SINGLETON);
    if advised {
        builder = builder.annotated(LOGGED);
    }
    builder
        .constructor(vec![Parameter::new("repo", TypeRef::named("app.Repo"))])
        .field(FieldDecl::new("clock", TypeRef::named("app.Clock")).annotated(names::INJECT))
        .method(MethodDecl::new("greet").param("name", string()).returns(string()))
}

// ============================================================================
// Scenario A: plain declared bean
// ============================================================================

#[test]
fn test_declared_bean_with_constructor_and_field() {
    let model = framework().with(greeter(false).build());
    let output = process(&model, "app.Greeter").unwrap();

    assert_eq!(output.strategy, Strategy::DeclaredBean { is_aop_proxy: false });
    assert_eq!(output.artifacts.len(), 1);

    let definition = output.bean_definition().unwrap();
    assert_eq!(definition.name, "app.$Greeter$Definition");
    assert_eq!(definition.scope.as_deref(), Some(names::SINGLETON));
    assert_eq!(definition.constructor.as_ref().unwrap().parameters.len(), 1);
    assert_eq!(definition.field_injections.len(), 1);
    assert_eq!(definition.field_injections[0].name, "clock");
    assert!(!definition.field_injections[0].requires_reflection);
    assert!(definition.intercepted_by.is_none());

    assert_eq!(output.claim(MemberId(0)), Some(Responsibility::FieldInjection));
    assert_eq!(output.claim(MemberId(1)), Some(Responsibility::Ignored));
}

// ============================================================================
// Scenario B: declared bean with class-level around advice
// ============================================================================

#[test]
fn test_class_level_advice_links_plan() {
    let model = framework().with(greeter(true).build());
    let output = process(&model, "app.Greeter").unwrap();

    assert_eq!(output.strategy, Strategy::DeclaredBean { is_aop_proxy: true });
    assert_eq!(output.artifacts.len(), 2);

    let definition = output.bean_definition().unwrap();
    let plan = output.interception_plan().unwrap();
    assert_eq!(plan.name, "app.$Greeter$Definition$Intercepted");
    assert_eq!(plan.super_definition.as_deref(), Some(definition.name.as_str()));
    assert_eq!(definition.intercepted_by.as_deref(), Some(plan.name.as_str()));
    assert_eq!(plan.definition.constructor, definition.constructor);
    assert!(!plan.introduction);

    let greet = plan.advised("greet").unwrap();
    assert_eq!(greet.kind, AdviceKind::Around);
    assert_eq!(greet.bindings.len(), 1);
    assert_eq!(greet.bindings[0].interceptor, LOGGED);
    assert_eq!(output.claim(MemberId(1)), Some(Responsibility::Intercepted));
}

// ============================================================================
// Scenario C: introduction interface
// ============================================================================

#[test]
fn test_introduction_interface_implements_abstract_methods() {
    let client = TypeBuilder::interface("app.PetClient")
        .annotated(CLIENT)
        .method(MethodDecl::new("get").param("id", string()).returns(string()))
        .method(
            MethodDecl::new("save")
                .param("id", string())
                .param("body", string()),
        )
        .build();
    let model = framework().with(client);
    let output = process(&model, "app.PetClient").unwrap();

    assert_eq!(output.strategy, Strategy::IntroductionInterface);
    assert!(output.bean_definition().is_none());

    let plan = output.interception_plan().unwrap();
    assert!(plan.introduction);
    assert!(plan.super_definition.is_none());
    assert!(plan.definition.constructor.is_none());
    assert_eq!(plan.advised_methods.len(), 2);
    for method in &plan.advised_methods {
        assert_eq!(method.kind, AdviceKind::Introduction);
        assert_eq!(method.bindings[0].interceptor, CLIENT);
        assert_eq!(method.bindings[0].kind, AdviceKind::Introduction);
    }
    assert!(output
        .claims
        .iter()
        .all(|c| c.responsibility == Responsibility::Intercepted));
}

// ============================================================================
// Scenario D: executable factory method producing an array
// ============================================================================

#[test]
fn test_executable_array_producer_rejected() {
    let factory = TypeBuilder::class("app.NamesFactory")
        .annotated(names::FACTORY)
        .method(
            MethodDecl::new("names")
                .annotated(names::BEAN)
                .annotated(names::EXECUTABLE)
                .returns(TypeRef::array(string())),
        )
        .build();
    let model = framework().with(factory);
    let err = process(&model, "app.NamesFactory").unwrap_err();

    assert!(matches!(err, ProcessingError::ExecutableOnUnsupportedType { .. }));
    assert!(err
        .to_string()
        .contains("Executable not allowed on array type beans"));
    assert_eq!(err.element().member.as_deref(), Some("names()"));
}

// ============================================================================
// Scenario E: adapter with mismatched arity
// ============================================================================

#[test]
fn test_adapter_arity_mismatch() {
    let handler = TypeBuilder::interface("event.Handler")
        .method(
            MethodDecl::new("handle")
                .param("event", TypeRef::named("event.Startup"))
                .param("source", string())
                .param("attempt", TypeRef::primitive(PrimitiveKind::Int)),
        )
        .build();
    let bean = TypeBuilder::class("app.Events")
        .annotated(names::SINGLETON)
        .method(
            MethodDecl::new("onStartup")
                .annotated_with(adapter("event.Handler"))
                .param("event", TypeRef::named("event.Startup"))
                .param("source", string()),
        )
        .build();
    let model = framework().with_library(handler).with(bean);
    let err = process(&model, "app.Events").unwrap_err();

    assert!(matches!(err, ProcessingError::AdapterArityMismatch { .. }));
    assert!(err.to_string().contains("Argument lengths don't match"));
}

#[test]
fn test_adapter_produces_plan() {
    let bean = TypeBuilder::class("app.Events")
        .annotated(names::SINGLETON)
        .annotated_with(AnnotationUse::new(names::NAMED).with("value", "events"))
        .method(
            MethodDecl::new("onStartup")
                .annotated_with(adapter("event.Listener"))
                .param("event", TypeRef::named("event.Startup")),
        )
        .build();
    let model = framework().with(bean);
    let output = process(&model, "app.Events").unwrap();

    assert_eq!(output.artifacts.len(), 2);
    let plan = output.artifacts[1].as_plan().unwrap();
    assert_eq!(plan.name, "app.$Events$Listener$onStartup1$Definition$Intercepted");
    assert_eq!(plan.interfaces, vec!["event.Listener".to_string()]);
    assert_eq!(
        plan.type_arguments["event.Listener"]["E"],
        TypeRef::named("event.Startup")
    );

    let method = plan.advised("onEvent").unwrap();
    assert_eq!(method.parameters[0].ty, TypeRef::named("event.Startup"));
    let adapted = method.adapted.as_ref().unwrap();
    assert_eq!(adapted.bean_type, "app.Events");
    assert_eq!(adapted.method, "onStartup");
    assert_eq!(adapted.qualifier.as_deref(), Some("events"));

    // the adapter method itself is not claimed by the adapter
    assert_eq!(output.claim(MemberId(0)), Some(Responsibility::Ignored));
}
