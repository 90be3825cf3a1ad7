//! Factory producers and propagation of metadata onto produced beans

mod common;

use beanweave_engine::artifact::{ConstructorFill, ProducerKind};
use beanweave_engine::config::names;
use beanweave_engine::model::{FieldDecl, MethodDecl, Parameter, PrimitiveKind, TypeBuilder, TypeRef};
use beanweave_engine::{
    AnnotationUse, InMemoryModel, MemberId, ProcessingError, ProcessingWarning, ProcessorConfig,
    ProxyTargetMode, Responsibility, Strategy,
};
use common::{framework, process, process_with, string, LOGGED, PRIMARY, PROTOTYPE};

fn pool_type(constructor: Vec<Parameter>) -> TypeBuilder {
    TypeBuilder::class("app.Pool")
        .constructor(constructor)
        .method(MethodDecl::new("acquire").returns(string()))
        .method(MethodDecl::new("close"))
        .method(MethodDecl::new("size").returns(TypeRef::primitive(PrimitiveKind::Int)).with_final())
        .method(MethodDecl::new("create").with_static())
}

fn factory_with(producer: MethodDecl, pool: TypeBuilder) -> InMemoryModel {
    framework().with_library(pool.build()).with(
        TypeBuilder::class("app.PoolFactory")
            .annotated(names::FACTORY)
            .method(producer)
            .build(),
    )
}

fn pool_method() -> MethodDecl {
    pool_method_with(AnnotationUse::new(names::BEAN))
}

fn pool_method_with(bean: AnnotationUse) -> MethodDecl {
    MethodDecl::new("pool")
        .annotated_with(bean)
        .returns(TypeRef::named("app.Pool"))
}

// ============================================================================
// Produced definitions
// ============================================================================

#[test]
fn test_method_producer_definition() {
    let model = factory_with(pool_method().annotated(names::SINGLETON), pool_type(vec![]));
    let output = process(&model, "app.PoolFactory").unwrap();

    assert_eq!(output.strategy, Strategy::Factory { is_aop_proxy: false });
    assert_eq!(output.artifacts.len(), 2);
    assert_eq!(output.artifacts[0].name(), "app.$PoolFactory$Definition");

    let produced = output.artifacts[1].as_definition().unwrap();
    assert_eq!(produced.name, "app.$PoolFactory$pool1$Definition");
    assert_eq!(produced.bean_type, TypeRef::named("app.Pool"));
    assert_eq!(produced.scope.as_deref(), Some(names::SINGLETON));
    let producer = produced.producer.as_ref().unwrap();
    assert_eq!(producer.factory_type, "app.PoolFactory");
    assert_eq!(producer.kind, ProducerKind::Method);
    assert_eq!(output.claim(MemberId(0)), Some(Responsibility::FactoryProducer));
}

#[test]
fn test_producers_numbered_in_member_order() {
    let model = framework().with(
        TypeBuilder::class("app.Clients")
            .annotated(names::FACTORY)
            .field(FieldDecl::new("fallback", string()).annotated(names::BEAN))
            .method(MethodDecl::new("primary").annotated(names::BEAN).returns(string()))
            .method(MethodDecl::new("shutdown").annotated(names::BEAN))
            .build(),
    );
    let output = process(&model, "app.Clients").unwrap();

    let names: Vec<_> = output.artifacts.iter().map(|a| a.name()).collect();
    assert_eq!(
        names,
        vec![
            "app.$Clients$Definition",
            "app.$Clients$fallback1$Definition",
            "app.$Clients$primary2$Definition",
        ]
    );
    // void methods never produce
    assert_eq!(output.claim(MemberId(2)), Some(Responsibility::Ignored));
}

#[test]
fn test_private_producer_field() {
    let model = framework().with(
        TypeBuilder::class("app.Clients")
            .annotated(names::FACTORY)
            .field(FieldDecl::new("fallback", string()).annotated(names::BEAN).private())
            .build(),
    );
    let err = process(&model, "app.Clients").unwrap_err();
    assert!(matches!(err, ProcessingError::PrivateProducerField { .. }));
}

#[test]
fn test_producer_qualifier_replaces_produced_qualifier() {
    let pool = pool_type(vec![]).annotated(PRIMARY).annotated(PROTOTYPE);
    let producer = pool_method().annotated_with(AnnotationUse::new(names::NAMED).with("value", "main"));
    let model = factory_with(producer, pool);
    let output = process(&model, "app.PoolFactory").unwrap();

    let produced = output.artifacts[1].as_definition().unwrap();
    assert_eq!(produced.qualifiers, vec![names::NAMED.to_string()]);
    assert_eq!(produced.scope, None);
}

#[test]
fn test_producer_qualifier_strips_produced_scope() {
    let pool = pool_type(vec![]).annotated(PROTOTYPE);
    let producer = pool_method().annotated_with(AnnotationUse::new(names::NAMED).with("value", "main"));
    let model = factory_with(producer, pool);
    let output = process(&model, "app.PoolFactory").unwrap();

    let produced = output.artifacts[1].as_definition().unwrap();
    assert_eq!(produced.scope, None);
    assert_eq!(produced.annotations, vec![names::BEAN.to_string(), names::NAMED.to_string()]);
}

#[test]
fn test_produced_scope_kept_without_producer_override() {
    let model = factory_with(pool_method(), pool_type(vec![]).annotated(PROTOTYPE));
    let output = process(&model, "app.PoolFactory").unwrap();

    let produced = output.artifacts[1].as_definition().unwrap();
    assert_eq!(produced.scope.as_deref(), Some(PROTOTYPE));
}

// ============================================================================
// Pre-destroy and executable methods of produced types
// ============================================================================

#[test]
fn test_pre_destroy_on_produced_type() {
    let producer = pool_method_with(AnnotationUse::new(names::BEAN).with("preDestroy", "close"));
    let model = factory_with(producer, pool_type(vec![]));
    let output = process(&model, "app.PoolFactory").unwrap();

    let produced = output.artifacts[1].as_definition().unwrap();
    assert_eq!(produced.pre_destroy.len(), 1);
    assert_eq!(produced.pre_destroy[0].name, "close");
    assert_eq!(produced.pre_destroy[0].declaring_type, "app.Pool");
}

#[test]
fn test_missing_pre_destroy_method() {
    let producer = pool_method_with(AnnotationUse::new(names::BEAN).with("preDestroy", "shutdown"));
    let model = factory_with(producer, pool_type(vec![]));
    let err = process(&model, "app.PoolFactory").unwrap_err();

    assert!(matches!(err, ProcessingError::MissingPreDestroyMethod { .. }));
    assert!(err.to_string().contains("shutdown"));
}

#[test]
fn test_pre_destroy_on_primitive_producer() {
    let model = framework().with(
        TypeBuilder::class("app.Limits")
            .annotated(names::FACTORY)
            .method(
                MethodDecl::new("max")
                    .annotated_with(AnnotationUse::new(names::BEAN).with("preDestroy", "close"))
                    .returns(TypeRef::primitive(PrimitiveKind::Int)),
            )
            .build(),
    );
    let err = process(&model, "app.Limits").unwrap_err();
    assert!(matches!(err, ProcessingError::PreDestroyOnUnsupportedType { .. }));
}

#[test]
fn test_executable_producer_exposes_public_methods() {
    let model = factory_with(pool_method().annotated(names::EXECUTABLE), pool_type(vec![]));
    let output = process(&model, "app.PoolFactory").unwrap();

    let produced = output.artifacts[1].as_definition().unwrap();
    let executable: Vec<_> = produced.executable_methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(executable, vec!["acquire", "close", "size"]);
}

// ============================================================================
// Advised produced types
// ============================================================================

#[test]
fn test_advised_producer_plan() {
    let model = factory_with(pool_method().annotated(LOGGED), pool_type(vec![]));
    let output = process(&model, "app.PoolFactory").unwrap();

    assert_eq!(output.artifacts.len(), 3);
    let produced = output.artifacts[1].as_definition().unwrap();
    let plan = output.artifacts[2].as_plan().unwrap();
    assert_eq!(plan.name, "app.$PoolFactory$pool1$Definition$Intercepted");
    assert_eq!(plan.super_definition.as_deref(), Some(produced.name.as_str()));
    assert_eq!(produced.intercepted_by.as_deref(), Some(plan.name.as_str()));
    assert!(output.interception_plan().is_none());

    // final and static methods are left alone
    let advised: Vec<_> = plan.advised_methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(advised, vec!["acquire", "close"]);
    assert!(plan.constraints.constructor_fills.is_empty());
}

#[test]
fn test_final_produced_type_cannot_be_advised() {
    let model = factory_with(pool_method().annotated(LOGGED), pool_type(vec![]).with_final());
    let err = process(&model, "app.PoolFactory").unwrap_err();
    assert!(matches!(err, ProcessingError::FinalClassAdvised { .. }));
}

#[test]
fn test_advised_array_producer() {
    let model = framework().with(
        TypeBuilder::class("app.Pools")
            .annotated(names::FACTORY)
            .method(
                MethodDecl::new("all")
                    .annotated(names::BEAN)
                    .annotated(LOGGED)
                    .returns(TypeRef::array(TypeRef::named("app.Pool"))),
            )
            .build(),
    );
    let err = process(&model, "app.Pools").unwrap_err();
    assert!(matches!(err, ProcessingError::AopOnUnsupportedType { .. }));
}

fn constructor_args() -> Vec<Parameter> {
    vec![
        Parameter::new("url", string()),
        Parameter::new("size", TypeRef::primitive(PrimitiveKind::Int)),
    ]
}

#[test]
fn test_constructor_arguments_rejected_by_default() {
    let model = factory_with(pool_method().annotated(LOGGED), pool_type(constructor_args()));
    let err = process(&model, "app.PoolFactory").unwrap_err();
    assert!(matches!(err, ProcessingError::UnproxyableConstructor { .. }));
}

#[test]
fn test_constructor_arguments_warned_by_config() {
    let model = factory_with(pool_method().annotated(LOGGED), pool_type(constructor_args()));
    let config = ProcessorConfig::from_str("[processor]\ndefault-proxy-target-mode = \"warn\"\n").unwrap();
    let output = process_with(&model, &config, "app.PoolFactory").unwrap();

    assert_eq!(output.warnings.len(), 1);
    assert!(matches!(
        output.warnings[0],
        ProcessingWarning::ProxiedWithEmptyArguments { .. }
    ));
    let plan = output.artifacts[2].as_plan().unwrap();
    assert_eq!(plan.constraints.target_mode, Some(ProxyTargetMode::Warn));
    assert_eq!(
        plan.constraints.constructor_fills,
        vec![ConstructorFill::Null, ConstructorFill::Zero]
    );
}

#[test]
fn test_constructor_arguments_allowed_by_annotation() {
    let logged = AnnotationUse::new(names::AROUND).with("proxyTargetMode", "allow");
    let model = factory_with(
        pool_method().annotated(LOGGED).annotated_with(logged),
        pool_type(constructor_args()),
    );
    let output = process(&model, "app.PoolFactory").unwrap();

    assert!(output.warnings.is_empty());
    let plan = output.artifacts[2].as_plan().unwrap();
    assert_eq!(plan.constraints.target_mode, Some(ProxyTargetMode::Allow));
    assert_eq!(plan.constraints.constructor_fills.len(), 2);
}

#[test]
fn test_factory_type_with_class_advice() {
    let model = framework().with(
        TypeBuilder::class("app.AuditFactory")
            .annotated(names::FACTORY)
            .annotated(LOGGED)
            .method(MethodDecl::new("audit").returns(string()))
            .build(),
    );
    let output = process(&model, "app.AuditFactory").unwrap();

    assert_eq!(output.strategy, Strategy::Factory { is_aop_proxy: true });
    let plan = output.interception_plan().unwrap();
    assert!(plan.advised("audit").is_some());
}
