//! Properties that hold for every processed unit

mod common;

use beanweave_engine::config::names;
use beanweave_engine::model::{FieldDecl, MethodDecl, PrimitiveKind, TypeBuilder, TypeRef};
use beanweave_engine::{
    AdapterMatcher, InMemoryModel, ProcessingContext, ProcessingError, ProcessorConfig,
    ProgramModel,
};
use common::{framework, process, string, LOGGED, TIMED};
use std::collections::HashSet;

fn unit() -> InMemoryModel {
    framework()
        .with(
            TypeBuilder::class("app.Repository")
                .annotated(names::SINGLETON)
                .annotated(LOGGED)
                .field(FieldDecl::new("pool", TypeRef::named("app.Pool")).annotated(names::INJECT))
                .field(FieldDecl::new("url", string()).annotated(names::VALUE))
                .method(MethodDecl::new("init").annotated(names::POST_CONSTRUCT))
                .method(MethodDecl::new("find").param("id", string()).returns(string()))
                .method(MethodDecl::new("helper").private())
                .method(MethodDecl::new("setCache").param("cache", TypeRef::named("app.Cache")))
                .method(MethodDecl::new("getCache").returns(TypeRef::named("app.Cache")))
                .property(
                    "cache",
                    TypeRef::named("app.Cache"),
                    Some("getCache"),
                    Some("setCache"),
                    None,
                )
                .build(),
        )
        .with(
            TypeBuilder::class("app.Jobs")
                .annotated(names::SINGLETON)
                .annotated(names::EXECUTABLE)
                .method(MethodDecl::new("run"))
                .method(MethodDecl::new("stop").with_static())
                .method(MethodDecl::new("retry").annotated(TIMED))
                .build(),
        )
        .with(TypeBuilder::class("app.Dto").field(FieldDecl::new("id", string())).build())
}

#[test]
fn test_classification_is_deterministic() {
    let model = unit();
    let config = ProcessorConfig::default();
    let context = ProcessingContext::new(&model, &config);

    let first = context.process_unit();
    let second = context.process_unit();
    assert!(!first.has_errors());
    assert_eq!(first.outputs, second.outputs);
    for ty in model.declared_types() {
        assert_eq!(context.classify(ty).unwrap(), context.classify(ty).unwrap());
    }
}

#[test]
fn test_every_member_has_exactly_one_claim() {
    let model = unit();
    for ty in model.declared_types() {
        let output = process(&model, &ty.qualified_name()).unwrap();
        if output.artifacts.is_empty() {
            continue;
        }
        let members: HashSet<_> = output.claims.iter().map(|c| c.member).collect();
        assert_eq!(members.len(), output.claims.len(), "duplicate claim in {}", ty.name);
        assert_eq!(output.claims.len(), ty.members.len(), "unclaimed member in {}", ty.name);
    }
}

#[test]
fn test_parallel_processing_matches_sequential() {
    let model = unit();
    let config = ProcessorConfig::default();
    let context = ProcessingContext::new(&model, &config);
    let sequential = context.process_unit();

    let types = model.declared_types();
    let parallel: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = types
            .iter()
            .map(|ty| s.spawn(move || context.process_type(ty)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });
    assert_eq!(parallel, sequential.outputs);
}

#[test]
fn test_final_method_with_declared_advice() {
    let model = framework().with(
        TypeBuilder::class("app.Billing")
            .annotated(names::SINGLETON)
            .method(MethodDecl::new("charge").annotated(LOGGED).with_final())
            .build(),
    );
    let err = process(&model, "app.Billing").unwrap_err();
    assert!(matches!(err, ProcessingError::FinalMethodAdvised { .. }));
    assert!(err.to_string().contains("declared final"));
}

#[test]
fn test_final_public_method_inheriting_class_advice() {
    let model = framework().with(
        TypeBuilder::class("app.Billing")
            .annotated(names::SINGLETON)
            .annotated(LOGGED)
            .method(MethodDecl::new("charge").with_final())
            .build(),
    );
    let err = process(&model, "app.Billing").unwrap_err();
    assert!(matches!(err, ProcessingError::FinalMethodInheritsAdvice { .. }));
}

#[test]
fn test_adapter_commutes_with_swapped_positions() {
    let model = framework()
        .with_library(
            TypeBuilder::interface("fn.Handler")
                .type_param("K", None)
                .type_param("V", None)
                .method(
                    MethodDecl::new("handle")
                        .param("key", TypeRef::var("K"))
                        .param("value", TypeRef::var("V")),
                )
                .build(),
        )
        .with_library(
            TypeBuilder::interface("fn.SwappedHandler")
                .type_param("K", None)
                .type_param("V", None)
                .method(
                    MethodDecl::new("handle")
                        .param("value", TypeRef::var("V"))
                        .param("key", TypeRef::var("K")),
                )
                .build(),
        );
    let element = TypeBuilder::class("app.Cache").build().element_ref();
    let int = TypeRef::primitive(PrimitiveKind::Int);
    let matcher = AdapterMatcher::new(&model);

    let forward = MethodDecl::new("put").param("k", string()).param("v", int.clone());
    let swapped = MethodDecl::new("put").param("v", int).param("k", string());
    let a = matcher.match_method(&forward, "fn.Handler", &element).unwrap();
    let b = matcher.match_method(&swapped, "fn.SwappedHandler", &element).unwrap();
    assert_eq!(a.bindings, b.bindings);
    assert_eq!(a.bindings["K"], string());
}
