use beanweave_engine::config::names;
use beanweave_engine::model::{FieldDecl, MethodDecl, PrimitiveKind, TypeBuilder, TypeRef};
use beanweave_engine::{
    AdapterMatcher, AnnotationUse, InMemoryModel, ProcessingContext, ProcessorConfig, ProgramModel,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const LOGGED: &str = "app.Logged";

fn framework() -> InMemoryModel {
    InMemoryModel::new()
        .with_library(TypeBuilder::annotation(names::SINGLETON).annotated(names::SCOPE).build())
        .with_library(TypeBuilder::annotation(names::NAMED).annotated(names::QUALIFIER).build())
        .with_library(TypeBuilder::annotation(LOGGED).annotated(names::AROUND).build())
        .with_library(
            TypeBuilder::interface("event.Listener")
                .type_param("E", None)
                .method(MethodDecl::new("onEvent").param("event", TypeRef::var("E")))
                .build(),
        )
        .with_library(TypeBuilder::class("event.Startup").build())
}

fn service(index: usize, advised: bool) -> TypeBuilder {
    let mut builder = TypeBuilder::class(&format!("app.Service{}", index)).annotated(names::SINGLETON);
    if advised {
        builder = builder.annotated(LOGGED);
    }
    builder
        .field(FieldDecl::new("repo", TypeRef::named("app.Repo")).annotated(names::INJECT))
        .field(FieldDecl::new("url", TypeRef::named("lang.String")).annotated(names::VALUE))
        .method(MethodDecl::new("start").annotated(names::POST_CONSTRUCT))
        .method(MethodDecl::new("find").param("id", TypeRef::named("lang.String")))
        .method(MethodDecl::new("count").returns(TypeRef::primitive(PrimitiveKind::Long)))
        .method(MethodDecl::new("helper").private())
}

fn unit(types: usize) -> InMemoryModel {
    let mut model = framework();
    for i in 0..types {
        model.add(service(i, i % 2 == 0).build());
    }
    model.add(
        TypeBuilder::class("app.Factory")
            .annotated(names::FACTORY)
            .method(
                MethodDecl::new("repo")
                    .annotated(names::BEAN)
                    .annotated(names::SINGLETON)
                    .returns(TypeRef::named("app.Repo")),
            )
            .build(),
    );
    model
}

fn bench_single_type(c: &mut Criterion) {
    let model = framework().with(service(0, true).build());
    let config = ProcessorConfig::default();
    let context = ProcessingContext::new(&model, &config);
    let ty = model.declared_types()[0];

    c.bench_function("process_advised_bean", |b| {
        b.iter(|| context.process_type(black_box(ty)).unwrap());
    });
}

fn bench_unit(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit");
    let config = ProcessorConfig::default();

    for size in [10, 100, 500] {
        let model = unit(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("process_unit", size), &model, |b, model| {
            b.iter(|| ProcessingContext::new(black_box(model), &config).process_unit());
        });
    }

    group.finish();
}

fn bench_adapter_match(c: &mut Criterion) {
    let model = framework();
    let matcher = AdapterMatcher::new(&model);
    let source = MethodDecl::new("onStartup")
        .annotated_with(AnnotationUse::new(names::ADAPTER).with("value", "event.Listener"))
        .param("event", TypeRef::named("event.Startup"));
    let element = TypeBuilder::class("app.Events").build().element_ref();

    c.bench_function("adapter_match", |b| {
        b.iter(|| matcher.match_method(black_box(&source), "event.Listener", &element).unwrap());
    });
}

criterion_group!(benches, bench_single_type, bench_unit, bench_adapter_match);
criterion_main!(benches);
