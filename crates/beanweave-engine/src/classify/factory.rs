//! Beans produced by factory members
//!
//! The metadata of a produced bean is the produced type's own metadata with the
//! producing element layered over it. Qualifiers of the factory type only survive
//! when the produced type already carries them.

use super::intercept::InterceptionPlanBuilder;
use super::{apply_bean_metadata, has_declared_scope, is_scope_entry, Accumulator, TypeScope};
use crate::annotations::AnnotationMetadata;
use crate::artifact::{
    AdviceKind, BeanDefinition, ConstructorFill, FactoryProducer, GenerationArtifact,
    InterceptionPlan, MemberPoint, ProducerKind,
};
use crate::config::{Markers, ProxyTargetMode};
use crate::error::{ProcessingError, ProcessingWarning, ProducedKind};
use crate::model::{DeclaredType, ElementRef, Member, MethodDecl, Parameter, TypeRef};
use crate::types::SubtypingContext;
use tracing::debug;

/// A member producing a bean
pub(crate) struct Producer<'p> {
    pub(crate) kind: ProducerKind,
    pub(crate) member: String,
    pub(crate) produced: &'p TypeRef,
    /// Metadata of the producing element
    pub(crate) meta: &'p AnnotationMetadata,
    pub(crate) element: ElementRef,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) requires_reflection: bool,
}

/// Metadata of a produced bean
///
/// Merging an already merged view again with the same factory and element
/// metadata returns it unchanged.
pub fn merge_factory_metadata(
    markers: &Markers,
    factory_meta: &AnnotationMetadata,
    element_meta: &AnnotationMetadata,
    produced_meta: &AnnotationMetadata,
) -> AnnotationMetadata {
    let factory_qualifiers = factory_meta
        .filtered(|e| e.has_stereotype(&markers.qualifier) && produced_meta.has_annotation(&e.name))
        .as_inherited();
    let producing = factory_qualifiers.overlay(element_meta);

    let overrides =
        has_declared_scope(&producing, markers) || producing.has_declared_stereotype(&markers.qualifier);
    let base = if overrides {
        produced_meta.filtered(|e| {
            producing.has_annotation(&e.name)
                || !(is_scope_entry(e, markers) || e.has_stereotype(&markers.qualifier))
        })
    } else {
        produced_meta.clone()
    };
    base.overlay(&producing)
}

fn produced_kind(ty: &TypeRef) -> Option<ProducedKind> {
    if ty.is_array() {
        Some(ProducedKind::Array)
    } else if ty.is_primitive() {
        Some(ProducedKind::Primitive)
    } else {
        None
    }
}

fn require_declaration<'m>(
    scope: &TypeScope<'m>,
    producer: &Producer<'_>,
) -> Result<&'m DeclaredType, ProcessingError> {
    producer
        .produced
        .name()
        .and_then(|name| scope.model.resolve_type(name))
        .ok_or_else(|| ProcessingError::UnresolvedType {
            element: producer.element.clone(),
            name: producer.produced.to_string(),
        })
}

fn produced_point(decl: &DeclaredType, method: &MethodDecl) -> MemberPoint {
    MemberPoint {
        name: method.name.clone(),
        declaring_type: method
            .declaring_type
            .clone()
            .unwrap_or_else(|| decl.qualified_name()),
        parameters: method.params.clone(),
        ty: method.return_type.clone(),
        requires_reflection: false,
    }
}

/// Build the definition (and plan, when advised) of a produced bean
pub(crate) fn visit_producer(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    producer: Producer<'_>,
) -> Result<(), ProcessingError> {
    let markers = scope.markers();
    let unsupported = produced_kind(producer.produced);
    let produced_decl = producer
        .produced
        .name()
        .and_then(|name| scope.model.resolve_type(name));
    let produced_meta = produced_decl
        .map(|d| scope.resolver.for_type(d))
        .unwrap_or_default();
    let merged = merge_factory_metadata(markers, &scope.type_meta, producer.meta, &produced_meta);

    let index = acc.next_producer_index();
    let name = format!(
        "{}.${}${}{}$Definition",
        scope.ty.package, scope.ty.name, producer.member, index
    );
    let mut definition = BeanDefinition::new(name, producer.produced.clone(), producer.element.clone());
    apply_bean_metadata(&mut definition, &merged, markers);
    definition.producer = Some(FactoryProducer {
        factory_type: scope.type_name.clone(),
        member: producer.member.clone(),
        kind: producer.kind,
        parameters: producer.parameters.clone(),
        requires_reflection: producer.requires_reflection,
    });

    if let Some(method) = producer.meta.string_value(&markers.bean, "preDestroy") {
        if let Some(kind) = unsupported {
            return Err(ProcessingError::PreDestroyOnUnsupportedType {
                element: producer.element,
                kind,
            });
        }
        let decl = require_declaration(scope, &producer)?;
        let found = decl.methods().map(|(_, m)| m).find(|m| {
            m.name == method && m.params.is_empty() && m.modifiers.is_public() && !m.modifiers.is_static
        });
        match found {
            Some(m) => definition.pre_destroy.push(produced_point(decl, m)),
            None => {
                return Err(ProcessingError::MissingPreDestroyMethod {
                    element: producer.element,
                    method: method.to_string(),
                    produced: producer.produced.to_string(),
                })
            }
        }
    }

    if merged.has_stereotype(&markers.executable) {
        if let Some(kind) = unsupported {
            return Err(ProcessingError::ExecutableOnUnsupportedType {
                element: producer.element,
                kind,
            });
        }
        let decl = require_declaration(scope, &producer)?;
        definition.executable_methods.extend(
            decl.methods()
                .map(|(_, m)| m)
                .filter(|m| m.modifiers.is_public() && !m.modifiers.is_static && !m.is_synthetic)
                .map(|m| produced_point(decl, m)),
        );
    }

    let is_interceptor = produced_decl
        .is_some_and(|d| SubtypingContext::new(scope.model).is_subtype(d, &markers.interceptor));
    let mut plan = None;
    if merged.has_stereotype(&markers.around) && !is_interceptor {
        if let Some(kind) = unsupported {
            return Err(ProcessingError::AopOnUnsupportedType {
                element: producer.element,
                kind,
            });
        }
        let decl = require_declaration(scope, &producer)?;
        if decl.is_final() {
            return Err(ProcessingError::FinalClassAdvised {
                element: producer.element,
            });
        }
        plan = Some(produced_plan(scope, acc, &producer, decl, &merged, &mut definition)?);
    }

    debug!(
        factory = %scope.type_name,
        member = %producer.member,
        definition = %definition.name,
        "produced bean"
    );
    acc.produced.push(GenerationArtifact::BeanDefinition(definition));
    if let Some(plan) = plan {
        acc.produced.push(GenerationArtifact::InterceptionPlan(plan));
    }
    Ok(())
}

fn produced_plan(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    producer: &Producer<'_>,
    decl: &DeclaredType,
    merged: &AnnotationMetadata,
    definition: &mut BeanDefinition,
) -> Result<InterceptionPlan, ProcessingError> {
    let markers = scope.markers();
    let mode = merged
        .string_value(&markers.around, "proxyTargetMode")
        .and_then(|s| s.parse::<ProxyTargetMode>().ok())
        .unwrap_or(scope.config.processor.default_proxy_target_mode);

    let mut plan = InterceptionPlanBuilder::for_produced(definition);
    definition.intercepted_by = Some(plan.name().to_string());

    let constructor_params = decl
        .constructor
        .as_ref()
        .map(|c| c.params.as_slice())
        .unwrap_or_default();
    if !constructor_params.is_empty() {
        match mode {
            ProxyTargetMode::Error => {
                return Err(ProcessingError::UnproxyableConstructor {
                    element: producer.element.clone(),
                    produced: producer.produced.to_string(),
                })
            }
            ProxyTargetMode::Warn => acc.warnings.push(ProcessingWarning::ProxiedWithEmptyArguments {
                element: producer.element.clone(),
                produced: producer.produced.to_string(),
            }),
            ProxyTargetMode::Allow => {}
        }
        let constraints = plan.constraints_mut();
        constraints.target_mode = Some(mode);
        constraints.constructor_fills = constructor_params
            .iter()
            .map(|p| {
                if p.ty.is_primitive() {
                    ConstructorFill::Zero
                } else {
                    ConstructorFill::Null
                }
            })
            .collect();
    }
    plan.constraints_mut().proxy_target = merged.bool_value(&markers.around, "proxyTarget").unwrap_or(false);

    for member in &decl.members {
        let Member::Method(method) = member else {
            continue;
        };
        let modifiers = &method.modifiers;
        if modifiers.is_static || modifiers.is_final || modifiers.is_private() || method.is_synthetic {
            continue;
        }
        let method_meta = scope.resolver.for_member(member);
        let declaring_type = method
            .declaring_type
            .clone()
            .unwrap_or_else(|| decl.qualified_name());
        plan.add_method(method, declaring_type, merged, &method_meta, markers, AdviceKind::Around);
    }
    Ok(plan.finish())
}
