//! Adapter methods
//!
//! An adapter method is exposed as the single abstract method of a target
//! interface. Matching binds the interface's type variables from the adapter's
//! parameter types and checks each position for assignability.

use super::intercept::InterceptionPlanBuilder;
use super::{apply_bean_metadata, Accumulator, MethodView, TypeScope};
use crate::annotations::AnnotationMetadata;
use crate::artifact::{AdaptedMethod, AdviceKind, GenerationArtifact};
use crate::error::ProcessingError;
use crate::model::{DeclaredType, ElementRef, MethodDecl, ProgramModel, TypeRef};
use crate::types::AssignabilityContext;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;

/// Result of matching an adapter method against its target interface
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterMatch {
    /// The interface's single abstract method
    pub target_method: MethodDecl,
    /// Interface type variables bound by the adapter's parameter types
    pub bindings: BTreeMap<String, TypeRef>,
}

pub struct AdapterMatcher<'a> {
    model: &'a dyn ProgramModel,
}

impl<'a> AdapterMatcher<'a> {
    pub fn new(model: &'a dyn ProgramModel) -> Self {
        AdapterMatcher { model }
    }

    /// The single abstract method of `interface`, or how many abstract methods it has
    pub fn sam_method<'t>(&self, interface: &'t DeclaredType) -> Result<&'t MethodDecl, usize> {
        let mut abstract_methods = interface
            .methods()
            .map(|(_, m)| m)
            .filter(|m| interface.is_abstract_method(m));
        match (abstract_methods.next(), abstract_methods.next()) {
            (Some(method), None) => Ok(method),
            (None, _) => Err(0),
            (Some(_), Some(_)) => Err(2 + abstract_methods.count()),
        }
    }

    /// Match `source` against the single abstract method of `target`
    pub fn match_method(
        &self,
        source: &MethodDecl,
        target: &str,
        element: &ElementRef,
    ) -> Result<AdapterMatch, ProcessingError> {
        if source.is_suspend {
            return Err(ProcessingError::SuspendAdapter {
                element: element.clone(),
            });
        }
        let interface = self
            .model
            .resolve_type(target)
            .ok_or_else(|| ProcessingError::UnresolvedType {
                element: element.clone(),
                name: target.to_string(),
            })?;
        if !interface.is_interface() {
            return Err(ProcessingError::AdapterTargetNotInterface {
                element: element.clone(),
                target: target.to_string(),
            });
        }
        let target_method = self
            .sam_method(interface)
            .map_err(|found| ProcessingError::NotSamType {
                element: element.clone(),
                target: target.to_string(),
                found,
            })?;
        if source.params.len() != target_method.params.len() {
            return Err(ProcessingError::AdapterArityMismatch {
                element: element.clone(),
                source_method: source.description(),
                target_method: target_method.description(),
            });
        }

        let mut bindings: FxHashMap<String, TypeRef> = FxHashMap::default();
        for (position, (source_param, target_param)) in
            source.params.iter().zip(&target_method.params).enumerate()
        {
            if let TypeRef::Var { name, .. } = &target_param.ty {
                let own_variable = interface.type_params.iter().any(|p| &p.name == name);
                if own_variable && !bindings.contains_key(name) {
                    bindings.insert(name.clone(), source_param.ty.clone());
                }
            }

            let assignability = AssignabilityContext::new(self.model).with_bindings(bindings.clone());
            if !assignability.is_assignable(&source_param.ty, &target_param.ty) {
                return Err(ProcessingError::AdapterTypeMismatch {
                    element: element.clone(),
                    source_method: source.description(),
                    target_method: target_method.description(),
                    position,
                    actual: source_param.ty.to_string(),
                    expected: target_param.ty.substitute(&bindings).to_string(),
                });
            }
        }

        Ok(AdapterMatch {
            target_method: target_method.clone(),
            bindings: bindings.into_iter().collect(),
        })
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Build the adapter plan for `m` and append it to the produced artifacts
pub(crate) fn visit_adapter(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    m: &MethodView<'_>,
) -> Result<(), ProcessingError> {
    let markers = scope.markers();
    let element = scope.member_ref(m.id);
    let target = m
        .meta
        .string_value(&markers.adapter, "value")
        .ok_or_else(|| ProcessingError::UnresolvedType {
            element: element.clone(),
            name: "<none>".to_string(),
        })?;

    let matched = AdapterMatcher::new(scope.model).match_method(m.method, target, &element)?;

    let index = acc.next_adapter_index();
    let name = format!(
        "{}.${}${}${}{}$Definition$Intercepted",
        scope.ty.package,
        scope.ty.name,
        simple_name(target),
        m.method.name,
        index
    );
    debug!(adapter = %name, target, "adapter matched");

    let mut plan = InterceptionPlanBuilder::for_adapter(name, target, element);
    apply_bean_metadata(plan.definition_mut(), m.meta, markers);
    plan.bind_type_arguments(target, matched.bindings.clone());

    let substitution: FxHashMap<String, TypeRef> = matched.bindings.clone().into_iter().collect();
    let mut target_method = matched.target_method.clone();
    for param in &mut target_method.params {
        param.ty = param.ty.substitute(&substitution);
    }
    target_method.return_type = target_method.return_type.substitute(&substitution);
    let advised = plan.add_method(
        &target_method,
        target.to_string(),
        &AnnotationMetadata::empty(),
        m.meta,
        markers,
        AdviceKind::Introduction,
    );
    advised.adapted = Some(AdaptedMethod {
        bean_type: scope.type_name.clone(),
        method: m.method.name.clone(),
        argument_types: m.method.params.iter().map(|p| p.ty.clone()).collect(),
        qualifier: scope
            .type_meta
            .string_value(&markers.named, "value")
            .map(str::to_string),
    });

    acc.produced.push(GenerationArtifact::InterceptionPlan(plan.finish()));
    Ok(())
}
