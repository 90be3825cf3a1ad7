//! Interception plans and interceptor binding resolution

use super::rules::{static_check, Claim};
use super::{apply_bean_metadata, definition_name, Accumulator, MethodView, TypeScope};
use crate::annotations::AnnotationMetadata;
use crate::artifact::{
    AdviceKind, AdvisedMethod, BeanDefinition, InterceptionPlan, InterceptorBinding,
    ProxyConstraints, Responsibility,
};
use crate::config::Markers;
use crate::error::ProcessingError;
use crate::model::{ElementRef, MethodDecl, TypeRef};
use std::collections::BTreeMap;

/// Interceptor bindings of a method
///
/// Class-level advice comes first in declaration order; method-level advice is
/// layered after it and replaces a class-level binding of the same interceptor.
pub fn resolve_bindings(
    class_meta: &AnnotationMetadata,
    method_meta: &AnnotationMetadata,
    markers: &Markers,
) -> Vec<InterceptorBinding> {
    class_meta
        .overlay(method_meta)
        .entries()
        .iter()
        .filter_map(|entry| {
            let kind = if entry.has_stereotype(&markers.around) {
                AdviceKind::Around
            } else if entry.has_stereotype(&markers.introduction) {
                AdviceKind::Introduction
            } else {
                return None;
            };
            Some(InterceptorBinding {
                interceptor: entry.name.clone(),
                kind,
                values: entry.values.clone(),
            })
        })
        .collect()
}

/// Incrementally built interception plan
#[derive(Debug)]
pub(crate) struct InterceptionPlanBuilder {
    plan: InterceptionPlan,
}

impl InterceptionPlanBuilder {
    fn new(name: String, definition: BeanDefinition, target_type: TypeRef, introduction: bool) -> Self {
        InterceptionPlanBuilder {
            plan: InterceptionPlan {
                name,
                definition,
                super_definition: None,
                target_type,
                introduction,
                interfaces: Vec::new(),
                advised_methods: Vec::new(),
                type_arguments: BTreeMap::new(),
                constraints: ProxyConstraints::default(),
            },
        }
    }

    /// Plan proxying the scope's own bean
    pub(crate) fn for_type(scope: &TypeScope<'_>, super_definition: Option<&BeanDefinition>) -> Self {
        let name = format!("{}$Intercepted", definition_name(&scope.ty.package, &scope.ty.name));
        let target_type = TypeRef::named(scope.type_name.as_str());
        let mut definition = BeanDefinition::new(name.clone(), target_type.clone(), scope.ty.element_ref());
        match super_definition {
            Some(sup) => {
                definition.constructor = sup.constructor.clone();
                definition.scope = sup.scope.clone();
                definition.qualifiers = sup.qualifiers.clone();
                definition.annotations = sup.annotations.clone();
            }
            None => apply_bean_metadata(&mut definition, &scope.type_meta, scope.markers()),
        }

        let mut builder = Self::new(name, definition, target_type, false);
        builder.plan.super_definition = super_definition.map(|d| d.name.clone());
        builder.plan.constraints.proxy_target = scope
            .type_meta
            .bool_value(&scope.markers().around, "proxyTarget")
            .unwrap_or(false);
        builder
    }

    /// Plan implementing the scope's abstract methods
    pub(crate) fn for_introduction(scope: &TypeScope<'_>) -> Self {
        let markers = scope.markers();
        let name = format!("{}$Intercepted", definition_name(&scope.ty.package, &scope.ty.name));
        let target_type = TypeRef::named(scope.type_name.as_str());
        let mut definition = BeanDefinition::new(name.clone(), target_type.clone(), scope.ty.element_ref());
        apply_bean_metadata(&mut definition, &scope.type_meta, markers);

        let mut builder = Self::new(name, definition, target_type, true);
        if let Some(interfaces) = scope.type_meta.value(&markers.introduction, "interfaces") {
            builder.plan.interfaces = interfaces
                .to_list()
                .into_iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect();
        }
        builder
    }

    /// Plan implementing a single-method interface by forwarding to a bean method
    pub(crate) fn for_adapter(name: String, interface: &str, origin: ElementRef) -> Self {
        let target_type = TypeRef::named(interface);
        let definition = BeanDefinition::new(name.clone(), target_type.clone(), origin);
        let mut builder = Self::new(name, definition, target_type, true);
        builder.plan.interfaces.push(interface.to_string());
        builder
    }

    /// Plan proxying a bean produced by a factory member
    pub(crate) fn for_produced(produced: &BeanDefinition) -> Self {
        let name = format!("{}$Intercepted", produced.name);
        let mut definition = produced.clone();
        definition.name = name.clone();
        definition.intercepted_by = None;
        let mut builder = Self::new(name, definition, produced.bean_type.clone(), false);
        builder.plan.super_definition = Some(produced.name.clone());
        builder
    }

    pub(crate) fn name(&self) -> &str {
        &self.plan.name
    }

    pub(crate) fn definition_mut(&mut self) -> &mut BeanDefinition {
        &mut self.plan.definition
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut ProxyConstraints {
        &mut self.plan.constraints
    }

    pub(crate) fn bind_type_arguments(&mut self, interface: &str, bindings: BTreeMap<String, TypeRef>) {
        if !bindings.is_empty() {
            self.plan.type_arguments.insert(interface.to_string(), bindings);
        }
    }

    /// Record an advised method, returning the entry for further attributes
    pub(crate) fn add_method(
        &mut self,
        method: &MethodDecl,
        declaring_type: String,
        class_meta: &AnnotationMetadata,
        method_meta: &AnnotationMetadata,
        markers: &Markers,
        kind: AdviceKind,
    ) -> &mut AdvisedMethod {
        let bindings = resolve_bindings(class_meta, method_meta, markers);
        let methods = &mut self.plan.advised_methods;
        let index = match methods
            .iter()
            .position(|m| m.name == method.name && m.parameters == method.params)
        {
            Some(index) => index,
            None => {
                methods.push(AdvisedMethod {
                    name: method.name.clone(),
                    declaring_type,
                    parameters: method.params.clone(),
                    return_type: method.return_type.clone(),
                    kind,
                    bindings,
                    configuration_path: None,
                    adapted: None,
                });
                methods.len() - 1
            }
        };
        &mut methods[index]
    }

    pub(crate) fn finish(self) -> InterceptionPlan {
        self.plan
    }
}

/// Claim a method for the type's interception plan when it qualifies
pub(crate) fn visit_advised(scope: &TypeScope<'_>, acc: &mut Accumulator, m: &MethodView<'_>) -> Claim {
    let markers = scope.markers();
    let method = m.method;
    let modifiers = &method.modifiers;
    let is_aop_proxy = scope.strategy.is_aop_proxy();

    let method_around = m.meta.has_stereotype(&markers.around);
    let declares_advice = m.meta.has_declared_stereotype(&markers.around)
        || m.meta.has_declared_stereotype(&markers.introduction);
    let class_level = is_aop_proxy
        && !modifiers.is_static
        && !method.is_synthetic
        && (modifiers.is_public() || modifiers.is_package_private());

    let qualifies = class_level
        || (!is_aop_proxy && method_around)
        || (declares_advice && !scope.ty.is_abstract());
    if !qualifies {
        return Ok(None);
    }

    let element = || scope.member_ref(m.id);
    if modifiers.is_static {
        if !method_around && !declares_advice {
            return Ok(None);
        }
        return Err(ProcessingError::StaticMethodAdvised { element: element() });
    }
    if modifiers.is_private() {
        if !method_around && !declares_advice {
            return Ok(None);
        }
        return Err(ProcessingError::PrivateMethodAdvised { element: element() });
    }
    if modifiers.is_final {
        if m.meta.has_declared_stereotype(&markers.around) {
            return Err(ProcessingError::FinalMethodAdvised { element: element() });
        }
        if class_level && modifiers.is_public() {
            return Err(ProcessingError::FinalMethodInheritsAdvice { element: element() });
        }
        return Ok(None);
    }
    static_check(scope, m)?;

    let declaring_type = scope.declaring_name(method.declaring_type.as_deref());
    let plan = acc.plan_for(scope)?;
    plan.add_method(
        method,
        declaring_type,
        &scope.type_meta,
        m.meta,
        markers,
        AdviceKind::Around,
    );
    Ok(Some(Responsibility::Intercepted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{AnnotationUse, AnnotationValue, MetadataResolver};
    use crate::config::names;
    use crate::model::{InMemoryModel, TypeBuilder};

    fn model() -> InMemoryModel {
        InMemoryModel::new()
            .with_library(TypeBuilder::annotation("app.Logged").annotated(names::AROUND).build())
            .with_library(TypeBuilder::annotation("app.Timed").annotated(names::AROUND).build())
            .with_library(
                TypeBuilder::annotation("app.Client")
                    .annotated(names::INTRODUCTION)
                    .build(),
            )
    }

    #[test]
    fn test_method_binding_replaces_class_binding() {
        let model = model();
        let resolver = MetadataResolver::new(&model);
        let markers = Markers::default();
        let class_meta = resolver.resolve(
            &[
                AnnotationUse::new("app.Logged").with("order", 1i64),
                AnnotationUse::new("app.Timed"),
                AnnotationUse::new(names::SINGLETON),
            ],
            &[],
        );
        let method_meta = resolver.resolve(&[AnnotationUse::new("app.Logged").with("order", 2i64)], &[]);

        let bindings = resolve_bindings(&class_meta, &method_meta, &markers);
        let names: Vec<_> = bindings.iter().map(|b| b.interceptor.as_str()).collect();
        assert_eq!(names, vec!["app.Timed", "app.Logged"]);
        assert_eq!(bindings[1].values["order"], AnnotationValue::Int(2));
    }

    #[test]
    fn test_introduction_binding_kind() {
        let model = model();
        let resolver = MetadataResolver::new(&model);
        let markers = Markers::default();
        let class_meta = resolver.resolve(&[AnnotationUse::new("app.Client")], &[]);
        let bindings = resolve_bindings(&class_meta, &AnnotationMetadata::empty(), &markers);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].kind, AdviceKind::Introduction);
    }

    #[test]
    fn test_no_advice_no_bindings() {
        let model = model();
        let resolver = MetadataResolver::new(&model);
        let meta = resolver.resolve(&[AnnotationUse::new(names::SINGLETON)], &[]);
        assert!(resolve_bindings(&meta, &meta, &Markers::default()).is_empty());
    }
}
