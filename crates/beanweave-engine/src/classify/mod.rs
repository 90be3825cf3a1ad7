//! Classification of one declared type into generation artifacts
//!
//! A type is first assigned a [`Strategy`]. The strategy selects a rule table
//! (see `rules`) and one traversal over the type's properties and members assigns
//! every member a [`Responsibility`], filling the bean definition, the interception
//! plan and any produced artifacts along the way.
//!
//! The read-only inputs of that traversal live in [`TypeScope`]; everything the
//! rules write goes into an [`Accumulator`].

mod adapter;
mod configuration;
mod factory;
mod intercept;
mod members;
mod rules;
mod strategy;

pub use adapter::{AdapterMatch, AdapterMatcher};
pub use configuration::{kebab_case, ConfigurationMetadata, ConfigurationProperty};
pub use factory::merge_factory_metadata;
pub use intercept::resolve_bindings;
pub use strategy::{Strategy, StrategyClassifier};
pub(crate) use strategy::select as strategy_for;

use crate::annotations::{AnnotationEntry, AnnotationMetadata, MetadataResolver};
use crate::artifact::{
    BeanDefinition, ConstructorPoint, GenerationArtifact, MemberClaim, MemberPoint,
    Responsibility,
};
use crate::config::{Markers, ProcessorConfig};
use crate::error::{ProcessingError, ProcessingWarning};
use crate::model::{
    DeclaredType, ElementRef, FieldDecl, MemberId, MethodDecl, Modifiers, ProgramModel,
    PropertyDecl, TypeRef, Visibility,
};
use intercept::InterceptionPlanBuilder;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Everything produced for one declared type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeOutput {
    pub type_name: String,
    pub strategy: Strategy,
    /// Bean definition first, then the type's interception plan, then produced artifacts
    pub artifacts: Vec<GenerationArtifact>,
    /// One claim per member, in member order
    pub claims: Vec<MemberClaim>,
    pub warnings: Vec<ProcessingWarning>,
    pub configuration: Vec<ConfigurationProperty>,
}

impl TypeOutput {
    fn skipped(type_name: String) -> Self {
        TypeOutput {
            type_name,
            strategy: Strategy::Skip,
            artifacts: Vec::new(),
            claims: Vec::new(),
            warnings: Vec::new(),
            configuration: Vec::new(),
        }
    }

    /// The type's own bean definition
    pub fn bean_definition(&self) -> Option<&BeanDefinition> {
        self.artifacts
            .iter()
            .filter_map(GenerationArtifact::as_definition)
            .find(|d| d.producer.is_none())
    }

    /// The type's own interception plan
    pub fn interception_plan(&self) -> Option<&crate::artifact::InterceptionPlan> {
        let own_type = TypeRef::named(self.type_name.as_str());
        self.artifacts
            .iter()
            .filter_map(GenerationArtifact::as_plan)
            .find(|p| p.target_type == own_type)
    }

    pub fn claim(&self, member: MemberId) -> Option<Responsibility> {
        self.claims
            .iter()
            .find(|c| c.member == member)
            .map(|c| c.responsibility)
    }
}

/// A method with its resolved metadata
pub(crate) struct MethodView<'s> {
    pub(crate) id: MemberId,
    pub(crate) method: &'s MethodDecl,
    pub(crate) meta: &'s AnnotationMetadata,
}

/// A field with its resolved metadata
pub(crate) struct FieldView<'s> {
    pub(crate) id: MemberId,
    pub(crate) field: &'s FieldDecl,
    pub(crate) meta: &'s AnnotationMetadata,
}

/// A property with its parts and their combined metadata
pub(crate) struct PropertyView<'s> {
    pub(crate) prop: &'s PropertyDecl,
    pub(crate) read: Option<MethodView<'s>>,
    pub(crate) write: Option<MethodView<'s>>,
    pub(crate) field: Option<FieldView<'s>>,
    pub(crate) meta: AnnotationMetadata,
}

/// Read-only inputs for classifying one type
pub(crate) struct TypeScope<'a> {
    pub(crate) model: &'a dyn ProgramModel,
    pub(crate) config: &'a ProcessorConfig,
    pub(crate) resolver: MetadataResolver<'a>,
    pub(crate) ty: &'a DeclaredType,
    pub(crate) type_name: String,
    pub(crate) strategy: Strategy,
    pub(crate) type_meta: AnnotationMetadata,
    /// Set for configuration-properties types
    pub(crate) configuration_prefix: Option<String>,
    member_meta: Vec<AnnotationMetadata>,
    declaring_meta: FxHashMap<String, AnnotationMetadata>,
}

impl<'a> TypeScope<'a> {
    fn new(
        model: &'a dyn ProgramModel,
        config: &'a ProcessorConfig,
        resolver: MetadataResolver<'a>,
        ty: &'a DeclaredType,
        strategy: Strategy,
        type_meta: AnnotationMetadata,
    ) -> Self {
        let type_name = ty.qualified_name();
        let member_meta: Vec<AnnotationMetadata> =
            ty.members.iter().map(|m| resolver.for_member(m)).collect();

        let mut declaring_meta = FxHashMap::default();
        for member in &ty.members {
            if let Some(declaring) = member.declaring_type() {
                if declaring == type_name || declaring_meta.contains_key(declaring) {
                    continue;
                }
                let meta = model
                    .resolve_type(declaring)
                    .map(|d| resolver.for_type(d))
                    .unwrap_or_default();
                declaring_meta.insert(declaring.to_string(), meta);
            }
        }

        let configuration_prefix =
            configuration::configuration_prefix(model, &resolver, &config.markers, ty, &type_meta);

        TypeScope {
            model,
            config,
            resolver,
            ty,
            type_name,
            strategy,
            type_meta,
            configuration_prefix,
            member_meta,
            declaring_meta,
        }
    }

    pub(crate) fn markers(&self) -> &Markers {
        &self.config.markers
    }

    /// Metadata of a member, `None` for an id outside the member list
    pub(crate) fn meta(&self, id: MemberId) -> Option<&AnnotationMetadata> {
        self.member_meta.get(id.0)
    }

    pub(crate) fn method_view(&self, id: MemberId) -> Option<MethodView<'_>> {
        let method = self.ty.method(id)?;
        Some(MethodView {
            id,
            method,
            meta: self.meta(id)?,
        })
    }

    pub(crate) fn field_view(&self, id: MemberId) -> Option<FieldView<'_>> {
        let field = self.ty.field(id)?;
        Some(FieldView {
            id,
            field,
            meta: self.meta(id)?,
        })
    }

    pub(crate) fn property_view<'s>(&'s self, prop: &'s PropertyDecl) -> PropertyView<'s> {
        let field = prop.field.and_then(|id| self.field_view(id));
        let read = prop.read.and_then(|id| self.method_view(id));
        let write = prop.write.and_then(|id| self.method_view(id));
        let mut meta = AnnotationMetadata::empty();
        for id in [prop.field, prop.read, prop.write].into_iter().flatten() {
            if let Some(member) = self.meta(id) {
                meta = meta.overlay(member);
            }
        }
        PropertyView {
            prop,
            read,
            write,
            field,
            meta,
        }
    }

    /// Metadata of the type declaring a member
    pub(crate) fn declaring_meta(&self, declaring: Option<&str>) -> &AnnotationMetadata {
        match declaring {
            Some(name) if name != self.type_name => self
                .declaring_meta
                .get(name)
                .unwrap_or(&self.type_meta),
            _ => &self.type_meta,
        }
    }

    pub(crate) fn declaring_name(&self, declaring: Option<&str>) -> String {
        declaring
            .map(str::to_string)
            .unwrap_or_else(|| self.type_name.clone())
    }

    fn package_of(&self, declaring: Option<&str>) -> String {
        match declaring {
            Some(name) if name != self.type_name => match self.model.resolve_type(name) {
                Some(decl) => decl.package.clone(),
                None => name
                    .rsplit_once('.')
                    .map(|(package, _)| package.to_string())
                    .unwrap_or_default(),
            },
            _ => self.ty.package.clone(),
        }
    }

    /// Whether generated code in this type's package can reach the member directly
    pub(crate) fn is_accessible(&self, modifiers: &Modifiers, declaring: Option<&str>) -> bool {
        match modifiers.visibility {
            Visibility::Public => true,
            Visibility::Private => false,
            Visibility::Protected | Visibility::PackagePrivate => {
                self.package_of(declaring) == self.ty.package
            }
        }
    }

    /// Whether an injection point needs reflection, rejecting it when reflection
    /// must be opted into and the member does not
    pub(crate) fn requires_reflection(
        &self,
        modifiers: &Modifiers,
        declaring: Option<&str>,
        meta: &AnnotationMetadata,
        element: impl FnOnce() -> ElementRef,
    ) -> Result<bool, ProcessingError> {
        let needs = !self.is_accessible(modifiers, declaring);
        let reflective = &self.markers().reflective_access;
        if needs && self.config.processor.require_reflective_access && !meta.has_stereotype(reflective) {
            return Err(ProcessingError::ReflectionNotPermitted {
                element: element(),
                reflective: reflective.clone(),
            });
        }
        Ok(needs)
    }

    pub(crate) fn member_ref(&self, id: MemberId) -> ElementRef {
        self.ty.member_ref(id)
    }

    pub(crate) fn method_point(&self, m: &MethodView<'_>, requires_reflection: bool) -> MemberPoint {
        MemberPoint {
            name: m.method.name.clone(),
            declaring_type: self.declaring_name(m.method.declaring_type.as_deref()),
            parameters: m.method.params.clone(),
            ty: m.method.return_type.clone(),
            requires_reflection,
        }
    }

    pub(crate) fn field_point(&self, f: &FieldView<'_>, requires_reflection: bool) -> MemberPoint {
        MemberPoint {
            name: f.field.name.clone(),
            declaring_type: self.declaring_name(f.field.declaring_type.as_deref()),
            parameters: Vec::new(),
            ty: f.field.ty.clone(),
            requires_reflection,
        }
    }
}

/// Mutable state the rules write into while a type is visited
#[derive(Default)]
pub(crate) struct Accumulator {
    pub(crate) definition: Option<BeanDefinition>,
    pub(crate) plan: Option<InterceptionPlanBuilder>,
    /// Artifacts for produced beans and adapters, in discovery order
    pub(crate) produced: Vec<GenerationArtifact>,
    pub(crate) warnings: Vec<ProcessingWarning>,
    pub(crate) configuration: Vec<ConfigurationProperty>,
    claims: BTreeMap<MemberId, Responsibility>,
    adapters: usize,
    producers: usize,
}

impl Accumulator {
    pub(crate) fn claim(&mut self, member: MemberId, responsibility: Responsibility) {
        trace!(member = %member, ?responsibility, "member claimed");
        self.claims.entry(member).or_insert(responsibility);
    }

    /// The definition member points are added to: the bean definition, or the
    /// plan's own definition for introduction-only types
    pub(crate) fn target(&mut self) -> Option<&mut BeanDefinition> {
        match (&mut self.definition, &mut self.plan) {
            (Some(definition), _) => Some(definition),
            (None, Some(plan)) => Some(plan.definition_mut()),
            (None, None) => None,
        }
    }

    /// The type's interception plan, created on first use
    pub(crate) fn plan_for(
        &mut self,
        scope: &TypeScope<'_>,
    ) -> Result<&mut InterceptionPlanBuilder, ProcessingError> {
        let plan = match self.plan.take() {
            Some(plan) => plan,
            None => {
                if scope.ty.is_final() {
                    return Err(ProcessingError::FinalClassAdvised {
                        element: scope.ty.element_ref(),
                    });
                }
                let plan = InterceptionPlanBuilder::for_type(scope, self.definition.as_ref());
                if let Some(definition) = self.definition.as_mut() {
                    definition.intercepted_by = Some(plan.name().to_string());
                }
                debug!(type_name = %scope.type_name, plan = plan.name(), "interception plan created");
                plan
            }
        };
        Ok(self.plan.insert(plan))
    }

    pub(crate) fn next_adapter_index(&mut self) -> usize {
        self.adapters += 1;
        self.adapters
    }

    pub(crate) fn next_producer_index(&mut self) -> usize {
        self.producers += 1;
        self.producers
    }

    pub(crate) fn record_configuration(&mut self, property: ConfigurationProperty) {
        trace!(path = %property.path, "configuration property");
        self.configuration.push(property);
    }

    fn finish(mut self, scope: &TypeScope<'_>) -> TypeOutput {
        for id in 0..scope.ty.members.len() {
            self.claims
                .entry(MemberId(id))
                .or_insert(Responsibility::Ignored);
        }

        let mut artifacts = Vec::new();
        if let Some(definition) = self.definition {
            artifacts.push(GenerationArtifact::BeanDefinition(definition));
        }
        if let Some(plan) = self.plan {
            artifacts.push(GenerationArtifact::InterceptionPlan(plan.finish()));
        }
        artifacts.extend(self.produced);

        debug!(
            type_name = %scope.type_name,
            strategy = scope.strategy.name(),
            artifacts = artifacts.len(),
            "type processed"
        );

        TypeOutput {
            type_name: scope.type_name.clone(),
            strategy: scope.strategy,
            artifacts,
            claims: self
                .claims
                .into_iter()
                .map(|(member, responsibility)| MemberClaim {
                    member,
                    responsibility,
                })
                .collect(),
            warnings: self.warnings,
            configuration: self.configuration,
        }
    }
}

/// `pkg.$Name$Definition`
pub(crate) fn definition_name(package: &str, simple_name: &str) -> String {
    if package.is_empty() {
        format!("${}$Definition", simple_name)
    } else {
        format!("{}.${}$Definition", package, simple_name)
    }
}

/// The singleton marker counts as a scope even without its meta-annotation
pub(crate) fn is_scope_entry(entry: &AnnotationEntry, markers: &Markers) -> bool {
    entry.has_stereotype(&markers.scope) || entry.has_stereotype(&markers.singleton)
}

pub(crate) fn has_declared_scope(meta: &AnnotationMetadata, markers: &Markers) -> bool {
    meta.entries()
        .iter()
        .any(|e| e.declared && is_scope_entry(e, markers))
}

pub(crate) fn scope_names<'m>(meta: &'m AnnotationMetadata, markers: &Markers) -> Vec<&'m str> {
    meta.entries()
        .iter()
        .filter(|e| is_scope_entry(e, markers))
        .map(|e| e.name.as_str())
        .collect()
}

/// Copy scope, qualifiers and annotation names from bean metadata
pub(crate) fn apply_bean_metadata(
    definition: &mut BeanDefinition,
    meta: &AnnotationMetadata,
    markers: &Markers,
) {
    definition.scope = scope_names(meta, markers).first().map(|s| s.to_string());
    definition.qualifiers = meta
        .annotation_names_by_stereotype(&markers.qualifier)
        .into_iter()
        .map(str::to_string)
        .collect();
    definition.annotations = meta
        .annotation_names()
        .into_iter()
        .map(str::to_string)
        .collect();
}

fn constructor_point(scope: &TypeScope<'_>) -> Result<Option<ConstructorPoint>, ProcessingError> {
    let Some(constructor) = scope.ty.constructor.as_ref() else {
        return Ok(None);
    };
    let meta = scope.resolver.for_constructor(constructor);
    let requires_reflection = scope.requires_reflection(&constructor.modifiers, None, &meta, || {
        scope.ty.constructor_ref()
    })?;
    Ok(Some(ConstructorPoint {
        parameters: constructor.params.clone(),
        requires_reflection,
    }))
}

fn new_definition(scope: &TypeScope<'_>) -> Result<BeanDefinition, ProcessingError> {
    if scope.ty.package.is_empty() {
        return Err(ProcessingError::DefaultPackage {
            element: scope.ty.element_ref(),
        });
    }
    let mut definition = BeanDefinition::new(
        definition_name(&scope.ty.package, &scope.ty.name),
        TypeRef::named(scope.type_name.as_str()),
        scope.ty.element_ref(),
    );
    definition.constructor = constructor_point(scope)?;
    apply_bean_metadata(&mut definition, &scope.type_meta, scope.markers());
    Ok(definition)
}

/// Classify one declared type
pub(crate) fn process_type(
    model: &dyn ProgramModel,
    config: &ProcessorConfig,
    ty: &DeclaredType,
) -> Result<TypeOutput, ProcessingError> {
    let resolver = MetadataResolver::new(model);
    let type_meta = resolver.for_type(ty);
    let strategy = strategy::select(model, config, &resolver, ty, &type_meta)?;
    debug!(type_name = %ty.qualified_name(), strategy = strategy.name(), "strategy selected");

    let Some(table) = strategy.rules() else {
        return Ok(TypeOutput::skipped(ty.qualified_name()));
    };

    let scope = TypeScope::new(model, config, resolver, ty, strategy, type_meta);
    let mut acc = Accumulator::default();

    match strategy {
        Strategy::IntroductionInterface | Strategy::IntroductionOverAop { .. } => {
            if ty.package.is_empty() {
                return Err(ProcessingError::DefaultPackage {
                    element: ty.element_ref(),
                });
            }
            let mut plan = InterceptionPlanBuilder::for_introduction(&scope);
            if !ty.is_interface() {
                plan.definition_mut().constructor = constructor_point(&scope)?;
            }
            acc.plan = Some(plan);
        }
        Strategy::DeclaredBean { is_aop_proxy }
        | Strategy::Factory { is_aop_proxy } => {
            acc.definition = Some(new_definition(&scope)?);
            if is_aop_proxy {
                acc.plan_for(&scope)?;
            }
        }
        Strategy::ConfigurationProperties => {
            acc.definition = Some(new_definition(&scope)?);
        }
        Strategy::Skip => {}
    }

    members::visit_members(&scope, &mut acc, table)?;
    Ok(acc.finish(&scope))
}
