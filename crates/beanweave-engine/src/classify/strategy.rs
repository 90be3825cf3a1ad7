//! Strategy selection for a declared type

use super::rules::{self, RuleTable};
use crate::annotations::{AnnotationMetadata, MetadataResolver};
use crate::config::ProcessorConfig;
use crate::error::ProcessingError;
use crate::model::{DeclaredType, Member, ProgramModel};
use crate::types::SubtypingContext;
use serde::Serialize;

/// How a declared type is turned into artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    /// Configuration-properties class
    ConfigurationProperties,
    /// Interface implemented entirely by introduction advice
    IntroductionInterface,
    /// Abstract or advised class with introduced abstract methods
    IntroductionOverAop { is_aop_proxy: bool },
    /// Class producing other beans
    Factory { is_aop_proxy: bool },
    /// Plain bean, possibly proxied
    DeclaredBean { is_aop_proxy: bool },
    /// Nothing to generate
    Skip,
}

impl Strategy {
    /// Whether every visible method of the type is advised by class-level advice
    pub fn is_aop_proxy(&self) -> bool {
        match self {
            Strategy::IntroductionOverAop { is_aop_proxy }
            | Strategy::Factory { is_aop_proxy }
            | Strategy::DeclaredBean { is_aop_proxy } => *is_aop_proxy,
            Strategy::ConfigurationProperties | Strategy::IntroductionInterface | Strategy::Skip => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ConfigurationProperties => "configuration-properties",
            Strategy::IntroductionInterface => "introduction-interface",
            Strategy::IntroductionOverAop { .. } => "introduction-over-aop",
            Strategy::Factory { .. } => "factory",
            Strategy::DeclaredBean { .. } => "declared-bean",
            Strategy::Skip => "skip",
        }
    }

    pub(crate) fn rules(&self) -> Option<&'static RuleTable> {
        match self {
            Strategy::ConfigurationProperties => Some(&rules::CONFIGURATION_PROPERTIES),
            Strategy::IntroductionInterface => Some(&rules::INTRODUCTION_INTERFACE),
            Strategy::IntroductionOverAop { .. } => Some(&rules::INTRODUCTION_OVER_AOP),
            Strategy::Factory { .. } => Some(&rules::FACTORY),
            Strategy::DeclaredBean { .. } => Some(&rules::DECLARED_BEAN),
            Strategy::Skip => None,
        }
    }
}

/// Standalone entry point for strategy selection
pub struct StrategyClassifier<'a> {
    model: &'a dyn ProgramModel,
    config: &'a ProcessorConfig,
    resolver: MetadataResolver<'a>,
}

impl<'a> StrategyClassifier<'a> {
    pub fn new(model: &'a dyn ProgramModel, config: &'a ProcessorConfig) -> Self {
        StrategyClassifier {
            model,
            config,
            resolver: MetadataResolver::new(model),
        }
    }

    pub fn classify(&self, ty: &DeclaredType) -> Result<Strategy, ProcessingError> {
        let meta = self.resolver.for_type(ty);
        select(self.model, self.config, &self.resolver, ty, &meta)
    }
}

/// Pick the strategy for `ty`; the first matching rule wins
pub(crate) fn select(
    model: &dyn ProgramModel,
    config: &ProcessorConfig,
    resolver: &MetadataResolver<'_>,
    ty: &DeclaredType,
    meta: &AnnotationMetadata,
) -> Result<Strategy, ProcessingError> {
    let markers = &config.markers;

    if meta.has_stereotype(&markers.configuration_reader) {
        return Ok(if ty.is_interface() {
            Strategy::IntroductionInterface
        } else {
            Strategy::ConfigurationProperties
        });
    }

    let is_interceptor = SubtypingContext::new(model).is_subtype(ty, &markers.interceptor);
    let is_aop_proxy =
        !is_interceptor && meta.has_declared_stereotype(&markers.around) && !ty.is_abstract();

    if !ty.is_abstract() && meta.has_stereotype(&markers.factory) {
        return Ok(Strategy::Factory { is_aop_proxy });
    }

    let is_introduction = meta.has_stereotype(&markers.introduction);
    if is_aop_proxy {
        return Ok(if is_introduction {
            Strategy::IntroductionOverAop { is_aop_proxy: true }
        } else {
            Strategy::DeclaredBean { is_aop_proxy: true }
        });
    }
    if is_introduction {
        return Ok(if ty.is_interface() {
            Strategy::IntroductionInterface
        } else {
            Strategy::IntroductionOverAop {
                is_aop_proxy: false,
            }
        });
    }

    if let Some(found) = markers
        .foreign_singletons
        .iter()
        .find(|name| meta.has_declared_annotation(name))
    {
        return Err(ProcessingError::ForeignSingleton {
            element: ty.element_ref(),
            found: found.clone(),
            expected: markers.singleton.clone(),
        });
    }

    let declared = is_declared_bean(resolver, config, ty, meta)
        || (!ty.is_abstract() && has_injection_points(resolver, config, ty));
    if declared {
        if ty.is_enum() {
            return Err(ProcessingError::EnumBean {
                element: ty.element_ref(),
            });
        }
        return Ok(Strategy::DeclaredBean {
            is_aop_proxy: false,
        });
    }

    Ok(Strategy::Skip)
}

fn is_declared_bean(
    resolver: &MetadataResolver<'_>,
    config: &ProcessorConfig,
    ty: &DeclaredType,
    meta: &AnnotationMetadata,
) -> bool {
    let markers = &config.markers;
    let stereotyped = [
        &markers.bean,
        &markers.scope,
        &markers.singleton,
        &markers.default_scope,
        &markers.executable,
        &markers.qualifier,
    ]
    .into_iter()
    .any(|marker| meta.has_stereotype(marker));

    stereotyped
        || ty.constructor.as_ref().is_some_and(|c| {
            resolver
                .for_constructor(c)
                .has_declared_stereotype(&markers.inject)
        })
}

fn has_injection_points(
    resolver: &MetadataResolver<'_>,
    config: &ProcessorConfig,
    ty: &DeclaredType,
) -> bool {
    let markers = &config.markers;
    ty.members.iter().any(|member| {
        if member.modifiers().is_static {
            return false;
        }
        let meta = resolver.for_member(member);
        match member {
            Member::Method(_) => meta.has_declared_stereotype(&markers.inject),
            Member::Field(_) => {
                meta.has_declared_stereotype(&markers.inject)
                    || meta.has_stereotype(&markers.value)
                    || meta.has_stereotype(&markers.property)
            }
        }
    })
}
