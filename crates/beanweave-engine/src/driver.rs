//! Compilation-unit driver
//!
//! Processes every candidate type of a program model. Types are independent:
//! an error aborts only the type that raised it.

use crate::annotations::MetadataResolver;
use crate::artifact::GenerationArtifact;
use crate::classify::{self, ConfigurationMetadata, Strategy, TypeOutput};
use crate::config::ProcessorConfig;
use crate::diagnostic::Diagnostic;
use crate::error::{ProcessingError, ProcessingWarning};
use crate::model::{DeclaredType, ProgramModel};
use tracing::{debug, warn};

/// Shared inputs for processing a compilation unit
#[derive(Clone, Copy)]
pub struct ProcessingContext<'a> {
    model: &'a dyn ProgramModel,
    config: &'a ProcessorConfig,
}

impl<'a> ProcessingContext<'a> {
    pub fn new(model: &'a dyn ProgramModel, config: &'a ProcessorConfig) -> Self {
        ProcessingContext { model, config }
    }

    pub fn model(&self) -> &'a dyn ProgramModel {
        self.model
    }

    pub fn config(&self) -> &'a ProcessorConfig {
        self.config
    }

    /// Strategy of `ty` without visiting its members
    pub fn classify(&self, ty: &DeclaredType) -> Result<Strategy, ProcessingError> {
        let resolver = MetadataResolver::new(self.model);
        let meta = resolver.for_type(ty);
        classify::strategy_for(self.model, self.config, &resolver, ty, &meta)
    }

    /// Classify `ty` and visit all of its members
    pub fn process_type(&self, ty: &DeclaredType) -> Result<TypeOutput, ProcessingError> {
        classify::process_type(self.model, self.config, ty)
    }

    /// Process every candidate type of the model, in model order
    pub fn process_unit(&self) -> UnitOutput {
        let mut unit = UnitOutput::default();
        for ty in self.model.declared_types() {
            match self.process_type(ty) {
                Ok(output) => {
                    unit.configuration.extend(output.configuration.iter().cloned());
                    unit.outputs.push(output);
                }
                Err(error) => {
                    warn!(type_name = %ty.qualified_name(), %error, "type rejected");
                    unit.errors.push(error);
                }
            }
        }
        debug!(
            types = unit.outputs.len(),
            errors = unit.errors.len(),
            properties = unit.configuration.len(),
            "unit processed"
        );
        unit
    }
}

/// Everything produced for a compilation unit
#[derive(Debug, Clone, Default)]
pub struct UnitOutput {
    /// Outputs of the types processed without error
    pub outputs: Vec<TypeOutput>,
    pub errors: Vec<ProcessingError>,
    pub configuration: ConfigurationMetadata,
}

impl UnitOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &GenerationArtifact> {
        self.outputs.iter().flat_map(|o| o.artifacts.iter())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ProcessingWarning> {
        self.outputs.iter().flat_map(|o| o.warnings.iter())
    }

    pub fn output_for(&self, type_name: &str) -> Option<&TypeOutput> {
        self.outputs.iter().find(|o| o.type_name == type_name)
    }

    /// Errors followed by warnings
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors
            .iter()
            .map(Diagnostic::from_processing_error)
            .chain(self.warnings().map(Diagnostic::from_processing_warning))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::names;
    use crate::model::{InMemoryModel, TypeBuilder};

    #[test]
    fn test_error_aborts_only_its_type() {
        let model = InMemoryModel::new()
            .with(TypeBuilder::class("Orphan").annotated(names::SINGLETON).build())
            .with(TypeBuilder::class("app.Service").annotated(names::SINGLETON).build());
        let config = ProcessorConfig::default();
        let unit = ProcessingContext::new(&model, &config).process_unit();

        assert!(unit.has_errors());
        assert!(matches!(unit.errors[0], ProcessingError::DefaultPackage { .. }));
        assert!(unit.output_for("app.Service").is_some());
        assert_eq!(unit.diagnostics().len(), 1);
    }

    #[test]
    fn test_skipped_types_have_no_artifacts() {
        let model = InMemoryModel::new().with(TypeBuilder::class("app.Dto").build());
        let config = ProcessorConfig::default();
        let unit = ProcessingContext::new(&model, &config).process_unit();
        assert_eq!(unit.artifacts().count(), 0);
        assert_eq!(unit.output_for("app.Dto").unwrap().strategy, Strategy::Skip);
    }
}
