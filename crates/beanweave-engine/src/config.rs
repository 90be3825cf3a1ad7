//! Processor configuration (`beanweave.toml`)
//!
//! ```toml
//! [processor]
//! default-proxy-target-mode = "warn"
//! require-reflective-access = false
//!
//! [markers]
//! inject = "javax.inject.Inject"
//! foreign-singletons = ["groovy.lang.Singleton"]
//! ```
//!
//! Every marker name the engine recognizes can be overridden in `[markers]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Default qualified names of the recognized markers
pub mod names {
    pub const INJECT: &str = "inject.Inject";
    pub const QUALIFIER: &str = "inject.Qualifier";
    pub const NAMED: &str = "inject.Named";
    pub const SCOPE: &str = "inject.Scope";
    pub const SINGLETON: &str = "inject.Singleton";
    pub const FOREIGN_SINGLETON: &str = "groovy.lang.Singleton";
    pub const BEAN: &str = "context.Bean";
    pub const DEFAULT_SCOPE: &str = "context.DefaultScope";
    pub const FACTORY: &str = "context.Factory";
    pub const EXECUTABLE: &str = "context.Executable";
    pub const VALUE: &str = "context.Value";
    pub const PROPERTY: &str = "context.Property";
    pub const CONFIGURATION_READER: &str = "context.ConfigurationReader";
    pub const EACH_PROPERTY: &str = "context.EachProperty";
    pub const CONFIGURATION_BUILDER: &str = "context.ConfigurationBuilder";
    pub const POST_CONSTRUCT: &str = "annotation.PostConstruct";
    pub const PRE_DESTROY: &str = "annotation.PreDestroy";
    pub const AROUND: &str = "aop.Around";
    pub const INTRODUCTION: &str = "aop.Introduction";
    pub const ADAPTER: &str = "aop.Adapter";
    pub const INTERCEPTOR: &str = "aop.Interceptor";
    pub const REFLECTIVE_ACCESS: &str = "core.ReflectiveAccess";
    pub const IGNORED: &str = "core.Ignored";
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// What to do when an advised produced type has a constructor with parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyTargetMode {
    /// Construct the proxy with null/zero arguments
    Allow,
    /// Like `Allow`, but report a warning
    Warn,
    /// Reject the produced type
    #[default]
    Error,
}

impl FromStr for ProxyTargetMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(ProxyTargetMode::Allow),
            "warn" => Ok(ProxyTargetMode::Warn),
            "error" => Ok(ProxyTargetMode::Error),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown proxy target mode: {}. Expected allow, warn or error",
                other
            ))),
        }
    }
}

impl fmt::Display for ProxyTargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyTargetMode::Allow => write!(f, "allow"),
            ProxyTargetMode::Warn => write!(f, "warn"),
            ProxyTargetMode::Error => write!(f, "error"),
        }
    }
}

/// Qualified names of the markers the engine recognizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Markers {
    pub inject: String,
    pub qualifier: String,
    pub named: String,
    pub scope: String,
    pub singleton: String,
    /// Singleton markers from a foreign namespace, rejected on beans
    pub foreign_singletons: Vec<String>,
    pub bean: String,
    pub default_scope: String,
    pub factory: String,
    pub executable: String,
    pub value: String,
    pub property: String,
    pub configuration_reader: String,
    pub each_property: String,
    pub configuration_builder: String,
    pub post_construct: String,
    pub pre_destroy: String,
    pub around: String,
    pub introduction: String,
    pub adapter: String,
    /// Supertype implemented by interceptors
    pub interceptor: String,
    pub reflective_access: String,
    pub ignored: String,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            inject: names::INJECT.to_string(),
            qualifier: names::QUALIFIER.to_string(),
            named: names::NAMED.to_string(),
            scope: names::SCOPE.to_string(),
            singleton: names::SINGLETON.to_string(),
            foreign_singletons: vec![names::FOREIGN_SINGLETON.to_string()],
            bean: names::BEAN.to_string(),
            default_scope: names::DEFAULT_SCOPE.to_string(),
            factory: names::FACTORY.to_string(),
            executable: names::EXECUTABLE.to_string(),
            value: names::VALUE.to_string(),
            property: names::PROPERTY.to_string(),
            configuration_reader: names::CONFIGURATION_READER.to_string(),
            each_property: names::EACH_PROPERTY.to_string(),
            configuration_builder: names::CONFIGURATION_BUILDER.to_string(),
            post_construct: names::POST_CONSTRUCT.to_string(),
            pre_destroy: names::PRE_DESTROY.to_string(),
            around: names::AROUND.to_string(),
            introduction: names::INTRODUCTION.to_string(),
            adapter: names::ADAPTER.to_string(),
            interceptor: names::INTERCEPTOR.to_string(),
            reflective_access: names::REFLECTIVE_ACCESS.to_string(),
            ignored: names::IGNORED.to_string(),
        }
    }
}

impl Markers {
    fn named_markers(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("inject", self.inject.as_str()),
            ("qualifier", self.qualifier.as_str()),
            ("named", self.named.as_str()),
            ("scope", self.scope.as_str()),
            ("singleton", self.singleton.as_str()),
            ("bean", self.bean.as_str()),
            ("default-scope", self.default_scope.as_str()),
            ("factory", self.factory.as_str()),
            ("executable", self.executable.as_str()),
            ("value", self.value.as_str()),
            ("property", self.property.as_str()),
            ("configuration-reader", self.configuration_reader.as_str()),
            ("each-property", self.each_property.as_str()),
            ("configuration-builder", self.configuration_builder.as_str()),
            ("post-construct", self.post_construct.as_str()),
            ("pre-destroy", self.pre_destroy.as_str()),
            ("around", self.around.as_str()),
            ("introduction", self.introduction.as_str()),
            ("adapter", self.adapter.as_str()),
            ("interceptor", self.interceptor.as_str()),
            ("reflective-access", self.reflective_access.as_str()),
            ("ignored", self.ignored.as_str()),
        ]
    }
}

/// `[processor]` settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProcessorSettings {
    /// Mode used when an advised produced type does not set one
    pub default_proxy_target_mode: ProxyTargetMode,
    /// Reject injection points that need reflection but lack the reflective-access marker
    pub require_reflective_access: bool,
}

/// Full processor configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub processor: ProcessorSettings,
    pub markers: Markers,
}

impl ProcessorConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ProcessorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, name) in self.markers.named_markers() {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Marker '{}' cannot be empty",
                    key
                )));
            }
            if name.chars().any(char::is_whitespace) {
                return Err(ConfigError::ValidationError(format!(
                    "Marker '{}' is not a qualified name: {}",
                    key, name
                )));
            }
        }
        if self
            .markers
            .foreign_singletons
            .iter()
            .any(|n| *n == self.markers.singleton)
        {
            return Err(ConfigError::ValidationError(format!(
                "Foreign singleton list cannot contain the singleton marker {}",
                self.markers.singleton
            )));
        }
        Ok(())
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }
}
