//! Rulebook loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the pricing
//! rulebook from a YAML file.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{
    CatalogLayout, MatcherConfig, ORDER_PLACEHOLDER, PricingRules, RulebookConfig,
    StatementConfig, TIER_PLACEHOLDER,
};

/// Loads and provides access to the pricing rulebook.
///
/// # Example
///
/// ```no_run
/// use oligo_billing::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/rulebook.yaml")?;
/// println!("Synthesis label: {}", loader.pricing().synthesis_label);
/// # Ok::<(), oligo_billing::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: RulebookConfig,
}

impl ConfigLoader {
    /// Loads the rulebook from a YAML file.
    ///
    /// Returns `ConfigNotFound` if the file cannot be read, and
    /// `ConfigParseError` if it is not valid YAML or breaks a rulebook rule
    /// (non-positive tax divisor, label template without `{tier}`, statement
    /// file name without `{order}`).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let config = Self::from_yaml_str(&content).map_err(|e| match e {
            EngineError::ConfigParseError { message, .. } => EngineError::ConfigParseError {
                path: path_str.clone(),
                message,
            },
            other => other,
        })?;

        debug!(path = %path_str, "Loaded rulebook");
        Ok(config)
    }

    /// Parses a rulebook from YAML text.
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        let config: RulebookConfig =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        Self::from_config(config)
    }

    /// Wraps an already-built rulebook after validating it.
    pub fn from_config(config: RulebookConfig) -> EngineResult<Self> {
        Self::validate(&config)?;
        Ok(Self { config })
    }

    fn validate(config: &RulebookConfig) -> EngineResult<()> {
        let invalid = |message: String| EngineError::ConfigParseError {
            path: "<inline>".to_string(),
            message,
        };

        if config.pricing.tax_divisor <= 0 {
            return Err(invalid(format!(
                "pricing.tax_divisor must be positive, got {}",
                config.pricing.tax_divisor
            )));
        }
        for (field, template) in [
            ("pricing.synthesis_label", &config.pricing.synthesis_label),
            ("pricing.purification_label", &config.pricing.purification_label),
        ] {
            if !template.contains(TIER_PLACEHOLDER) {
                return Err(invalid(format!("{field} must contain {TIER_PLACEHOLDER}")));
            }
        }
        if !config.statement.file_name.contains(ORDER_PLACEHOLDER) {
            return Err(invalid(format!(
                "statement.file_name must contain {ORDER_PLACEHOLDER}"
            )));
        }
        Ok(())
    }

    /// Returns the underlying rulebook.
    pub fn config(&self) -> &RulebookConfig {
        &self.config
    }

    /// Returns the billing table layout.
    pub fn catalog(&self) -> &CatalogLayout {
        &self.config.catalog
    }

    /// Returns the pricing rules.
    pub fn pricing(&self) -> &PricingRules {
        &self.config.pricing
    }

    /// Returns the matcher settings.
    pub fn matcher(&self) -> &MatcherConfig {
        &self.config.matcher
    }

    /// Returns the statement settings.
    pub fn statement(&self) -> &StatementConfig {
        &self.config.statement
    }
}
