//! Configuration types for the pricing rulebook.
//!
//! This module contains the strongly-typed configuration structures that are
//! deserialized from the rulebook YAML file. Every field has a default, so an
//! empty file (or no file at all) yields the production rulebook.

use serde::Deserialize;

use crate::models::QuantityTier;

/// Placeholder substituted with the tier label in label templates.
pub const TIER_PLACEHOLDER: &str = "{tier}";

/// Placeholder substituted with the order id in the statement file name.
pub const ORDER_PLACEHOLDER: &str = "{order}";

/// Physical layout of the billing table as extracted from the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogLayout {
    /// Which detected table in the document is the billing table (zero-based).
    pub table_index: usize,
    /// Positional columns that carry no pricing information.
    pub dropped_columns: Vec<usize>,
    /// Number of summary/footer rows at the bottom of the table.
    pub trailer_rows: usize,
    /// Header of the unit price column.
    pub unit_price_column: String,
    /// Header of the supplied amount column.
    pub supplied_amount_column: String,
    /// Header of the tax amount column.
    pub tax_amount_column: String,
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self {
            table_index: 1,
            dropped_columns: vec![1, 2],
            trailer_rows: 2,
            unit_price_column: "단가".to_string(),
            supplied_amount_column: "공급가액".to_string(),
            tax_amount_column: "세액".to_string(),
        }
    }
}

/// Label vocabulary and arithmetic rules for pricing an oligo.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PricingRules {
    /// Exact description of the synthesis service row, with `{tier}`.
    pub synthesis_label: String,
    /// Exact description of the purification service row, with `{tier}`.
    pub purification_label: String,
    /// Rows whose description contains any of these are never modification
    /// candidates.
    pub excluded_keywords: Vec<String>,
    /// Price-to-tax ratio; tax is `price / tax_divisor` floored.
    pub tax_divisor: i64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            synthesis_label: "Modified primer synthesis {tier} umoles".to_string(),
            purification_label: "Modified {tier} umoles oligo purification HPLC".to_string(),
            excluded_keywords: vec!["synthesis".to_string(), "purification".to_string()],
            tax_divisor: 10,
        }
    }
}

impl PricingRules {
    /// The synthesis row description for a tier.
    ///
    /// # Example
    ///
    /// ```
    /// use oligo_billing::config::PricingRules;
    /// use oligo_billing::models::QuantityTier;
    ///
    /// let rules = PricingRules::default();
    /// assert_eq!(
    ///     rules.synthesis_label_for(QuantityTier::PointTwo),
    ///     "Modified primer synthesis 0.2 umoles"
    /// );
    /// ```
    pub fn synthesis_label_for(&self, tier: QuantityTier) -> String {
        self.synthesis_label.replace(TIER_PLACEHOLDER, tier.label())
    }

    /// The purification row description for a tier.
    pub fn purification_label_for(&self, tier: QuantityTier) -> String {
        self.purification_label.replace(TIER_PLACEHOLDER, tier.label())
    }

    /// Returns true if a description names one of the excluded service rows.
    pub fn is_service_row(&self, description: &str) -> bool {
        self.excluded_keywords
            .iter()
            .any(|keyword| description.contains(keyword.as_str()))
    }
}

/// Settings for the remote best-match backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    pub base_url: String,
    /// Chat model name.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Replaces the built-in instruction block when set.
    pub instruction: Option<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            instruction: None,
        }
    }
}

/// Settings for the emitted billing statement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    /// Output file name, with `{order}`.
    pub file_name: String,
    /// Unit appended to the tier in the spec column.
    pub unit_label: String,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            file_name: "거래명세서-{order}.xlsx".to_string(),
            unit_label: "umole".to_string(),
        }
    }
}

impl StatementConfig {
    /// The statement file name for an order.
    pub fn file_name_for(&self, order_id: &str) -> String {
        self.file_name.replace(ORDER_PLACEHOLDER, order_id)
    }
}

/// The complete rulebook loaded from YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RulebookConfig {
    /// Billing table layout.
    pub catalog: CatalogLayout,
    /// Pricing vocabulary and arithmetic.
    pub pricing: PricingRules,
    /// Best-match backend settings.
    pub matcher: MatcherConfig,
    /// Statement output settings.
    pub statement: StatementConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels_for_both_tiers() {
        let rules = PricingRules::default();
        assert_eq!(
            rules.synthesis_label_for(QuantityTier::One),
            "Modified primer synthesis 1 umoles"
        );
        assert_eq!(
            rules.purification_label_for(QuantityTier::One),
            "Modified 1 umoles oligo purification HPLC"
        );
        assert_eq!(
            rules.purification_label_for(QuantityTier::PointTwo),
            "Modified 0.2 umoles oligo purification HPLC"
        );
    }

    #[test]
    fn test_service_rows_are_detected_by_keyword() {
        let rules = PricingRules::default();
        assert!(rules.is_service_row("Modified primer synthesis 1 umoles"));
        assert!(rules.is_service_row("Modified 1 umoles oligo purification HPLC"));
        assert!(!rules.is_service_row("5`FAM-3`BHQ1"));
    }

    #[test]
    fn test_statement_file_name() {
        let statement = StatementConfig::default();
        assert_eq!(statement.file_name_for("A-77"), "거래명세서-A-77.xlsx");
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = "pricing:\n  tax_divisor: 11\n";
        let config: RulebookConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.pricing.tax_divisor, 11);
        assert_eq!(config.pricing.excluded_keywords.len(), 2);
        assert_eq!(config.catalog.trailer_rows, 2);
        assert_eq!(config.matcher.model, "gpt-3.5-turbo");
    }
}
