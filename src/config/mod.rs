//! Configuration loading for the reconciliation engine.
//!
//! The pricing rulebook describes the billing table layout, the fixed label
//! vocabulary for synthesis and purification rows, the tax rule, the
//! best-match backend and the statement output. It is loaded from a YAML
//! file; omitted fields fall back to the production defaults.
//!
//! # Example
//!
//! ```no_run
//! use oligo_billing::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/rulebook.yaml").unwrap();
//! println!("Tax divisor: {}", config.pricing().tax_divisor);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CatalogLayout, MatcherConfig, ORDER_PLACEHOLDER, PricingRules, RulebookConfig,
    StatementConfig, TIER_PLACEHOLDER,
};
