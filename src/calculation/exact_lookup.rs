//! Exact line-item lookup for synthesis and purification.
//!
//! Synthesis and purification rows use a fixed, controlled vocabulary, so a
//! lookup is an exact string comparison and anything other than a single hit
//! is a catalog anomaly.

use crate::config::PricingRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, CatalogTable, QuantityTier};

/// The result of an exact catalog lookup, including the price and audit step.
#[derive(Debug, Clone)]
pub struct ExactLookupResult {
    /// The unit price of the matched row.
    pub unit_price: i64,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
}

/// Looks up the per-monomer synthesis price for a tier.
///
/// # Arguments
///
/// * `table` - The normalized billing table
/// * `tier` - The validated synthesis scale of the order line
/// * `rules` - Pricing rules holding the synthesis label template
/// * `oligo` - The order line's oligo name, recorded in the audit step
/// * `step_number` - The number to give the audit step
///
/// # Returns
///
/// Returns an `ExactLookupResult` with the row's unit price and an audit step,
/// or `AmbiguousCatalogEntry` unless exactly one row's description equals the
/// synthesis label for `tier`.
///
/// # Example
///
/// ```
/// use oligo_billing::calculation::resolve_synthesis_cost;
/// use oligo_billing::config::PricingRules;
/// use oligo_billing::models::{CatalogLineItem, CatalogTable, QuantityTier};
///
/// let table = CatalogTable::new(vec![CatalogLineItem::new(
///     "Modified primer synthesis 1 umoles",
///     1000,
///     20_000,
///     2_000,
/// )]);
/// let result =
///     resolve_synthesis_cost(&table, QuantityTier::One, &PricingRules::default(), "P1", 1)
///         .unwrap();
/// assert_eq!(result.unit_price, 1000);
/// ```
pub fn resolve_synthesis_cost(
    table: &CatalogTable,
    tier: QuantityTier,
    rules: &PricingRules,
    oligo: &str,
    step_number: u32,
) -> EngineResult<ExactLookupResult> {
    let label = rules.synthesis_label_for(tier);
    lookup_exact(
        table,
        &label,
        tier,
        oligo,
        step_number,
        "synthesis_lookup",
        "Synthesis Cost Lookup",
    )
}

/// Looks up the purification price for a tier.
///
/// # Arguments
///
/// * `table` - The normalized billing table
/// * `tier` - The validated synthesis scale of the order line
/// * `rules` - Pricing rules holding the purification label template
/// * `oligo` - The order line's oligo name, recorded in the audit step
/// * `step_number` - The number to give the audit step
///
/// # Returns
///
/// Returns an `ExactLookupResult` with the row's unit price and an audit step,
/// or `AmbiguousCatalogEntry` unless exactly one row's description equals the
/// purification label for `tier`.
pub fn resolve_purification_cost(
    table: &CatalogTable,
    tier: QuantityTier,
    rules: &PricingRules,
    oligo: &str,
    step_number: u32,
) -> EngineResult<ExactLookupResult> {
    let label = rules.purification_label_for(tier);
    lookup_exact(
        table,
        &label,
        tier,
        oligo,
        step_number,
        "purification_lookup",
        "Purification Cost Lookup",
    )
}

fn lookup_exact(
    table: &CatalogTable,
    label: &str,
    tier: QuantityTier,
    oligo: &str,
    step_number: u32,
    rule_id: &str,
    rule_name: &str,
) -> EngineResult<ExactLookupResult> {
    let matches: Vec<_> = table
        .items()
        .iter()
        .filter(|item| item.description == label)
        .collect();

    let [item] = matches.as_slice() else {
        return Err(EngineError::AmbiguousCatalogEntry {
            label: label.to_string(),
            matches: matches.len(),
        });
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        oligo: oligo.to_string(),
        input: serde_json::json!({
            "tier": tier.label(),
            "label": label,
        }),
        output: serde_json::json!({
            "unit_price": item.unit_price,
        }),
        reasoning: format!("Catalog row '{}' priced at {}", label, item.unit_price),
    };

    Ok(ExactLookupResult {
        unit_price: item.unit_price,
        audit_step,
    })
}
