//! Modification cost resolution.
//!
//! The 5'/3' modification pair of an oligo is priced as one catalog row, but
//! the row's description rarely matches the order's labels exactly. This
//! module narrows the catalog to modification candidates and, when more than
//! one remains, asks a [`BestMatch`] which row the order means.

use tracing::debug;

use crate::config::PricingRules;
use crate::error::{EngineError, EngineResult};
use crate::matching::BestMatch;
use crate::models::{AuditStep, CatalogLineItem, CatalogTable};

/// How the modification cost was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationSource {
    /// Neither end is modified; no catalog row applies.
    Unmodified,
    /// Exactly one candidate remained, so no matcher call was made.
    SingleCandidate,
    /// The best-match service chose among several candidates.
    Matched,
}

/// The result of resolving a modification cost.
#[derive(Debug, Clone)]
pub struct ModificationCostResult {
    /// The price of the chosen modification row (0 when unmodified).
    pub cost: i64,
    /// How the price was resolved.
    pub source: ModificationSource,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// The matcher query for a modification pair, e.g. ``5`FAM-3`BHQ1``.
///
/// # Example
///
/// ```
/// use oligo_billing::calculation::modification_query;
///
/// assert_eq!(modification_query("FAM", "BHQ1"), "5`FAM-3`BHQ1");
/// ```
pub fn modification_query(mod5: &str, mod3: &str) -> String {
    format!("5`{mod5}-3`{mod3}")
}

/// Returns the rows that can price a modification: every row that is not a
/// synthesis or purification service row, in table order.
pub fn modification_candidates<'a>(
    table: &'a CatalogTable,
    rules: &PricingRules,
) -> Vec<&'a CatalogLineItem> {
    table
        .items()
        .iter()
        .filter(|item| !rules.is_service_row(&item.description))
        .collect()
}

/// Resolves the price of a 5'/3' modification pair.
///
/// - Both labels empty: cost 0, the catalog is not consulted.
/// - One candidate: its price, without calling `matcher`.
/// - Several candidates: `matcher` picks one for the query
///   ``5`{mod5}-3`{mod3}``.
///
/// # Arguments
///
/// * `table` - The normalized billing table
/// * `mod5` - The 5' modification label, empty when unmodified
/// * `mod3` - The 3' modification label, empty when unmodified
/// * `matcher` - Picks a row when several candidates remain
/// * `rules` - Pricing rules naming the service rows to exclude
/// * `oligo` - The order line's oligo name, recorded in the audit step
/// * `step_number` - The number to give the audit step
///
/// # Returns
///
/// Returns a `ModificationCostResult` with the cost, how it was resolved and an
/// audit step, or an error if:
/// - A modification is requested but the catalog has no candidate rows
///   (`AmbiguousCatalogEntry`)
/// - The matcher fails or answers badly (`MatchingService`, `IndexOutOfRange`)
pub fn resolve_modification_cost(
    table: &CatalogTable,
    mod5: &str,
    mod3: &str,
    matcher: &dyn BestMatch,
    rules: &PricingRules,
    oligo: &str,
    step_number: u32,
) -> EngineResult<ModificationCostResult> {
    let query = modification_query(mod5, mod3);

    if mod5.is_empty() && mod3.is_empty() {
        return Ok(ModificationCostResult {
            cost: 0,
            source: ModificationSource::Unmodified,
            audit_step: audit_step(
                oligo,
                step_number,
                &query,
                &[],
                None,
                0,
                "No modification requested",
            ),
        });
    }

    let candidates = modification_candidates(table, rules);
    let descriptions: Vec<&str> = candidates.iter().map(|c| c.description.as_str()).collect();

    let (index, source) = match candidates.len() {
        0 => {
            return Err(EngineError::AmbiguousCatalogEntry {
                label: query,
                matches: 0,
            });
        }
        1 => (0, ModificationSource::SingleCandidate),
        _ => (
            matcher.best_match_index(&descriptions, &query)?,
            ModificationSource::Matched,
        ),
    };

    let chosen = candidates.get(index).ok_or(EngineError::IndexOutOfRange {
        index: index as i64,
        len: candidates.len(),
    })?;

    debug!(
        oligo = %oligo,
        query = %query,
        chosen = %chosen.description,
        cost = chosen.unit_price,
        ?source,
        "Resolved modification cost"
    );

    let reasoning = match source {
        ModificationSource::SingleCandidate => {
            format!("Only one modification row, '{}'", chosen.description)
        }
        _ => format!(
            "Matcher chose '{}' (index {}) for '{}'",
            chosen.description, index, query
        ),
    };

    Ok(ModificationCostResult {
        cost: chosen.unit_price,
        source,
        audit_step: audit_step(
            oligo,
            step_number,
            &query,
            &descriptions,
            Some(index),
            chosen.unit_price,
            &reasoning,
        ),
    })
}

fn audit_step(
    oligo: &str,
    step_number: u32,
    query: &str,
    candidates: &[&str],
    index: Option<usize>,
    cost: i64,
    reasoning: &str,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "modification_match".to_string(),
        rule_name: "Modification Cost Match".to_string(),
        oligo: oligo.to_string(),
        input: serde_json::json!({
            "query": query,
            "candidates": candidates,
        }),
        output: serde_json::json!({
            "index": index,
            "cost": cost,
        }),
        reasoning: reasoning.to_string(),
    }
}
