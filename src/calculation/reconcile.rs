//! Order reconciliation.
//!
//! Prices every order line from the billing table, accumulates the expected
//! grand total and compares it with the invoiced total.

use std::time::Instant;

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PricingRules;
use crate::error::{EngineError, EngineResult};
use crate::matching::BestMatch;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, CatalogTable, CostBreakdown, OligoOrderLine,
    QuantityTier, ReconciliationResult,
};

use super::exact_lookup::{resolve_purification_cost, resolve_synthesis_cost};
use super::modification::{ModificationSource, resolve_modification_cost};

/// Reconciles an order against its billing table.
///
/// Lines are processed strictly in order, one matcher call at a time. For each
/// line the tier is validated before any catalog lookup, then synthesis,
/// modification and purification costs are resolved and combined into a
/// [`CostBreakdown`]. A later line with the same oligo name replaces the
/// earlier breakdown but keeps its position.
///
/// A total mismatch is not an error: the result carries `matches = false` and
/// a `TOTAL_MISMATCH` warning.
///
/// # Arguments
///
/// * `order_id` - The order number the result is reported under
/// * `lines` - Order lines, in sheet order
/// * `table` - The normalized billing table
/// * `matcher` - Chooses modification rows when several candidates remain
/// * `rules` - Catalog labels and the tax divisor
///
/// # Returns
///
/// Returns a `ReconciliationResult` with per-oligo breakdowns, both totals and
/// the audit trace. The first failing line aborts the run with
/// `InvalidQuantityTier`, `AmbiguousCatalogEntry`, `MatchingService` or
/// `IndexOutOfRange`. Amounts too large for `i64` fail with `MalformedCatalog`.
///
/// # Example
///
/// ```
/// use oligo_billing::calculation::reconcile;
/// use oligo_billing::config::PricingRules;
/// use oligo_billing::error::EngineResult;
/// use oligo_billing::matching::BestMatch;
/// use oligo_billing::models::{CatalogLineItem, CatalogTable, OligoOrderLine};
/// use rust_decimal::Decimal;
///
/// struct First;
/// impl BestMatch for First {
///     fn best_match_index(&self, _: &[&str], _: &str) -> EngineResult<usize> {
///         Ok(0)
///     }
/// }
///
/// let table = CatalogTable::new(vec![
///     CatalogLineItem::new("Modified primer synthesis 1 umoles", 1000, 20_000, 2_000),
///     CatalogLineItem::new("Modified 1 umoles oligo purification HPLC", 500, 500, 50),
///     CatalogLineItem::new("5`FAM-3`BHQ1", 300, 300, 30),
/// ]);
/// let lines = vec![OligoOrderLine::new("P1", Decimal::ONE, 20, "FAM", "BHQ1")];
///
/// let result = reconcile("SO-1", &lines, &table, &First, &PricingRules::default()).unwrap();
/// assert_eq!(result.per_line["P1"].expected_price, 20_800);
/// assert_eq!(result.expected_total, 22_880);
/// assert!(result.matches);
/// ```
pub fn reconcile(
    order_id: &str,
    lines: &[OligoOrderLine],
    table: &CatalogTable,
    matcher: &dyn BestMatch,
    rules: &PricingRules,
) -> EngineResult<ReconciliationResult> {
    let start = Instant::now();
    let mut trace = AuditTrace::default();
    let mut per_line: IndexMap<String, CostBreakdown> = IndexMap::new();
    let mut expected_total: i64 = 0;

    info!(order_id = %order_id, lines = lines.len(), catalog_rows = table.len(), "Reconciling order");

    for line in lines {
        let breakdown = price_line(line, table, matcher, rules, &mut trace)?;
        expected_total = breakdown
            .total_with_tax()
            .and_then(|line_total| expected_total.checked_add(line_total))
            .ok_or_else(|| EngineError::MalformedCatalog {
                column: "expected_total".to_string(),
                message: format!("running total overflows after oligo '{}'", line.name),
            })?;

        if per_line.insert(line.name.clone(), breakdown).is_some() {
            warn!(oligo = %line.name, "Duplicate oligo name, keeping the later line");
            trace.warnings.push(AuditWarning {
                code: "DUPLICATE_OLIGO".to_string(),
                message: format!("Oligo '{}' appears more than once; later line kept", line.name),
                severity: "low".to_string(),
            });
        }
    }

    let actual_total = table.actual_total().ok_or_else(|| EngineError::MalformedCatalog {
        column: "actual_total".to_string(),
        message: "supplied plus tax amounts overflow".to_string(),
    })?;
    let matches = expected_total == actual_total;
    let difference = expected_total.saturating_sub(actual_total);

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "total_comparison".to_string(),
        rule_name: "Total Comparison".to_string(),
        oligo: String::new(),
        input: serde_json::json!({
            "expected_total": expected_total,
            "actual_total": actual_total,
        }),
        output: serde_json::json!({ "matches": matches }),
        reasoning: format!(
            "Expected {} vs invoiced {} ({})",
            expected_total,
            actual_total,
            if matches { "match" } else { "mismatch" }
        ),
    });

    if matches {
        info!(order_id = %order_id, total = expected_total, "Totals match");
    } else {
        warn!(
            order_id = %order_id,
            expected_total,
            actual_total,
            difference,
            "Totals do not match"
        );
        trace.warnings.push(AuditWarning {
            code: "TOTAL_MISMATCH".to_string(),
            message: format!(
                "Expected total {} differs from invoiced total {} by {}",
                expected_total, actual_total, difference
            ),
            severity: "high".to_string(),
        });
    }

    trace.duration_us = start.elapsed().as_micros() as u64;

    Ok(ReconciliationResult {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        order_id: order_id.to_string(),
        per_line,
        expected_total,
        actual_total,
        matches,
        audit_trace: trace,
    })
}

/// Prices a single order line, appending its audit steps to `trace`.
fn price_line(
    line: &OligoOrderLine,
    table: &CatalogTable,
    matcher: &dyn BestMatch,
    rules: &PricingRules,
    trace: &mut AuditTrace,
) -> EngineResult<CostBreakdown> {
    let tier = QuantityTier::from_amount(line.amount).ok_or_else(|| {
        EngineError::InvalidQuantityTier {
            oligo: line.name.clone(),
            value: line.amount.normalize().to_string(),
        }
    })?;

    let synthesis =
        resolve_synthesis_cost(table, tier, rules, &line.name, trace.next_step_number())?;
    trace.steps.push(synthesis.audit_step);

    let modification = resolve_modification_cost(
        table,
        &line.mod5,
        &line.mod3,
        matcher,
        rules,
        &line.name,
        trace.next_step_number(),
    )?;
    if modification.source == ModificationSource::Matched {
        trace.matcher_calls += 1;
    }
    trace.steps.push(modification.audit_step);

    let purification =
        resolve_purification_cost(table, tier, rules, &line.name, trace.next_step_number())?;
    trace.steps.push(purification.audit_step);

    let breakdown = CostBreakdown::new(
        tier,
        line.length,
        synthesis.unit_price,
        modification.cost,
        purification.unit_price,
        rules.tax_divisor,
    )
    .ok_or_else(|| EngineError::MalformedCatalog {
        column: "unit_price".to_string(),
        message: format!(
            "price of '{}' overflows: {} x {}mer + {} + {}",
            line.name, synthesis.unit_price, line.length, modification.cost, purification.unit_price
        ),
    })?;

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "line_price".to_string(),
        rule_name: "Line Price and Tax".to_string(),
        oligo: line.name.clone(),
        input: serde_json::json!({
            "length": line.length,
            "synthesis_unit_cost": breakdown.synthesis_unit_cost,
            "modification_cost": breakdown.modification_cost,
            "purification_cost": breakdown.purification_cost,
            "tax_divisor": rules.tax_divisor,
        }),
        output: serde_json::json!({
            "synthesis_subtotal": breakdown.synthesis_subtotal,
            "expected_price": breakdown.expected_price,
            "tax": breakdown.tax,
        }),
        reasoning: format!(
            "{} x {}mer + {} + {} = {}, tax {}",
            breakdown.synthesis_unit_cost,
            breakdown.length,
            breakdown.modification_cost,
            breakdown.purification_cost,
            breakdown.expected_price,
            breakdown.tax
        ),
    });

    info!(
        oligo = %line.name,
        tier = %tier,
        length = line.length,
        price = breakdown.expected_price,
        tax = breakdown.tax,
        "Priced order line"
    );

    Ok(breakdown)
}
