//! Reconciliation result models.
//!
//! This module contains the [`ReconciliationResult`] type and its associated
//! structures: the per-oligo [`CostBreakdown`] and the audit trace recording how
//! every cost component was resolved.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::QuantityTier;

/// The resolved cost components of one oligo.
///
/// # Example
///
/// ```
/// use oligo_billing::models::{CostBreakdown, QuantityTier};
///
/// let breakdown = CostBreakdown::new(QuantityTier::One, 20, 1000, 300, 500, 10).unwrap();
/// assert_eq!(breakdown.synthesis_subtotal, 20_000);
/// assert_eq!(breakdown.expected_price, 20_800);
/// assert_eq!(breakdown.tax, 2_080);
/// assert_eq!(breakdown.total_with_tax(), Some(22_880));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// The validated synthesis scale.
    pub tier: QuantityTier,
    /// Oligo length in monomers.
    pub length: u32,
    /// Synthesis price per monomer.
    pub synthesis_unit_cost: i64,
    /// Price of the 5'/3' modification pair.
    pub modification_cost: i64,
    /// Purification price.
    pub purification_cost: i64,
    /// `synthesis_unit_cost * length`.
    pub synthesis_subtotal: i64,
    /// Subtotal plus modification plus purification.
    pub expected_price: i64,
    /// Tax on the expected price, floored to whole won.
    pub tax: i64,
}

impl CostBreakdown {
    /// Derives subtotal, price and tax from the three unit costs.
    ///
    /// `tax_divisor` is the price-to-tax ratio (10 for a 10% VAT).
    ///
    /// Returns `None` if any intermediate amount overflows `i64` or
    /// `tax_divisor` is zero.
    pub fn new(
        tier: QuantityTier,
        length: u32,
        synthesis_unit_cost: i64,
        modification_cost: i64,
        purification_cost: i64,
        tax_divisor: i64,
    ) -> Option<Self> {
        let synthesis_subtotal = synthesis_unit_cost.checked_mul(i64::from(length))?;
        let expected_price = synthesis_subtotal
            .checked_add(modification_cost)?
            .checked_add(purification_cost)?;
        let tax = expected_price.checked_div_euclid(tax_divisor)?;
        let breakdown = Self {
            tier,
            length,
            synthesis_unit_cost,
            modification_cost,
            purification_cost,
            synthesis_subtotal,
            expected_price,
            tax,
        };
        breakdown.total_with_tax().map(|_| breakdown)
    }

    /// Price plus tax, the amount this line contributes to the expected total.
    ///
    /// `None` only for a hand-built breakdown whose sum overflows.
    pub fn total_with_tax(&self) -> Option<i64> {
        self.expected_price.checked_add(self.tax)
    }
}

/// A single step in the audit trace recording a resolution decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The oligo this step belongs to, empty for order-wide steps.
    pub oligo: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during reconciliation.
///
/// Warnings never abort the run; they flag results a reviewer should check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of resolution steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during reconciliation.
    pub warnings: Vec<AuditWarning>,
    /// Number of calls made to the best-match service.
    pub matcher_calls: u32,
    /// The total run duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// The number to give the next recorded step.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }
}

/// The outcome of reconciling one order against its billing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the reconciliation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the reconciliation.
    pub engine_version: String,
    /// The order identifier (수주번호).
    pub order_id: String,
    /// Cost breakdown per oligo name, in first-seen order.
    pub per_line: IndexMap<String, CostBreakdown>,
    /// Sum of price plus tax over every order line processed.
    pub expected_total: i64,
    /// Supplied plus tax amounts over the billing table.
    pub actual_total: i64,
    /// Whether the two totals are exactly equal.
    pub matches: bool,
    /// Complete audit trace of resolution decisions.
    pub audit_trace: AuditTrace,
}

impl ReconciliationResult {
    /// The single human-readable verdict line printed at the end of a run.
    ///
    /// # Example
    ///
    /// ```
    /// use oligo_billing::models::{AuditTrace, ReconciliationResult};
    ///
    /// let result = ReconciliationResult {
    ///     run_id: uuid::Uuid::nil(),
    ///     timestamp: chrono::Utc::now(),
    ///     engine_version: "0.1.0".to_string(),
    ///     order_id: "SO-1".to_string(),
    ///     per_line: Default::default(),
    ///     expected_total: 0,
    ///     actual_total: 0,
    ///     matches: true,
    ///     audit_trace: AuditTrace::default(),
    /// };
    /// assert_eq!(
    ///     result.verdict_message(),
    ///     "수주번호 [SO-1] 금액이 정상적으로 처리되었습니다."
    /// );
    /// ```
    pub fn verdict_message(&self) -> String {
        if self.matches {
            format!("수주번호 [{}] 금액이 정상적으로 처리되었습니다.", self.order_id)
        } else {
            format!(
                "수주번호 [{}] 금액에 오차가 발생하였습니다. 확인이 필요합니다.",
                self.order_id
            )
        }
    }

    /// Expected minus actual total; zero when the totals match.
    pub fn discrepancy(&self) -> i64 {
        self.expected_total - self.actual_total
    }
}
