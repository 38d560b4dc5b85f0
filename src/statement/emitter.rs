//! Statement rows built from a reconciliation result.

use serde::Serialize;

use crate::models::ReconciliationResult;

/// Column headers of the billing statement, in output order.
pub const STATEMENT_HEADERS: [&str; 12] = [
    "품명",
    "규격",
    "수량",
    "단가",
    "공급가액",
    "세액",
    "비고",
    "합성 단가",
    "mer 수",
    "합성비",
    "Modification",
    "정제",
];

/// One line of the billing statement.
///
/// The first seven fields are the customer-facing columns; the rest expose the
/// cost components for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementRow {
    /// Oligo name (품명).
    pub item_name: String,
    /// Tier with its unit, e.g. `0.2umole` (규격).
    pub spec: String,
    /// Always 1 (수량).
    pub quantity: u32,
    /// Grouped expected price (단가).
    pub unit_price: String,
    /// Grouped expected price (공급가액).
    pub supply_amount: String,
    /// Grouped tax (세액).
    pub tax: String,
    /// The order identifier (비고).
    pub remark: String,
    /// Synthesis price per monomer (합성 단가).
    pub synthesis_unit_cost: i64,
    /// Oligo length (mer 수).
    pub length: u32,
    /// Synthesis cost for the full length (합성비).
    pub synthesis_subtotal: i64,
    /// Modification cost.
    pub modification: i64,
    /// Purification cost (정제).
    pub purification: i64,
}

/// Formats an integer with `,` between every group of three digits.
///
/// # Example
///
/// ```
/// use oligo_billing::statement::format_grouped;
///
/// assert_eq!(format_grouped(20800), "20,800");
/// assert_eq!(format_grouped(999), "999");
/// assert_eq!(format_grouped(-1234567), "-1,234,567");
/// ```
pub fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Builds one statement row per oligo, in the result's key order.
///
/// `unit_label` is appended to the tier in the spec column.
pub fn build_statement(result: &ReconciliationResult, unit_label: &str) -> Vec<StatementRow> {
    result
        .per_line
        .iter()
        .map(|(name, breakdown)| StatementRow {
            item_name: name.clone(),
            spec: format!("{}{}", breakdown.tier, unit_label),
            quantity: 1,
            unit_price: format_grouped(breakdown.expected_price),
            supply_amount: format_grouped(breakdown.expected_price),
            tax: format_grouped(breakdown.tax),
            remark: result.order_id.clone(),
            synthesis_unit_cost: breakdown.synthesis_unit_cost,
            length: breakdown.length,
            synthesis_subtotal: breakdown.synthesis_subtotal,
            modification: breakdown.modification_cost,
            purification: breakdown.purification_cost,
        })
        .collect()
}
