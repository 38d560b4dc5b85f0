//! End-to-end processing of one order directory.
//!
//! This module wires the input readers, the engine and the statement writer
//! together in the order a run needs them.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::calculation::{normalize_catalog, reconcile};
use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::ingest::{discover_inputs, extract_billing_table, read_order_sheet};
use crate::matching::BestMatch;
use crate::models::{OligoOrderLine, RawTable, ReconciliationResult};
use crate::statement::{build_statement, write_statement};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct OrderOutcome {
    /// The reconciliation result, including the verdict.
    pub result: ReconciliationResult,
    /// Where the billing statement was written.
    pub statement_path: PathBuf,
}

/// Normalizes an extracted billing table and reconciles the order against it.
pub fn reconcile_tables(
    order_id: &str,
    lines: &[OligoOrderLine],
    raw: &RawTable,
    config: &ConfigLoader,
    matcher: &dyn BestMatch,
) -> EngineResult<ReconciliationResult> {
    let table = normalize_catalog(raw, config.catalog())?;
    reconcile(order_id, lines, &table, matcher, config.pricing())
}

/// Processes one order directory from discovery to the written statement.
///
/// A total mismatch still writes the statement; the verdict is carried in
/// [`OrderOutcome::result`].
pub fn process_order(
    order_dir: &Path,
    config: &ConfigLoader,
    matcher: &dyn BestMatch,
) -> EngineResult<OrderOutcome> {
    let start = Instant::now();

    let dir_name = order_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let statement_name = config.statement().file_name_for(&dir_name);

    let inputs = discover_inputs(order_dir, &statement_name)?;
    let lines = read_order_sheet(&inputs.order_sheet)?;
    let raw = extract_billing_table(&inputs.billing_pdf, config.catalog().table_index)?;

    let result = reconcile_tables(&inputs.order_id, &lines, &raw, config, matcher)?;

    let rows = build_statement(&result, &config.statement().unit_label);
    let statement_path = inputs.order_dir.join(&statement_name);
    write_statement(&rows, &statement_path)?;

    info!(
        order_id = %inputs.order_id,
        matches = result.matches,
        duration_ms = start.elapsed().as_millis() as u64,
        "Order processed"
    );

    Ok(OrderOutcome {
        result,
        statement_path,
    })
}
