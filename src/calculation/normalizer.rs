//! Billing table normalization.
//!
//! The normalizer is the single boundary between raw extracted cells and typed
//! catalog records. Its positional assumptions mirror the supplier's document
//! template: if the template changes, the wrong columns get dropped.

use tracing::debug;

use crate::config::CatalogLayout;
use crate::error::{EngineError, EngineResult};
use crate::models::{CatalogLineItem, CatalogTable, RawTable};

/// Converts an extracted billing table into a [`CatalogTable`].
///
/// Steps, in order:
/// 1. Drop the positional columns listed in `layout.dropped_columns`.
/// 2. Drop the last `layout.trailer_rows` rows.
/// 3. Take the first remaining column as the item description.
/// 4. Parse the unit price, supplied amount and tax columns (located by header
///    name) as grouped integers.
///
/// # Arguments
///
/// * `raw` - The table as extracted from the billing document
/// * `layout` - Column and trailer positions of the supplier's template
///
/// # Returns
///
/// Returns the typed `CatalogTable` in document order, or `MalformedCatalog`
/// when a currency header is absent or a currency cell is not a clean grouped
/// integer such as `12,500`.
///
/// # Example
///
/// ```
/// use oligo_billing::calculation::normalize_catalog;
/// use oligo_billing::config::CatalogLayout;
/// use oligo_billing::models::RawTable;
///
/// let raw = RawTable::from_cells(
///     &["품명", "규격", "수량", "단가", "공급가액", "세액"],
///     &[
///         &["5`FAM-3`BHQ1", "EA", "1", "30,000", "30,000", "3,000"],
///         &["소계", "", "", "", "30,000", "3,000"],
///         &["합계", "", "", "", "33,000", ""],
///     ],
/// );
/// let table = normalize_catalog(&raw, &CatalogLayout::default()).unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.items()[0].unit_price, 30_000);
/// ```
pub fn normalize_catalog(raw: &RawTable, layout: &CatalogLayout) -> EngineResult<CatalogTable> {
    let kept: Vec<usize> = (0..raw.header.len())
        .filter(|i| !layout.dropped_columns.contains(i))
        .collect();

    let Some(&description_col) = kept.first() else {
        return Err(EngineError::MalformedCatalog {
            column: "description".to_string(),
            message: format!(
                "table has {} columns, none left after dropping {:?}",
                raw.header.len(),
                layout.dropped_columns
            ),
        });
    };

    let find_column = |name: &str| -> EngineResult<usize> {
        kept.iter()
            .copied()
            .find(|&i| raw.header[i].trim() == name)
            .ok_or_else(|| EngineError::MalformedCatalog {
                column: name.to_string(),
                message: format!("column not found in header {:?}", raw.header),
            })
    };

    let unit_price_col = find_column(&layout.unit_price_column)?;
    let supplied_col = find_column(&layout.supplied_amount_column)?;
    let tax_col = find_column(&layout.tax_amount_column)?;

    let item_rows = raw.rows.len().saturating_sub(layout.trailer_rows);
    let mut items = Vec::with_capacity(item_rows);

    for (row_idx, row) in raw.rows[..item_rows].iter().enumerate() {
        let cell = |col: usize| row.get(col).map(String::as_str).unwrap_or("");
        let currency = |col: usize, name: &str| -> EngineResult<i64> {
            parse_grouped_integer(cell(col)).ok_or_else(|| EngineError::MalformedCatalog {
                column: name.to_string(),
                message: format!("row {row_idx}: {:?} is not a grouped integer", cell(col)),
            })
        };

        items.push(CatalogLineItem {
            description: cell(description_col).trim().to_string(),
            unit_price: currency(unit_price_col, &layout.unit_price_column)?,
            supplied_amount: currency(supplied_col, &layout.supplied_amount_column)?,
            tax_amount: currency(tax_col, &layout.tax_amount_column)?,
        });
    }

    debug!(
        raw_rows = raw.rows.len(),
        trailer_rows = layout.trailer_rows,
        items = items.len(),
        "Normalized billing table"
    );

    Ok(CatalogTable::new(items))
}

/// Parses a non-negative integer written with optional `,` thousands grouping.
///
/// Accepts `"1234"` and `"1,234"`, rejects `"12,34"`, `"1.5"`, `"-3"` and `""`.
pub fn parse_grouped_integer(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    let groups: Vec<&str> = cell.split(',').collect();
    let all_digits = |g: &str| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit());

    if groups.len() > 1 {
        let (head, tail) = groups.split_first()?;
        if head.len() > 3 || !all_digits(head) || !tail.iter().all(|g| g.len() == 3 && all_digits(g))
        {
            return None;
        }
    } else if !all_digits(cell) {
        return None;
    }

    groups.concat().parse().ok()
}
