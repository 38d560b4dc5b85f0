//! Billing table models.
//!
//! [`RawTable`] is what comes out of document extraction: header text plus rows
//! of text cells. [`CatalogTable`] is the typed form produced by the
//! normalizer, one [`CatalogLineItem`] per priced item.

use serde::{Deserialize, Serialize};

/// A table of text cells as extracted from the billing document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column headers, in physical order.
    pub header: Vec<String>,
    /// Data rows, each with the same physical column order as `header`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a raw table from borrowed cell text.
    ///
    /// # Example
    ///
    /// ```
    /// use oligo_billing::models::RawTable;
    ///
    /// let table = RawTable::from_cells(
    ///     &["품명", "규격", "수량", "단가"],
    ///     &[&["FAM", "", "1", "300"]],
    /// );
    /// assert_eq!(table.rows[0][3], "300");
    /// ```
    pub fn from_cells(header: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }
}

/// A single priced item on the supplier's billing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLineItem {
    /// Free-text item description (품명).
    pub description: String,
    /// Unit price in won (단가).
    pub unit_price: i64,
    /// Supplied amount before tax (공급가액).
    pub supplied_amount: i64,
    /// Tax amount (세액).
    pub tax_amount: i64,
}

impl CatalogLineItem {
    /// Convenience constructor used mostly by tests and benchmarks.
    pub fn new(
        description: impl Into<String>,
        unit_price: i64,
        supplied_amount: i64,
        tax_amount: i64,
    ) -> Self {
        Self {
            description: description.into(),
            unit_price,
            supplied_amount,
            tax_amount,
        }
    }
}

/// The normalized billing table with trailer rows removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTable {
    items: Vec<CatalogLineItem>,
}

impl CatalogTable {
    /// Creates a table from already-typed line items.
    pub fn new(items: Vec<CatalogLineItem>) -> Self {
        Self { items }
    }

    /// Returns the line items in document order.
    pub fn items(&self) -> &[CatalogLineItem] {
        &self.items
    }

    /// Returns the number of line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the table has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The invoiced grand total: supplied amounts plus tax amounts, or `None`
    /// if the sum overflows `i64`.
    ///
    /// # Example
    ///
    /// ```
    /// use oligo_billing::models::{CatalogLineItem, CatalogTable};
    ///
    /// let table = CatalogTable::new(vec![
    ///     CatalogLineItem::new("A", 100, 2000, 200),
    ///     CatalogLineItem::new("B", 50, 50, 5),
    /// ]);
    /// assert_eq!(table.actual_total(), Some(2255));
    /// ```
    pub fn actual_total(&self) -> Option<i64> {
        self.items.iter().try_fold(0i64, |total, item| {
            total
                .checked_add(item.supplied_amount)?
                .checked_add(item.tax_amount)
        })
    }
}
