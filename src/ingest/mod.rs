//! Input collection for one order directory.
//!
//! Everything here turns files into the typed inputs of the engine: the
//! directory scan, the customer's order spreadsheet and the billing table
//! extracted from the supplier's PDF.

mod billing_pdf;
mod discovery;
mod order_sheet;

pub use billing_pdf::{extract_billing_table, split_tables};
pub use discovery::{OrderInputs, discover_inputs};
pub use order_sheet::{
    AMOUNT_COLUMN, LENGTH_COLUMN, MOD3_COLUMN, MOD5_COLUMN, NAME_COLUMN, read_order_sheet,
};
