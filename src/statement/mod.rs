//! Billing statement output.
//!
//! [`build_statement`] turns a reconciliation result into rows and
//! [`write_statement`] writes them to the order directory as a spreadsheet.

mod emitter;
mod xlsx;

pub use emitter::{STATEMENT_HEADERS, StatementRow, build_statement, format_grouped};
pub use xlsx::write_statement;
