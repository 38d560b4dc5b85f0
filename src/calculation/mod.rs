//! Pricing and reconciliation logic.
//!
//! This module turns an extracted billing table into typed line items, resolves
//! the synthesis, modification and purification cost of every order line, and
//! compares the expected grand total with the invoiced one.

mod exact_lookup;
mod modification;
mod normalizer;
mod reconcile;

pub use exact_lookup::{ExactLookupResult, resolve_purification_cost, resolve_synthesis_cost};
pub use modification::{
    ModificationCostResult, ModificationSource, modification_candidates, modification_query,
    resolve_modification_cost,
};
pub use normalizer::{normalize_catalog, parse_grouped_integer};
pub use reconcile::reconcile;
