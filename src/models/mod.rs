//! Core data models for the reconciliation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod catalog;
mod order;
mod reconciliation_result;

pub use catalog::{CatalogLineItem, CatalogTable, RawTable};
pub use order::{OligoOrderLine, QuantityTier};
pub use reconciliation_result::{
    AuditStep, AuditTrace, AuditWarning, CostBreakdown, ReconciliationResult,
};
