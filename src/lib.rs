//! Oligo order billing reconciliation.
//!
//! This crate checks a supplier's billing table for custom oligonucleotide
//! synthesis against the customer's order: every ordered oligo is priced from
//! the billing table (synthesis per monomer, a 5'/3' modification pair and
//! purification), the expected grand total is compared with the invoiced one,
//! and a billing statement is written for the order.
//!
//! Modification rows are described inconsistently on billing documents, so
//! choosing the right row is delegated to a [`matching::BestMatch`]
//! implementation, by default a chat-completions model.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod ingest;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod statement;
