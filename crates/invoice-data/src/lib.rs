//! Data layer for the invoice report.
//!
//! Responsible for discovering and reading invoice CSV files, typing and
//! cleaning their rows, aggregating sales, and exporting aggregates as CSV.

pub mod aggregator;
pub mod cleaner;
pub mod export;
pub mod reader;

pub use invoice_core as core;
