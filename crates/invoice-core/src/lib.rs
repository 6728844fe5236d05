//! Domain types shared by the invoice report crates.
//!
//! Holds the typed [`models::Record`], the column [`models::Schema`], the
//! fallible cell parsers, number formatting, CLI settings and the common
//! error type.

pub mod error;
pub mod formatting;
pub mod models;
pub mod parsing;
pub mod settings;

pub use error::{InvoiceError, Result};
