use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::{InvoiceError, Result};

/// Label used for products and categories that carry no name.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One CSV row keyed by normalised header name.
pub type RawRow = HashMap<String, String>;

// ── Column ────────────────────────────────────────────────────────────────────

/// The invoice columns the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    InvoiceId,
    CustomerId,
    ProductName,
    Category,
    Quantity,
    Price,
    TotalSales,
    Date,
}

impl Column {
    /// Every known column, in canonical header order.
    pub const ALL: [Column; 8] = [
        Column::InvoiceId,
        Column::CustomerId,
        Column::ProductName,
        Column::Category,
        Column::Quantity,
        Column::Price,
        Column::TotalSales,
        Column::Date,
    ];

    /// Canonical header spelling, e.g. `"Total_Sales"`.
    pub fn header(self) -> &'static str {
        match self {
            Column::InvoiceId => "Invoice_ID",
            Column::CustomerId => "Customer_ID",
            Column::ProductName => "Product_Name",
            Column::Category => "Category",
            Column::Quantity => "Quantity",
            Column::Price => "Price",
            Column::TotalSales => "Total_Sales",
            Column::Date => "Date",
        }
    }

    /// Match an already-normalised header name, ignoring ASCII case.
    pub fn from_header(name: &str) -> Option<Column> {
        Self::ALL
            .into_iter()
            .find(|c| c.header().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// The set of known columns present in a data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: BTreeSet<Column>,
}

impl Schema {
    /// A schema carrying every known column.
    pub fn full() -> Self {
        Self {
            columns: Column::ALL.into_iter().collect(),
        }
    }

    /// Build a schema from header names. Unknown headers are ignored.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: headers
                .into_iter()
                .filter_map(|h| Column::from_header(h.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    /// Merge the columns of `other` into `self`.
    pub fn union(&mut self, other: &Schema) {
        self.columns.extend(other.columns.iter().copied());
    }

    /// Fail with [`InvoiceError::MissingColumn`] unless `column` is present.
    pub fn require(&self, column: Column, operation: &'static str) -> Result<()> {
        if self.contains(column) {
            Ok(())
        } else {
            Err(InvoiceError::MissingColumn { column, operation })
        }
    }

    /// Sales are available either directly or derivable from quantity and price.
    pub fn has_sales(&self) -> bool {
        self.contains(Column::TotalSales)
            || (self.contains(Column::Quantity) && self.contains(Column::Price))
    }

    pub fn require_sales(&self, operation: &'static str) -> Result<()> {
        if self.has_sales() {
            Ok(())
        } else {
            Err(InvoiceError::MissingColumn {
                column: Column::TotalSales,
                operation,
            })
        }
    }
}

// ── YearMonth ─────────────────────────────────────────────────────────────────

/// Calendar month key, ordered by year then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// A single invoice line item.
///
/// Every field is optional; absence is never encoded as `0` or `""`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub invoice_id: Option<String>,
    pub customer_id: Option<i64>,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u64>,
    /// Unit price.
    pub price: Option<f64>,
    pub total_sales: Option<f64>,
    pub date: Option<NaiveDate>,
}

impl Record {
    /// `true` when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.invoice_id.is_none()
            && self.customer_id.is_none()
            && self.product_name.is_none()
            && self.category.is_none()
            && self.quantity.is_none()
            && self.price.is_none()
            && self.total_sales.is_none()
            && self.date.is_none()
    }

    /// Product name, or [`UNKNOWN_LABEL`] when absent.
    pub fn product_label(&self) -> &str {
        self.product_name.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    /// Category, or [`UNKNOWN_LABEL`] when absent.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    pub fn year_month(&self) -> Option<YearMonth> {
        self.date.map(YearMonth::of)
    }
}

// ── InvoiceTable ──────────────────────────────────────────────────────────────

/// Cleaned records together with the columns their source carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceTable {
    pub schema: Schema,
    pub records: Vec<Record>,
}

impl InvoiceTable {
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
