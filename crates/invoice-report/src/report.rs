//! Plain-text report sections for each summary view.
//!
//! A [`Section`] holds one two-column summary. It renders as an aligned text
//! table for the terminal and exports as a raw CSV aggregate.

use std::fmt;
use std::path::{Path, PathBuf};

use invoice_core::error::Result;
use invoice_core::formatting::{format_amount, format_count};
use invoice_core::models::{InvoiceTable, Record};
use invoice_data::aggregator::SalesAggregator;
use invoice_data::export;
use unicode_width::UnicodeWidthStr;

/// Views printed by `--view all`, in order.
pub const ALL_VIEWS: [&str; 7] = [
    "category",
    "monthly",
    "products",
    "customers",
    "quantities",
    "counts",
    "highest",
];

// ── Value ─────────────────────────────────────────────────────────────────────

/// A summary cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Amount(f64),
    Count(u64),
    Text(String),
}

impl Value {
    /// Human-readable form with thousands separators.
    pub fn pretty(&self) -> String {
        match self {
            Value::Amount(v) => format_amount(*v, 2),
            Value::Count(n) => format_count(*n),
            Value::Text(s) => s.clone(),
        }
    }
}

/// Raw form used for CSV export.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Amount(v) => write!(f, "{v}"),
            Value::Count(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

// ── Section ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// View name; also the export file stem.
    pub view: &'static str,
    pub title: &'static str,
    pub key_name: &'static str,
    pub value_name: &'static str,
    pub rows: Vec<(String, Value)>,
}

impl Section {
    /// Align keys left and values right, sized by display width.
    pub fn render(&self) -> String {
        let pretty: Vec<(&str, String)> = self
            .rows
            .iter()
            .map(|(k, v)| (k.as_str(), v.pretty()))
            .collect();

        let key_width = pretty
            .iter()
            .map(|(k, _)| k.width())
            .chain([self.key_name.width()])
            .max()
            .unwrap_or(0);
        let value_width = pretty
            .iter()
            .map(|(_, v)| v.width())
            .chain([self.value_name.width()])
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        out.push_str(self.title);
        out.push('\n');
        push_row(&mut out, self.key_name, key_width, self.value_name, value_width);
        out.push_str(&"-".repeat(key_width + 2 + value_width));
        out.push('\n');
        if pretty.is_empty() {
            out.push_str("(no rows)\n");
        }
        for (key, value) in &pretty {
            push_row(&mut out, key, key_width, value, value_width);
        }
        out
    }

    /// Write this section as `<dir>/<view>.csv`.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.csv", self.view));
        export::export_aggregate(
            &path,
            self.key_name,
            self.value_name,
            self.rows.iter().map(|(k, v)| (k, v)),
        )?;
        Ok(path)
    }
}

fn push_row(out: &mut String, key: &str, key_width: usize, value: &str, value_width: usize) {
    out.push_str(key);
    out.push_str(&" ".repeat(key_width - key.width() + 2));
    out.push_str(&" ".repeat(value_width - value.width()));
    out.push_str(value);
    out.push('\n');
}

// ── Building ──────────────────────────────────────────────────────────────────

/// Compute the summary behind `view`.
///
/// Fails with `MissingColumn` when the data lacks a column the view needs.
pub fn build_section(view: &str, table: &InvoiceTable, top_n: usize) -> Result<Section> {
    let section = match view {
        "category" => Section {
            view: "category",
            title: "Total sales by category",
            key_name: "Category",
            value_name: "Total_Sales",
            rows: amounts(SalesAggregator::total_sales_by_category(table)?.into_vec()),
        },
        "monthly" => Section {
            view: "monthly",
            title: "Monthly sales",
            key_name: "Month",
            value_name: "Total_Sales",
            rows: SalesAggregator::monthly_sales_summary(table)?
                .into_iter()
                .map(|(month, v)| (month.to_string(), Value::Amount(v)))
                .collect(),
        },
        "products" => Section {
            view: "products",
            title: "Top products by sales",
            key_name: "Product",
            value_name: "Total_Sales",
            rows: amounts(SalesAggregator::top_n_products_by_sales(table, top_n)?),
        },
        "customers" => Section {
            view: "customers",
            title: "Sales by customer",
            key_name: "Customer_ID",
            value_name: "Total_Sales",
            rows: SalesAggregator::sales_by_customer(table)?
                .into_vec()
                .into_iter()
                .map(|(id, v)| (id.to_string(), Value::Amount(v)))
                .collect(),
        },
        "quantities" => Section {
            view: "quantities",
            title: "Units sold by product",
            key_name: "Product",
            value_name: "Quantity",
            rows: counts(SalesAggregator::product_quantity_summary(table)?.into_vec()),
        },
        "counts" => Section {
            view: "counts",
            title: "Invoice rows by category",
            key_name: "Category",
            value_name: "Invoices",
            rows: counts(SalesAggregator::invoice_count_by_category(table)?.into_vec()),
        },
        "highest" => Section {
            view: "highest",
            title: "Highest single sale",
            key_name: "Field",
            value_name: "Value",
            rows: SalesAggregator::highest_single_invoice(table)?
                .map(record_fields)
                .unwrap_or_default(),
        },
        other => {
            return Err(invoice_core::InvoiceError::Config(format!(
                "unknown view: {other}"
            )))
        }
    };
    Ok(section)
}

fn amounts(entries: Vec<(String, f64)>) -> Vec<(String, Value)> {
    entries
        .into_iter()
        .map(|(k, v)| (k, Value::Amount(v)))
        .collect()
}

fn counts(entries: Vec<(String, u64)>) -> Vec<(String, Value)> {
    entries
        .into_iter()
        .map(|(k, v)| (k, Value::Count(v)))
        .collect()
}

/// The present fields of a record as `(column, value)` rows.
fn record_fields(record: &Record) -> Vec<(String, Value)> {
    let text = |s: &Option<String>| s.clone().map(Value::Text);
    [
        ("Invoice_ID", text(&record.invoice_id)),
        ("Customer_ID", record.customer_id.map(|c| Value::Text(c.to_string()))),
        ("Product_Name", text(&record.product_name)),
        ("Category", text(&record.category)),
        ("Quantity", record.quantity.map(Value::Count)),
        ("Price", record.price.map(Value::Amount)),
        ("Total_Sales", record.total_sales.map(Value::Amount)),
        ("Date", record.date.map(|d| Value::Text(d.format("%d-%m-%Y").to_string()))),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
    .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use invoice_core::models::Schema;
    use invoice_core::InvoiceError;
    use tempfile::TempDir;

    fn sample() -> InvoiceTable {
        let rec = |id: &str, product: &str, category: &str, qty: u64, sales: f64, day: u32| Record {
            invoice_id: Some(id.to_string()),
            customer_id: Some(7),
            product_name: Some(product.to_string()),
            category: Some(category.to_string()),
            quantity: Some(qty),
            price: None,
            total_sales: Some(sales),
            date: NaiveDate::from_ymd_opt(2024, 3, day),
        };
        InvoiceTable::new(
            Schema::full(),
            vec![
                rec("I-1", "Tablet", "Electronics", 7, 2524.76, 18),
                rec("I-2", "東京 Tea", "Food", 3, 9.0, 19),
            ],
        )
    }

    #[test]
    fn test_build_every_view() {
        let table = sample();
        for view in ALL_VIEWS {
            let section = build_section(view, &table, 5).expect(view);
            assert_eq!(section.view, view);
            assert!(!section.rows.is_empty(), "{view} should have rows");
        }
    }

    #[test]
    fn test_build_unknown_view() {
        let err = build_section("pie-chart", &sample(), 5).unwrap_err();
        assert!(matches!(err, InvoiceError::Config(_)));
    }

    #[test]
    fn test_build_missing_column() {
        let table = InvoiceTable::new(Schema::from_headers(["Invoice_ID"]), vec![]);
        let err = build_section("category", &table, 5).unwrap_err();
        assert!(matches!(err, InvoiceError::MissingColumn { .. }));
    }

    #[test]
    fn test_highest_lists_present_fields() {
        let section = build_section("highest", &sample(), 5).unwrap();
        let fields: Vec<&str> = section.rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            fields,
            vec!["Invoice_ID", "Customer_ID", "Product_Name", "Category", "Quantity", "Total_Sales", "Date"]
        );
        assert_eq!(section.rows[0].1, Value::Text("I-1".to_string()));
    }

    #[test]
    fn test_render_aligns_by_display_width() {
        let section = build_section("category", &sample(), 5).unwrap();
        let text = section.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Total sales by category");
        assert_eq!(lines[1], "Category     Total_Sales");
        assert_eq!(lines[2], "-".repeat(24));
        assert_eq!(lines[3], "Electronics     2,524.76");
        assert_eq!(lines[4], format!("Food{}9.00", " ".repeat(16)));
    }

    #[test]
    fn test_render_wide_characters() {
        let section = build_section("quantities", &sample(), 5).unwrap();
        let text = section.render();
        let widths: Vec<usize> = text.lines().skip(1).map(|l| l.width()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{text}");
    }

    #[test]
    fn test_render_empty_section() {
        let section = Section {
            view: "category",
            title: "Total sales by category",
            key_name: "Category",
            value_name: "Total_Sales",
            rows: vec![],
        };
        assert!(section.render().contains("(no rows)"));
    }

    #[test]
    fn test_export_writes_raw_values() {
        let tmp = TempDir::new().expect("tempdir");
        let section = build_section("monthly", &sample(), 5).unwrap();

        let path = section.export_to(tmp.path()).unwrap();

        assert_eq!(path, tmp.path().join("monthly.csv"));
        let back = export::read_aggregate_csv(std::fs::File::open(path).unwrap()).unwrap();
        assert_eq!(back.key_name, "Month");
        assert_eq!(back.rows.len(), 1);
        assert_eq!(back.rows[0].0, "2024-03");
        assert_eq!(back.rows[0].1.parse::<f64>().unwrap(), 2524.76 + 9.0);
    }
}
