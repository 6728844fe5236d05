//! Row typing and cleaning.
//!
//! [`parse`] turns string rows into [`Record`]s, degrading any malformed cell
//! to an absent field. [`clean`] then drops invalid rows and fills the
//! defaulted and derived fields.

use std::collections::HashMap;

use invoice_core::models::{Column, InvoiceTable, RawRow, Record, UNKNOWN_LABEL};
use invoice_core::parsing::{
    normalize_header, parse_day_first_date, parse_float, parse_int, parse_quantity,
};

// ── CleanStats ────────────────────────────────────────────────────────────────

/// What [`clean_with_stats`] did to its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub rows_in: usize,
    pub rows_out: usize,
    pub dropped_empty: usize,
    pub dropped_missing_invoice: usize,
    pub quantity_defaulted: usize,
    pub total_sales_derived: usize,
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Type every raw row. Never fails: unparseable cells become `None`.
pub fn parse(raw_rows: &[RawRow]) -> Vec<Record> {
    raw_rows.iter().map(parse_row).collect()
}

fn parse_row(row: &RawRow) -> Record {
    let cells: HashMap<Column, &str> = row
        .iter()
        .filter_map(|(key, value)| {
            Column::from_header(&normalize_header(key)).map(|c| (c, value.trim()))
        })
        .collect();

    let text = |column: Column| -> Option<String> {
        cells
            .get(&column)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    };
    let cell = |column: Column| cells.get(&column).copied().unwrap_or("");

    Record {
        invoice_id: text(Column::InvoiceId),
        customer_id: parse_int(cell(Column::CustomerId)).ok(),
        product_name: text(Column::ProductName),
        category: text(Column::Category),
        quantity: parse_quantity(cell(Column::Quantity)).ok(),
        price: parse_float(cell(Column::Price)).ok(),
        total_sales: parse_float(cell(Column::TotalSales)).ok(),
        date: parse_day_first_date(cell(Column::Date)).ok(),
    }
}

// ── Cleaning ──────────────────────────────────────────────────────────────────

/// Drop invalid rows and fill defaulted / derived fields.
pub fn clean(records: Vec<Record>) -> Vec<Record> {
    clean_with_stats(records).0
}

/// [`clean`], also reporting how many rows were dropped or filled.
pub fn clean_with_stats(records: Vec<Record>) -> (Vec<Record>, CleanStats) {
    let mut stats = CleanStats {
        rows_in: records.len(),
        ..CleanStats::default()
    };
    let mut out = Vec::with_capacity(records.len());

    for mut record in records {
        if record.is_empty() {
            stats.dropped_empty += 1;
            continue;
        }
        if record
            .invoice_id
            .as_deref()
            .map_or(true, |id| id.trim().is_empty())
        {
            stats.dropped_missing_invoice += 1;
            continue;
        }

        if record.quantity.is_none() {
            record.quantity = Some(0);
            stats.quantity_defaulted += 1;
        }
        if record.total_sales.is_none() {
            if let (Some(qty), Some(price)) = (record.quantity, record.price) {
                record.total_sales = Some(qty as f64 * price);
                stats.total_sales_derived += 1;
            }
        }
        if record.product_name.is_none() {
            record.product_name = Some(UNKNOWN_LABEL.to_string());
        }
        if record.category.is_none() {
            record.category = Some(UNKNOWN_LABEL.to_string());
        }

        out.push(record);
    }

    stats.rows_out = out.len();
    (out, stats)
}

/// Clean the records of `table`, keeping its schema.
pub fn clean_table(table: InvoiceTable) -> (InvoiceTable, CleanStats) {
    let (records, stats) = clean_with_stats(table.records);
    (InvoiceTable::new(table.schema, records), stats)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADERS: [&str; 8] = [
        "Invoice_ID",
        "Customer_ID",
        "Product_Name",
        "Category",
        "Quantity",
        "Price",
        "Total_Sales",
        "Date",
    ];

    fn raw(values: [&str; 8]) -> RawRow {
        HEADERS
            .iter()
            .zip(values)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ── parse ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_types_every_field() {
        let rows = vec![raw([
            "I-1", "35", "Tablet", "Electronics", "7", "360.68", "", "18-03-2024",
        ])];
        let records = parse(&rows);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.invoice_id.as_deref(), Some("I-1"));
        assert_eq!(r.customer_id, Some(35));
        assert_eq!(r.product_name.as_deref(), Some("Tablet"));
        assert_eq!(r.category.as_deref(), Some("Electronics"));
        assert_eq!(r.quantity, Some(7));
        assert_eq!(r.price, Some(360.68));
        assert_eq!(r.total_sales, None);
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 3, 18));
    }

    #[test]
    fn test_parse_trims_keys_and_values() {
        let mut row = RawRow::new();
        row.insert("  Invoice_ID ".to_string(), "  I-9  ".to_string());
        row.insert("Total Sales".to_string(), " 1,250.00 ".to_string());
        row.insert("Customer_ID".to_string(), "12.0".to_string());

        let r = &parse(&[row])[0];
        assert_eq!(r.invoice_id.as_deref(), Some("I-9"));
        assert_eq!(r.total_sales, Some(1250.0));
        assert_eq!(r.customer_id, Some(12));
    }

    #[test]
    fn test_parse_bad_cells_become_absent() {
        let rows = vec![raw([
            "I-2", "abc", "Phone", "", "lots", "free", "n/a", "not-a-date",
        ])];
        let r = &parse(&rows)[0];

        assert_eq!(r.invoice_id.as_deref(), Some("I-2"));
        assert_eq!(r.customer_id, None);
        assert_eq!(r.category, None);
        assert_eq!(r.quantity, None);
        assert_eq!(r.price, None);
        assert_eq!(r.total_sales, None);
        assert_eq!(r.date, None);
    }

    #[test]
    fn test_parse_tolerates_missing_columns() {
        let mut row = RawRow::new();
        row.insert("Invoice_ID".to_string(), "I-3".to_string());
        row.insert("Region".to_string(), "North".to_string());

        let r = &parse(&[row])[0];
        assert_eq!(r.invoice_id.as_deref(), Some("I-3"));
        assert!(r.price.is_none());
        assert!(r.date.is_none());
    }

    // ── clean ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_clean_derives_total_sales() {
        let rows = vec![raw([
            "I-1", "35", "Tablet", "Electronics", "7", "360.68", "", "18-03-2024",
        ])];
        let cleaned = clean(parse(&rows));

        let total = cleaned[0].total_sales.expect("derived total");
        assert_eq!(total, 7.0 * 360.68);
        assert!((total - 2524.76).abs() < 1e-9);
    }

    #[test]
    fn test_clean_keeps_existing_total_sales() {
        let rows = vec![raw([
            "I-1", "1", "Tablet", "Electronics", "2", "10", "25", "18-03-2024",
        ])];
        let cleaned = clean(parse(&rows));
        assert_eq!(cleaned[0].total_sales, Some(25.0));
    }

    #[test]
    fn test_clean_drops_missing_invoice_id() {
        let rows = vec![
            raw(["", "1", "Tablet", "Electronics", "1", "10", "10", "18-03-2024"]),
            raw(["I-2", "1", "Phone", "Electronics", "1", "5", "5", "18-03-2024"]),
        ];
        let (cleaned, stats) = clean_with_stats(parse(&rows));

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].invoice_id.as_deref(), Some("I-2"));
        assert_eq!(stats.dropped_missing_invoice, 1);
        assert_eq!(stats.rows_in, 2);
        assert_eq!(stats.rows_out, 1);
    }

    #[test]
    fn test_clean_drops_whitespace_invoice_id() {
        let record = Record {
            invoice_id: Some("   ".to_string()),
            quantity: Some(1),
            ..Record::default()
        };
        assert!(clean(vec![record]).is_empty());
    }

    #[test]
    fn test_clean_drops_empty_rows() {
        let rows = vec![raw(["", "", "", "", "", "", "", ""])];
        let (cleaned, stats) = clean_with_stats(parse(&rows));

        assert!(cleaned.is_empty());
        assert_eq!(stats.dropped_empty, 1);
    }

    #[test]
    fn test_clean_defaults_quantity_and_labels() {
        let record = Record {
            invoice_id: Some("I-5".to_string()),
            price: Some(4.5),
            ..Record::default()
        };
        let (cleaned, stats) = clean_with_stats(vec![record]);
        let r = &cleaned[0];

        assert_eq!(r.quantity, Some(0));
        assert_eq!(r.total_sales, Some(0.0));
        assert_eq!(r.product_name.as_deref(), Some(UNKNOWN_LABEL));
        assert_eq!(r.category.as_deref(), Some(UNKNOWN_LABEL));
        assert_eq!(stats.quantity_defaulted, 1);
        assert_eq!(stats.total_sales_derived, 1);
    }

    #[test]
    fn test_clean_leaves_total_absent_without_price() {
        let record = Record {
            invoice_id: Some("I-6".to_string()),
            quantity: Some(3),
            ..Record::default()
        };
        let cleaned = clean(vec![record]);
        assert_eq!(cleaned[0].total_sales, None);
    }

    #[test]
    fn test_clean_invariants_hold() {
        let rows = vec![
            raw(["I-1", "", "", "", "-4", "2", "", ""]),
            raw(["", "2", "X", "Y", "1", "1", "1", "01-01-2024"]),
            raw(["I-3", "3", "Z", "Y", "", "", "9", "02-01-2024"]),
        ];
        for r in clean(parse(&rows)) {
            assert!(r.invoice_id.is_some());
            assert!(r.quantity.is_some());
            if r.price.is_some() {
                assert!(r.total_sales.is_some());
            }
        }
    }

    #[test]
    fn test_clean_is_idempotent() {
        let rows = vec![
            raw(["I-1", "35", "Tablet", "Electronics", "7", "360.68", "", "18-03-2024"]),
            raw(["", "1", "Phone", "Electronics", "1", "5", "5", "18-03-2024"]),
            raw(["I-3", "", "", "", "", "2.5", "", "bad"]),
        ];
        let once = clean(parse(&rows));
        let twice = clean(once.clone());
        assert_eq!(once, twice);
    }
}
