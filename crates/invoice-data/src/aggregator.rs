//! Grouped sums, counts and extremal queries over cleaned invoice rows.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::ops::AddAssign;

use chrono::NaiveDate;
use invoice_core::error::Result;
use invoice_core::models::{Column, InvoiceTable, Record, YearMonth};

// ── Aggregate ─────────────────────────────────────────────────────────────────

/// Key → value totals that remember the order keys were first seen in.
#[derive(Debug, Clone)]
pub struct Aggregate<K, V = f64> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for Aggregate<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for Aggregate<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K, V> Aggregate<K, V>
where
    K: Eq + Hash + Clone,
    V: Copy + Default + AddAssign,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the running total for `key`, inserting it if new.
    pub fn add(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }
}

impl<K: Eq + Hash, V: Copy> Aggregate<K, V> {
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&i| self.entries[i].1)
    }
}

impl<K, V> Aggregate<K, V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn into_vec(self) -> Vec<(K, V)> {
        self.entries
    }
}

impl<K: Clone, V: Copy + PartialOrd> Aggregate<K, V> {
    /// All entries sorted by value, largest first. Equal values keep their
    /// first-seen order.
    pub fn ranked(&self) -> Vec<(K, V)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        sorted
    }
}

impl<K, V> FromIterator<(K, V)> for Aggregate<K, V>
where
    K: Eq + Hash + Clone,
    V: Copy + Default + AddAssign,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut agg = Self::new();
        for (k, v) in iter {
            agg.add(k, v);
        }
        agg
    }
}

// ── SalesAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that summarises an [`InvoiceTable`].
///
/// Every operation first checks that the table's schema carries the columns
/// it needs and fails with `MissingColumn` otherwise. "Sales" counts as
/// present when `Total_Sales` exists or can be derived from `Quantity` and
/// `Price`.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Sum of `total_sales` per category. Rows without a sale are skipped.
    pub fn total_sales_by_category(table: &InvoiceTable) -> Result<Aggregate<String>> {
        const OP: &str = "total_sales_by_category";
        table.schema.require(Column::Category, OP)?;
        table.schema.require_sales(OP)?;

        Ok(Self::sum_sales_by(&table.records, |r| {
            Some(r.category_label().to_string())
        }))
    }

    /// The `n` best-selling products by summed sales, largest first.
    ///
    /// Rows without a sale still register their product with a zero total.
    pub fn top_n_products_by_sales(table: &InvoiceTable, n: usize) -> Result<Vec<(String, f64)>> {
        const OP: &str = "top_n_products_by_sales";
        table.schema.require(Column::ProductName, OP)?;
        table.schema.require_sales(OP)?;

        let mut ranked = Self::product_sales(&table.records).ranked();
        ranked.truncate(n);
        Ok(ranked)
    }

    /// Sales summed per product in first-seen order; absent sales count as 0.
    pub fn product_sales(records: &[Record]) -> Aggregate<String> {
        records
            .iter()
            .map(|r| (r.product_label().to_string(), r.total_sales.unwrap_or(0.0)))
            .collect()
    }

    /// Sales per calendar month, ascending. Undated rows are excluded and no
    /// entry is emitted for a month without sales.
    pub fn monthly_sales_summary(table: &InvoiceTable) -> Result<BTreeMap<YearMonth, f64>> {
        const OP: &str = "monthly_sales_summary";
        table.schema.require(Column::Date, OP)?;
        table.schema.require_sales(OP)?;

        let mut months: BTreeMap<YearMonth, f64> = BTreeMap::new();
        for record in &table.records {
            if let (Some(month), Some(sales)) = (record.year_month(), record.total_sales) {
                *months.entry(month).or_default() += sales;
            }
        }
        Ok(months)
    }

    /// Sum of `total_sales` per customer; rows without a customer are excluded.
    pub fn sales_by_customer(table: &InvoiceTable) -> Result<Aggregate<i64>> {
        const OP: &str = "sales_by_customer";
        table.schema.require(Column::CustomerId, OP)?;
        table.schema.require_sales(OP)?;

        Ok(Self::sum_sales_by(&table.records, |r| r.customer_id))
    }

    /// Units sold per product.
    pub fn product_quantity_summary(table: &InvoiceTable) -> Result<Aggregate<String, u64>> {
        const OP: &str = "product_quantity_summary";
        table.schema.require(Column::ProductName, OP)?;
        table.schema.require(Column::Quantity, OP)?;

        Ok(table
            .records
            .iter()
            .map(|r| (r.product_label().to_string(), r.quantity.unwrap_or(0)))
            .collect())
    }

    /// Number of rows (not distinct invoices) per category.
    pub fn invoice_count_by_category(table: &InvoiceTable) -> Result<Aggregate<String, u64>> {
        table
            .schema
            .require(Column::Category, "invoice_count_by_category")?;

        Ok(table
            .records
            .iter()
            .map(|r| (r.category_label().to_string(), 1))
            .collect())
    }

    /// The row with the largest `total_sales`; the first one wins ties.
    pub fn highest_single_invoice(table: &InvoiceTable) -> Result<Option<&Record>> {
        table.schema.require_sales("highest_single_invoice")?;

        let mut best: Option<(&Record, f64)> = None;
        for record in &table.records {
            let Some(sales) = record.total_sales else {
                continue;
            };
            if best.map_or(true, |(_, top)| sales > top) {
                best = Some((record, sales));
            }
        }
        Ok(best.map(|(record, _)| record))
    }

    /// Rows dated within `[start, end]`. A `None` bound is open; undated rows
    /// are always excluded.
    pub fn filter_rows_by_date_range(
        table: &InvoiceTable,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<InvoiceTable> {
        table
            .schema
            .require(Column::Date, "filter_rows_by_date_range")?;

        let records = table
            .records
            .iter()
            .filter(|r| match r.date {
                Some(d) => start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e),
                None => false,
            })
            .cloned()
            .collect();
        Ok(InvoiceTable::new(table.schema.clone(), records))
    }

    /// Grand total of every present `total_sales`.
    pub fn total_sales(table: &InvoiceTable) -> Result<f64> {
        table.schema.require_sales("total_sales")?;
        Ok(table.records.iter().filter_map(|r| r.total_sales).sum())
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Sum present sales under `key_fn`; rows with no sale or no key are skipped.
    fn sum_sales_by<K>(records: &[Record], key_fn: impl Fn(&Record) -> Option<K>) -> Aggregate<K>
    where
        K: Eq + Hash + Clone,
    {
        records
            .iter()
            .filter_map(|r| Some((key_fn(r)?, r.total_sales?)))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
