//! CSV discovery and loading.
//!
//! Reads invoice CSV files from a single path or a directory tree and turns
//! them into a cleaned [`InvoiceTable`].

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use invoice_core::error::{InvoiceError, Result};
use invoice_core::models::{InvoiceTable, RawRow, Schema};
use invoice_core::parsing::normalize_header;
use tracing::{debug, info, warn};

use crate::cleaner::{self, CleanStats};

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve `path` to the CSV files it names.
///
/// A file is returned as-is whatever its extension. A directory is walked
/// recursively for `*.csv` files, sorted by path.
pub fn find_csv_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(InvoiceError::DataPathNotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    if files.is_empty() {
        return Err(InvoiceError::NoDataFiles(path.to_path_buf()));
    }

    files.sort();
    Ok(files)
}

/// Read CSV text into normalised headers plus one [`RawRow`] per record.
///
/// Rows may be shorter or longer than the header: missing cells are simply
/// absent from the row and surplus cells are ignored.
pub fn read_raw_rows<R: Read>(reader: R) -> Result<(Vec<String>, Vec<RawRow>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(normalize_header).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Parse and clean CSV text from any reader.
pub fn load_table_from_reader<R: Read>(reader: R) -> Result<(InvoiceTable, CleanStats)> {
    let (headers, rows) = read_raw_rows(reader)?;
    let table = InvoiceTable::new(Schema::from_headers(&headers), cleaner::parse(&rows));
    Ok(cleaner::clean_table(table))
}

/// Load every CSV file under `path` into one cleaned table.
///
/// The schema is the union of the files' headers. Any file that cannot be
/// opened or parsed aborts the load.
pub fn load_table(path: &Path) -> Result<(InvoiceTable, CleanStats)> {
    let files = find_csv_files(path)?;

    let mut schema = Schema::default();
    let mut records = Vec::new();

    for file_path in &files {
        let file = File::open(file_path).map_err(|source| InvoiceError::FileRead {
            path: file_path.clone(),
            source,
        })?;
        let (headers, rows) = read_raw_rows(file)?;
        let file_schema = Schema::from_headers(&headers);

        debug!(
            "File {}: {} rows, {} known columns",
            file_path.display(),
            rows.len(),
            file_schema.columns().count(),
        );

        schema.union(&file_schema);
        records.extend(cleaner::parse(&rows));
    }

    let (table, stats) = cleaner::clean_table(InvoiceTable::new(schema, records));

    info!(
        "Loaded {} of {} rows from {} file(s)",
        stats.rows_out,
        stats.rows_in,
        files.len()
    );

    Ok((table, stats))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
