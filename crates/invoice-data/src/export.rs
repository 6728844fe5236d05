//! Two-column CSV export of aggregates.

use std::fmt::Display;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use invoice_core::error::{InvoiceError, Result};

/// A two-column table read back from an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedAggregate {
    pub key_name: String,
    pub value_name: String,
    pub rows: Vec<(String, String)>,
}

/// Write `key_name,value_name` followed by one row per entry, in iteration order.
///
/// Floats are written with their shortest round-tripping representation.
pub fn write_aggregate_csv<W, I, K, V>(
    writer: W,
    key_name: &str,
    value_name: &str,
    entries: I,
) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([key_name, value_name])?;
    for (key, value) in entries {
        wtr.write_record([key.to_string(), value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write an aggregate to `path`, creating parent directories as needed.
pub fn export_aggregate<I, K, V>(path: &Path, key_name: &str, value_name: &str, entries: I) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    let write_err = |source: std::io::Error| InvoiceError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let file = File::create(path).map_err(write_err)?;
    write_aggregate_csv(file, key_name, value_name, entries)
}

/// Parse an exported two-column table back into string pairs.
pub fn read_aggregate_csv<R: Read>(reader: R) -> Result<ExportedAggregate> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.len() != 2 {
        return Err(InvoiceError::MalformedExport(format!(
            "expected 2 header columns, found {}",
            headers.len()
        )));
    }

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() != 2 {
            return Err(InvoiceError::MalformedExport(format!(
                "row {} has {} columns",
                line + 1,
                record.len()
            )));
        }
        rows.push((record[0].to_string(), record[1].to_string()));
    }

    Ok(ExportedAggregate {
        key_name: headers[0].to_string(),
        value_name: headers[1].to_string(),
        rows,
    })
}
