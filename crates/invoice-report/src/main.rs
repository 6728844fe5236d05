mod bootstrap;
mod report;

use anyhow::{Context, Result};
use invoice_core::formatting::{format_amount, format_count};
use invoice_core::settings::Settings;
use invoice_core::InvoiceError;
use invoice_data::aggregator::SalesAggregator;
use invoice_data::reader;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Invoice report v{} starting", env!("CARGO_PKG_VERSION"));
    settings.validate()?;

    let data_path = settings
        .data_path
        .as_deref()
        .context("no data path configured")?;
    tracing::info!("Reading invoices from {}", data_path.display());

    let (mut table, stats) = reader::load_table(data_path)?;
    tracing::debug!(
        "Cleaning: {} empty, {} without invoice id, {} quantities defaulted, {} totals derived",
        stats.dropped_empty,
        stats.dropped_missing_invoice,
        stats.quantity_defaulted,
        stats.total_sales_derived,
    );

    if settings.start.is_some() || settings.end.is_some() {
        let before = table.len();
        table = SalesAggregator::filter_rows_by_date_range(&table, settings.start, settings.end)?;
        tracing::info!("Date filter kept {} of {} rows", table.len(), before);
    }

    println!(
        "Rows: {} ({} dropped while cleaning)",
        format_count(table.len() as u64),
        format_count((stats.rows_in - stats.rows_out) as u64),
    );
    if let Ok(total) = SalesAggregator::total_sales(&table) {
        println!("Total sales: {}", format_amount(total, 2));
    }

    let views: Vec<&str> = if settings.view == "all" {
        report::ALL_VIEWS.to_vec()
    } else {
        vec![settings.view.as_str()]
    };
    let top_n = settings.top_n as usize;

    for view in views {
        let section = match report::build_section(view, &table, top_n) {
            Ok(section) => section,
            Err(e @ InvoiceError::MissingColumn { .. }) if settings.view == "all" => {
                tracing::warn!("Skipping {} view: {}", view, e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        println!();
        print!("{}", section.render());

        if let Some(dir) = &settings.export_dir {
            let path = section.export_to(dir)?;
            tracing::info!("Exported {} view to {}", view, path.display());
        }
    }

    Ok(())
}
