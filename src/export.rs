//! CSV backup of the transaction ledger.
//!
//! The layout is fixed: a header row, then one row per transaction in collection order. Only the
//! description column is quoted (always, with inner quotes doubled); the other columns are
//! written as they are.

use crate::model::{Projects, Transactions};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;

/// The header row of the export.
pub const HEADERS: [&str; 7] = [
    "ID",
    "Project",
    "Date",
    "Type",
    "Category",
    "Amount",
    "Description",
];

const UNKNOWN_PROJECT: &str = crate::ledger::UNKNOWN_PROJECT;

/// A rendered export, ready to be written to disk.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
}

/// The file name of an export taken on `date`, e.g. `hotelflow_backup_2024-01-31.csv`.
pub fn file_name(date: NaiveDate) -> String {
    format!("hotelflow_backup_{}.csv", date.format("%Y-%m-%d"))
}

/// Renders `transactions` as CSV, resolving each project id to its name (`Unknown` when the
/// project is missing). Rows are separated by `\n` with no trailing newline.
pub fn to_csv(transactions: &Transactions, projects: &Projects) -> Result<String> {
    // Quoting is done by hand so that only the description is quoted.
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(HEADERS)
        .context("Unable to write the CSV header")?;

    for t in transactions.iter() {
        let project = projects
            .get(t.project_id())
            .map(|p| p.name.as_str())
            .unwrap_or(UNKNOWN_PROJECT);
        let category = t.category().map(|c| c.to_string()).unwrap_or_default();
        writer
            .write_record([
                t.id(),
                project,
                &t.date().format("%Y-%m-%d").to_string(),
                &t.transaction_type().to_string(),
                &category,
                &t.amount().to_string(),
                &quote(t.description()),
            ])
            .with_context(|| format!("Unable to write the CSV row for '{}'", t.id()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish the CSV output: {}", e.error()))?;
    let mut csv = String::from_utf8(bytes).context("The CSV output is not valid UTF-8")?;
    if csv.ends_with('\n') {
        let _ = csv.pop();
    }
    Ok(csv)
}

/// Builds the export for `date`.
pub fn export(transactions: &Transactions, projects: &Projects, date: NaiveDate) -> Result<CsvExport> {
    Ok(CsvExport {
        file_name: file_name(date),
        contents: to_csv(transactions, projects)?,
    })
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}
