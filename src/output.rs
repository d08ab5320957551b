//! Output formatting and persistence.
//!
//! Renders the monthly aggregate table and summary records for the
//! terminal or as JSON, and appends scraped census rows to a CSV file.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use tracing::debug;

use crate::scrape::CensusRow;
use crate::stats::{MonthlyAggregate, Record};

/// Appends one scraped row to a CSV file, creating the file if needed.
///
/// Never writes a header: raw scrape output is the headerless form the
/// loader's header detection expects.
pub fn append_row(path: &str, row: &CensusRow) -> Result<()> {
    debug!(path, "Appending census row");

    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record([
        row.date.as_str(),
        &row.birth_queue.to_string(),
        &row.population.to_string(),
        &row.pregnant.to_string(),
    ])?;
    writer.flush()?;

    Ok(())
}

/// Renders the monthly aggregate as an aligned text table.
pub fn render_monthly_table(monthly: &MonthlyAggregate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>7} {:>7} {:>12}",
        "Month", "Births", "Deaths", "Pregnancies"
    );
    for row in &monthly.rows {
        let _ = writeln!(
            out,
            "{:<16} {:>7} {:>7} {:>12}",
            row.month, row.births, row.deaths, row.pregnancies
        );
    }
    out
}

/// Renders the summary records as "name: value unit" lines.
pub fn render_records(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "{}: {}", record.name, record.formatted_value());
    }
    out
}

/// Serializes the full analysis result as pretty-printed JSON.
pub fn render_json(monthly: &MonthlyAggregate, records: &[Record]) -> Result<String> {
    #[derive(Serialize)]
    struct Analysis<'a> {
        monthly: &'a MonthlyAggregate,
        summary: &'a [Record],
    }

    Ok(serde_json::to_string_pretty(&Analysis {
        monthly,
        summary: records,
    })?)
}
