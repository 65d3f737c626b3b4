//! CSV import and export.
//!
//! Imports are row-tolerant: a bad row is reported with its line number and
//! skipped, the rest are kept. Exports always write a header row.

pub mod products;
pub mod sales;
pub mod social;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use products::{export_products, parse_products, PRODUCT_COLUMNS};
pub use sales::{parse_sales, SALES_COLUMNS};
pub use social::{export_social, parse_social_csv, SOCIAL_COLUMNS};

/// Whole-file CSV failures. Row-level problems are [`RowError`]s instead.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("CSV output error: {0}")]
    Write(String),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// A skipped input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based line in the file; the header is line 1.
    pub line: u64,
    pub message: String,
}

/// Rows that parsed, plus the rows that did not.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub errors: Vec<RowError>,
}

/// Summary returned by the import endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<RowError>,
}

/// Reader with ragged rows allowed and trimmed, lowercased headers. Field
/// trimming is up to the caller.
fn reader<'a>(text: &'a str, required: &[&'static str], trim: csv::Trim) -> ExchangeResult<csv::Reader<&'a [u8]>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(trim)
        .from_reader(text.as_bytes());
    let headers: csv::StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(ExchangeError::MissingColumn(column));
        }
    }
    rdr.set_headers(headers);
    Ok(rdr)
}

/// Drive `parse_row` over every data row, collecting row errors.
fn parse_rows<T, R, F>(
    text: &str,
    required: &[&'static str],
    trim: csv::Trim,
    mut parse_row: F,
) -> ExchangeResult<Parsed<T>>
where
    R: serde::de::DeserializeOwned,
    F: FnMut(R) -> Result<T, String>,
{
    let mut rdr = reader(text, required, trim)?;
    let headers = rdr.headers()?.clone();
    let mut parsed = Parsed {
        records: Vec::new(),
        errors: Vec::new(),
    };

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                parsed.errors.push(RowError {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let row = match record.deserialize::<R>(Some(&headers)) {
            Ok(row) => row,
            Err(e) => {
                parsed.errors.push(RowError {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };
        match parse_row(row) {
            Ok(item) => parsed.records.push(item),
            Err(message) => parsed.errors.push(RowError { line, message }),
        }
    }
    Ok(parsed)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> ExchangeResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExchangeError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExchangeError::Write(e.to_string()))
}
