//! Quote source: tab-separated `quote`, `author`, `post_date` rows.
//!
//! Fields may be wrapped in `"` (and then span lines or contain tabs), with
//! `""` standing for a literal quote.
//! Rows without a post date are not scheduled and are skipped.

use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"];
const COLUMNS: [&str; 3] = ["quote", "author", "post_date"];

/// One scheduled quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteEntry {
    pub quote: String,
    pub author: String,
    pub post_date: NaiveDate,
}

/// A raw row as it appears in the file, before date parsing
#[derive(Debug, Deserialize)]
struct QuoteRow {
    quote: String,
    author: String,
    post_date: String,
}

pub fn parse_post_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn read_tsv(path: impl AsRef<Path>) -> Result<Vec<QuoteEntry>> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|e| {
        Error::QuoteSourceError(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_tsv(&data)
}

pub fn parse_tsv(input: &str) -> Result<Vec<QuoteEntry>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(input.as_bytes());

    let headers = reader.headers().map_err(source_error)?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    for name in COLUMNS {
        if !headers.iter().any(|h| h == name) {
            return Err(Error::QuoteSourceError(format!("missing `{name}` column")));
        }
    }

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(source_error)?;
        let line_no = record.position().map_or(0, |p| p.line());
        let row: QuoteRow = record
            .deserialize(Some(&headers))
            .map_err(|e| Error::QuoteSourceError(format!("line {line_no}: {e}")))?;

        if row.post_date.is_empty() {
            debug!("line {line_no}: no post date, skipping");
            continue;
        }
        let post_date = parse_post_date(&row.post_date).ok_or_else(|| {
            Error::QuoteSourceError(format!(
                "line {line_no}: unrecognized post date {:?}",
                row.post_date
            ))
        })?;
        if row.quote.is_empty() {
            return Err(Error::QuoteSourceError(format!("line {line_no}: empty quote")));
        }

        entries.push(QuoteEntry {
            quote: row.quote,
            author: row.author,
            post_date,
        });
    }
    Ok(entries)
}

fn source_error(err: csv::Error) -> Error {
    match err.position() {
        Some(pos) => Error::QuoteSourceError(format!("line {}: {err}", pos.line())),
        None => Error::QuoteSourceError(err.to_string()),
    }
}
