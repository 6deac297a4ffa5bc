//! Loading date/price series from CSV files.

use crate::error::{CompareError, Result};
use crate::types::PriceSeries;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{Reader, ReaderBuilder};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Data source configuration.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Date format string tried before the built-in formats (e.g. "%d.%m.%Y").
    pub date_format: Option<String>,
    /// Whether the first row is a header to discard.
    pub has_headers: bool,
    /// CSV delimiter character.
    pub delimiter: u8,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            date_format: None,
            has_headers: true,
            delimiter: b',',
        }
    }
}

// Month-first forms come before their day-first counterparts.
const DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y/%m/%d %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%b-%Y",  // 15-Jan-2024
    "%d %b %Y",  // 15 Jan 2024
    "%b %d, %Y", // Jan 15, 2024
];

/// Parse a calendar date, trying the explicit format first and then the
/// common formats. A time-of-day component is accepted and dropped.
///
/// Ambiguous day/month strings such as `03/04/2024` resolve month-first
/// (March 4th). A day-first reading is only used when the month-first one is
/// impossible; pass an explicit `format` for day-first files.
pub fn parse_date(s: &str, format: Option<&str>) -> Option<NaiveDate> {
    let s = s.trim();

    if let Some(fmt) = format {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

/// Load a two-column `(date, price)` CSV file into a [`PriceSeries`] named
/// after the file stem.
///
/// Any malformed row aborts the load with the row number of the offending
/// data row (1-based, header excluded).
pub fn load_csv(path: impl AsRef<Path>, config: &DataConfig) -> Result<PriceSeries> {
    let path = path.as_ref();
    info!("Loading prices from: {}", path.display());

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let reader = builder(config).from_path(path)?;
    read_series(reader, name, config)
}

/// Load a series from in-memory CSV text using the same rules as [`load_csv`].
pub fn load_csv_from_str(
    name: impl Into<String>,
    csv_content: &str,
    config: &DataConfig,
) -> Result<PriceSeries> {
    let reader = builder(config).from_reader(csv_content.as_bytes());
    read_series(reader, name.into(), config)
}

fn builder(config: &DataConfig) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(config.has_headers)
        .delimiter(config.delimiter)
        .flexible(true);
    builder
}

fn read_series<R: Read>(
    mut reader: Reader<R>,
    name: String,
    config: &DataConfig,
) -> Result<PriceSeries> {
    let mut series = PriceSeries::new(name);
    let mut rows = 0;

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record = result?;
        rows += 1;

        let (date_field, price_field) = match (record.get(0), record.get(1)) {
            (Some(d), Some(p)) => (d, p),
            _ => return Err(CompareError::MissingField { row }),
        };

        let date = parse_date(date_field, config.date_format.as_deref()).ok_or_else(|| {
            CompareError::DateParseError {
                row,
                value: date_field.to_string(),
            }
        })?;

        let price: f64 =
            price_field
                .trim()
                .parse()
                .map_err(|_| CompareError::PriceParseError {
                    row,
                    value: price_field.to_string(),
                })?;

        if let Some(previous) = series.insert(date, price) {
            debug!(
                "{}: row {} overwrites {} on {} with {}",
                series.name(),
                row,
                previous,
                date,
                price
            );
        }
    }

    if series.is_empty() {
        return Err(CompareError::NoData);
    }

    info!("Loaded {} rows: {}", rows, series);

    Ok(series)
}
