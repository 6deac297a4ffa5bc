//! Error types for loading, aligning and transforming price series.

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for the comparison pipeline.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Could not parse date '{value}' at row {row}")]
    DateParseError { row: usize, value: String },

    #[error("Could not parse price '{value}' at row {row}")]
    PriceParseError { row: usize, value: String },

    #[error("Row {row} has fewer than two fields")]
    MissingField { row: usize },

    #[error("No data loaded")]
    NoData,

    #[error("No common dates across series: {}", .0.join(", "))]
    EmptyIntersection(Vec<String>),

    #[error("'{series}' has no price on {date}")]
    MissingDate { series: String, date: NaiveDate },

    #[error("Non-positive price {price} for '{series}' on {date}")]
    NonPositivePrice {
        series: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias for comparison operations.
pub type Result<T> = std::result::Result<T, CompareError>;
