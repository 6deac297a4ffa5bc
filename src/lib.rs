//! Crosslist - compare a stock listed on two exchanges.
//!
//! # Overview
//!
//! Loads date/price series from CSV files, aligns them on the dates they all
//! share, optionally converts one listing through an FX rate, rebases every
//! series to 100 at the first common date and computes log returns. The
//! result is drawn as two charts: rebased prices and log returns.
//!
//! # Quick Start
//!
//! ```no_run
//! use crosslist::data::DataConfig;
//! use crosslist::pipeline::{compare_files, InputPaths};
//!
//! // Unilever_AS.csv, Unilever_LSE.csv and EURGBP.csv in the working directory
//! let comparison = compare_files(&InputPaths::default(), &DataConfig::default()).unwrap();
//!
//! for series in &comparison.series {
//!     println!("{}: {:.2}", series.label, series.rebased.last().unwrap());
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`]: Price series, instruments and the aligned comparison
//! - [`data`]: CSV loading and date parsing
//! - [`align`]: Common-date intersection
//! - [`transform`]: FX composition, rebasing and log returns
//! - [`analytics`]: Summary statistics over a comparison
//! - [`viz`]: SVG and terminal chart rendering
//! - [`config`]: TOML configuration file support
//! - [`pipeline`]: End-to-end entry points

pub mod align;
pub mod analytics;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod transform;
pub mod types;
pub mod viz;

pub use align::{alignment_report, common_dates, AlignmentReport, SeriesCoverage};
pub use analytics::{ComparisonStats, SeriesStats};
pub use config::CompareFileConfig;
pub use data::{load_csv, load_csv_from_str, parse_date, DataConfig};
pub use error::{CompareError, Result};
pub use pipeline::{compare_files, InputPaths};
pub use transform::{log_returns, rebase, unrebase, Transformer, REBASE_LEVEL};
pub use types::{Comparison, Instrument, PriceSeries, SeriesComparison};
pub use viz::{Renderer, SvgRenderer, TerminalRenderer};
