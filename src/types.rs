//! Core data types: price series, instruments and the aligned comparison.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Date-keyed closing prices for one instrument.
///
/// Keys are unique and iterate in ascending date order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    name: String,
    prices: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    /// Create an empty series with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prices: BTreeMap::new(),
        }
    }

    /// Build a series from `(date, price)` pairs. Later pairs overwrite earlier
    /// ones with the same date.
    pub fn from_pairs<I>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self {
            name: name.into(),
            prices: pairs.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a price, returning the previous price for that date if any.
    pub fn insert(&mut self, date: NaiveDate, price: f64) -> Option<f64> {
        self.prices.insert(date, price)
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.prices.get(date).copied()
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.prices.contains_key(date)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> + '_ {
        self.prices.keys()
    }

    /// `(date, price)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> + '_ {
        self.prices.iter()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.prices.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.prices.keys().next_back().copied()
    }
}

impl fmt::Display for PriceSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => write!(
                f,
                "{} ({} prices, {} to {})",
                self.name,
                self.len(),
                first,
                last
            ),
            _ => write!(f, "{} (empty)", self.name),
        }
    }
}

/// One listing to compare: a display label, its prices, and whether its
/// prices are converted through the FX series before comparison.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub label: String,
    pub prices: PriceSeries,
    pub fx_converted: bool,
}

impl Instrument {
    /// Instrument compared in its own quote currency.
    pub fn native(label: impl Into<String>, prices: PriceSeries) -> Self {
        Self {
            label: label.into(),
            prices,
            fx_converted: false,
        }
    }

    /// Instrument whose prices are multiplied by the FX rate on each date.
    pub fn converted(label: impl Into<String>, prices: PriceSeries) -> Self {
        Self {
            label: label.into(),
            prices,
            fx_converted: true,
        }
    }
}

/// Aligned and transformed values for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesComparison {
    pub label: String,
    /// Composed prices on each common date (FX applied where configured).
    pub prices: Vec<f64>,
    /// `prices[i] / prices[0] * 100`.
    pub rebased: Vec<f64>,
    /// `ln(prices[i + 1]) - ln(prices[i])`.
    pub log_returns: Vec<f64>,
}

/// Result of aligning and transforming every instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Common dates, strictly ascending.
    pub dates: Vec<NaiveDate>,
    pub series: Vec<SeriesComparison>,
}

impl Comparison {
    /// Dates the log returns are plotted against (every date but the first).
    pub fn return_dates(&self) -> &[NaiveDate] {
        self.dates.get(1..).unwrap_or(&[])
    }

    pub fn get(&self, label: &str) -> Option<&SeriesComparison> {
        self.series.iter().find(|s| s.label == label)
    }
}
