//! Price composition, rebasing and log returns over aligned dates.

use crate::align::{alignment_report, common_dates};
use crate::error::{CompareError, Result};
use crate::types::{Comparison, Instrument, PriceSeries, SeriesComparison};
use chrono::NaiveDate;
use tracing::{debug, info};

/// Level every rebased series starts from.
pub const REBASE_LEVEL: f64 = 100.0;

/// Scale `prices` by `REBASE_LEVEL / prices[0]`. The first value is exactly
/// [`REBASE_LEVEL`] for any finite non-zero base; a zero or NaN base yields
/// non-finite output.
///
/// Returns an empty vector for empty input.
pub fn rebase(prices: &[f64]) -> Vec<f64> {
    let Some(&base) = prices.first() else {
        return Vec::new();
    };
    prices.iter().map(|&p| p / base * REBASE_LEVEL).collect()
}

/// Undo [`rebase`] given the original first price.
pub fn unrebase(rebased: &[f64], base: f64) -> Vec<f64> {
    rebased.iter().map(|&r| r * base / REBASE_LEVEL).collect()
}

/// Natural-log first differences. One shorter than the input; empty for fewer
/// than two prices.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| w[1].ln() - w[0].ln())
        .collect()
}

/// Aligns instruments on their common dates and derives rebased prices and
/// log returns for each, optionally converting some through an FX series.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    fx: Option<PriceSeries>,
}

impl Transformer {
    /// Transformer without currency conversion.
    pub fn new() -> Self {
        Self { fx: None }
    }

    /// Transformer converting FX-flagged instruments with `fx`, quoted as
    /// target currency per unit of the instrument's native currency.
    pub fn with_fx(fx: PriceSeries) -> Self {
        Self { fx: Some(fx) }
    }

    pub fn fx(&self) -> Option<&PriceSeries> {
        self.fx.as_ref()
    }

    /// Align every instrument (and the FX series, if any) and transform them.
    ///
    /// # Errors
    /// - [`CompareError::ConfigError`] if an instrument needs FX but none is set.
    /// - [`CompareError::EmptyIntersection`] if the series share no date.
    /// - [`CompareError::NonPositivePrice`] if any composed price is not a
    ///   finite positive number.
    pub fn compare(&self, instruments: &[Instrument]) -> Result<Comparison> {
        if instruments.is_empty() {
            return Err(CompareError::NoData);
        }

        if self.fx.is_none() {
            if let Some(inst) = instruments.iter().find(|i| i.fx_converted) {
                return Err(CompareError::ConfigError(format!(
                    "'{}' requires FX conversion but no FX series was given",
                    inst.label
                )));
            }
        }

        let mut inputs: Vec<&PriceSeries> = instruments.iter().map(|i| &i.prices).collect();
        if let Some(fx) = &self.fx {
            inputs.push(fx);
        }

        let dates = common_dates(&inputs)?;
        alignment_report(&inputs, &dates).log();

        let series = instruments
            .iter()
            .map(|inst| self.transform(inst, &dates))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Compared {} series over {} dates",
            series.len(),
            dates.len()
        );

        Ok(Comparison { dates, series })
    }

    fn transform(&self, instrument: &Instrument, dates: &[NaiveDate]) -> Result<SeriesComparison> {
        let prices = self.compose(instrument, dates)?;
        let rebased = rebase(&prices);
        let log_returns = log_returns(&prices);

        debug!(
            "{}: first {:.4}, last {:.4}, rebased to {:.2}",
            instrument.label,
            prices[0],
            prices[prices.len() - 1],
            rebased[rebased.len() - 1]
        );

        Ok(SeriesComparison {
            label: instrument.label.clone(),
            prices,
            rebased,
            log_returns,
        })
    }

    /// Composed price on each date, failing on any non-positive result.
    fn compose(&self, instrument: &Instrument, dates: &[NaiveDate]) -> Result<Vec<f64>> {
        let fx = match (&self.fx, instrument.fx_converted) {
            (Some(fx), true) => Some(fx),
            _ => None,
        };

        dates
            .iter()
            .map(|date| {
                let native = lookup(&instrument.prices, date)?;
                let price = match fx {
                    Some(fx) => native * lookup(fx, date)?,
                    None => native,
                };

                if !(price.is_finite() && price > 0.0) {
                    return Err(CompareError::NonPositivePrice {
                        series: instrument.label.clone(),
                        date: *date,
                        price,
                    });
                }

                Ok(price)
            })
            .collect()
    }
}

fn lookup(series: &PriceSeries, date: &NaiveDate) -> Result<f64> {
    series.get(date).ok_or_else(|| CompareError::MissingDate {
        series: series.name().to_string(),
        date: *date,
    })
}
