//! Date alignment across multiple price series.

use crate::error::{CompareError, Result};
use crate::types::PriceSeries;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Coverage of one series before and after alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesCoverage {
    pub name: String,
    /// Observations in the loaded series.
    pub observations: usize,
    /// Observations dropped because another series has no price on that date.
    pub dropped: usize,
}

/// Summary of an alignment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentReport {
    pub common_dates: usize,
    pub coverage: Vec<SeriesCoverage>,
}

/// Dates present in every series, in strictly ascending order.
///
/// # Errors
/// [`CompareError::NoData`] when no series is given, and
/// [`CompareError::EmptyIntersection`] when the series share no date.
pub fn common_dates(series: &[&PriceSeries]) -> Result<Vec<NaiveDate>> {
    let (first, rest) = series.split_first().ok_or(CompareError::NoData)?;

    // Walk the first series in order; BTreeMap iteration keeps the result sorted.
    let dates: Vec<NaiveDate> = first
        .dates()
        .filter(|date| rest.iter().all(|s| s.contains(date)))
        .copied()
        .collect();

    if dates.is_empty() {
        return Err(CompareError::EmptyIntersection(
            series.iter().map(|s| s.name().to_string()).collect(),
        ));
    }

    debug!(
        "{} common dates from {} to {}",
        dates.len(),
        dates[0],
        dates[dates.len() - 1]
    );

    Ok(dates)
}

/// Describe how much of each series survives alignment to `dates`.
pub fn alignment_report(series: &[&PriceSeries], dates: &[NaiveDate]) -> AlignmentReport {
    let kept: BTreeSet<NaiveDate> = dates.iter().copied().collect();

    let coverage = series
        .iter()
        .map(|s| {
            let retained = s.dates().filter(|d| kept.contains(*d)).count();
            SeriesCoverage {
                name: s.name().to_string(),
                observations: s.len(),
                dropped: s.len() - retained,
            }
        })
        .collect();

    AlignmentReport {
        common_dates: dates.len(),
        coverage,
    }
}

impl AlignmentReport {
    /// Log the report at info level.
    pub fn log(&self) {
        info!("Aligned on {} common dates", self.common_dates);
        for c in &self.coverage {
            info!(
                "  {}: {} observations, {} dropped",
                c.name, c.observations, c.dropped
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
    }

    fn series(name: &str, days: &[u32]) -> PriceSeries {
        PriceSeries::from_pairs(name, days.iter().map(|&day| (d(day), day as f64)))
    }

    #[test]
    fn test_two_series_intersection() {
        let a = series("A", &[1, 2, 3, 5]);
        let b = series("B", &[2, 3, 4, 5]);
        let dates = common_dates(&[&a, &b]).unwrap();
        assert_eq!(dates, vec![d(2), d(3), d(5)]);
    }

    #[test]
    fn test_three_series_intersection() {
        let a = series("A", &[1, 2, 3, 4]);
        let b = series("B", &[1, 2, 3, 4]);
        let fx = series("FX", &[1, 3, 4]);
        let dates = common_dates(&[&a, &b, &fx]).unwrap();
        assert_eq!(dates, vec![d(1), d(3), d(4)]);
    }

    #[test]
    fn test_date_in_one_series_only_is_excluded() {
        let a = series("A", &[1, 2, 9]);
        let b = series("B", &[1, 2]);
        let fx = series("FX", &[1, 2, 9]);
        let dates = common_dates(&[&a, &b, &fx]).unwrap();
        assert!(!dates.contains(&d(9)));
    }

    #[test]
    fn test_result_is_sorted_regardless_of_input_order() {
        let a = PriceSeries::from_pairs("A", vec![(d(3), 1.0), (d(1), 1.0), (d(2), 1.0)]);
        let b = PriceSeries::from_pairs("B", vec![(d(2), 1.0), (d(3), 1.0), (d(1), 1.0)]);
        let dates = common_dates(&[&b, &a]).unwrap();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
    }

    #[test]
    fn test_empty_intersection() {
        let a = series("A", &[1, 2]);
        let b = series("B", &[3, 4]);
        match common_dates(&[&a, &b]) {
            Err(CompareError::EmptyIntersection(names)) => {
                assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("expected empty intersection, got {other:?}"),
        }
    }

    #[test]
    fn test_no_series() {
        assert!(matches!(common_dates(&[]), Err(CompareError::NoData)));
    }

    #[test]
    fn test_alignment_report() {
        let a = series("A", &[1, 2, 3, 5]);
        let b = series("B", &[2, 3]);
        let dates = common_dates(&[&a, &b]).unwrap();
        let report = alignment_report(&[&a, &b], &dates);

        assert_eq!(report.common_dates, 2);
        assert_eq!(report.coverage[0].observations, 4);
        assert_eq!(report.coverage[0].dropped, 2);
        assert_eq!(report.coverage[1].dropped, 0);
    }
}
