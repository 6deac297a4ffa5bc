//! Property-based tests using proptest for invariant testing.
//!
//! These tests verify that:
//! 1. Common dates are strictly ascending and equal the key intersection
//! 2. Rebased series start at exactly 100 and follow raw[i] / raw[0] * 100
//! 3. Log returns have one fewer element and match ln(raw[i+1]) - ln(raw[i])
//! 4. Loading a generated CSV keeps every row and every exact price

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use std::collections::BTreeSet;

use crosslist::align::common_dates;
use crosslist::data::{load_csv_from_str, DataConfig};
use crosslist::transform::{log_returns, rebase, unrebase, Transformer};
use crosslist::types::{Instrument, PriceSeries};

fn day(offset: u16) -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + Duration::days(offset as i64)
}

/// Strategy to generate positive price sequences
fn positive_prices(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01..10_000.0f64, 1..max_len)
}

/// Strategy to generate a set of day offsets
fn day_set() -> impl Strategy<Value = BTreeSet<u16>> {
    prop::collection::btree_set(0..400u16, 0..120)
}

fn series_from(name: &str, days: &BTreeSet<u16>) -> PriceSeries {
    PriceSeries::from_pairs(name, days.iter().map(|&d| (day(d), 1.0 + d as f64)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // ========================================================================
    // Alignment
    // ========================================================================

    #[test]
    fn common_dates_equal_key_intersection(a in day_set(), b in day_set(), c in day_set()) {
        let sa = series_from("A", &a);
        let sb = series_from("B", &b);
        let sc = series_from("C", &c);

        let expected: Vec<NaiveDate> = a
            .iter()
            .filter(|d| b.contains(d) && c.contains(d))
            .map(|&d| day(d))
            .collect();

        match common_dates(&[&sa, &sb, &sc]) {
            Ok(dates) => {
                prop_assert_eq!(&dates, &expected);
                prop_assert!(dates.windows(2).all(|w| w[0] < w[1]),
                    "common dates must be strictly ascending");
            }
            Err(_) => prop_assert!(expected.is_empty()),
        }
    }

    #[test]
    fn date_missing_from_one_series_is_excluded(a in day_set(), extra in 400..500u16) {
        let mut with_extra = a.clone();
        with_extra.insert(extra);

        let sa = series_from("A", &with_extra);
        let sb = series_from("B", &a);
        let fx = series_from("FX", &with_extra);

        if let Ok(dates) = common_dates(&[&sa, &sb, &fx]) {
            prop_assert!(!dates.contains(&day(extra)));
        }
    }

    // ========================================================================
    // Rebasing
    // ========================================================================

    #[test]
    fn rebased_first_is_exactly_100(prices in positive_prices(100)) {
        let rebased = rebase(&prices);
        prop_assert_eq!(rebased.len(), prices.len());
        prop_assert_eq!(rebased[0], 100.0);
    }

    #[test]
    fn rebased_matches_formula(prices in positive_prices(100)) {
        let rebased = rebase(&prices);
        for i in 1..prices.len() {
            let expected = prices[i] / prices[0] * 100.0;
            prop_assert_eq!(rebased[i], expected);
        }
    }

    #[test]
    fn unrebase_recovers_raw(prices in positive_prices(100)) {
        let back = unrebase(&rebase(&prices), prices[0]);
        for (raw, recovered) in prices.iter().zip(&back) {
            let tolerance = raw.abs() * 1e-12;
            prop_assert!((raw - recovered).abs() <= tolerance,
                "raw {} recovered as {}", raw, recovered);
        }
    }

    // ========================================================================
    // Log returns
    // ========================================================================

    #[test]
    fn log_returns_length_and_formula(prices in positive_prices(100)) {
        let returns = log_returns(&prices);
        prop_assert_eq!(returns.len(), prices.len() - 1);
        for (i, r) in returns.iter().enumerate() {
            prop_assert_eq!(*r, prices[i + 1].ln() - prices[i].ln());
        }
    }

    #[test]
    fn log_returns_sum_to_total_log_change(prices in positive_prices(50)) {
        let total: f64 = log_returns(&prices).iter().sum();
        let expected = prices[prices.len() - 1].ln() - prices[0].ln();
        prop_assert!((total - expected).abs() < 1e-9);
    }

    // ========================================================================
    // Transformer with FX
    // ========================================================================

    #[test]
    fn fx_conversion_multiplies_prices(
        native in prop::collection::vec(1.0..500.0f64, 2..40),
        rate in 0.5..1.5f64,
    ) {
        let a = PriceSeries::from_pairs("A", native.iter().enumerate().map(|(i, &p)| (day(i as u16), p)));
        let l = PriceSeries::from_pairs("L", native.iter().enumerate().map(|(i, &p)| (day(i as u16), p)));
        let fx = PriceSeries::from_pairs("FX", (0..native.len()).map(|i| (day(i as u16), rate)));

        let comparison = Transformer::with_fx(fx)
            .compare(&[Instrument::converted("A", a), Instrument::native("L", l)])
            .unwrap();

        let converted = &comparison.series[0];
        let untouched = &comparison.series[1];
        for (i, p) in native.iter().enumerate() {
            prop_assert_eq!(converted.prices[i], p * rate);
            prop_assert_eq!(untouched.prices[i], *p);
        }
        prop_assert_eq!(comparison.dates.len(), native.len());
        prop_assert_eq!(converted.log_returns.len(), native.len() - 1);
    }

    // ========================================================================
    // Loader
    // ========================================================================

    #[test]
    fn loader_keeps_every_row(
        rows in prop::collection::btree_map(0..1000u16, 0.0001..100_000.0f64, 1..60)
    ) {
        let mut csv = String::from("Date,Price\n");
        for (d, p) in &rows {
            csv.push_str(&format!("{},{}\n", day(*d).format("%Y-%m-%d"), p));
        }

        let series = load_csv_from_str("X", &csv, &DataConfig::default()).unwrap();
        prop_assert_eq!(series.len(), rows.len());
        for (d, p) in &rows {
            // f64 Display round-trips exactly through parse
            prop_assert_eq!(series.get(&day(*d)), Some(*p));
        }
    }
}
