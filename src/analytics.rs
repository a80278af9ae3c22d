//! Descriptive statistics over snapshot windows
//!
//! All functions take a window of snapshots ordered newest-first, the
//! order the store returns. For regression the window is reversed so
//! index 0 is the oldest sample; the same orientation defines open
//! (oldest) and close (newest) in the market summary, so a positive
//! slope always means rising prices.

use crate::{
    constants::{
        MIN_SUMMARY_SAMPLES, MIN_TREND_SAMPLES, MOMENTUM_CHANGE_WEIGHT, MOMENTUM_MAX,
        MOMENTUM_SLOPE_WEIGHT,
    },
    error::TrackerError,
    types::{MarketAnalytics, PriceSnapshot, TrendAnalysis, TrendLabel, VolatilityLabel},
};

/// Computes open/close/high/low/average and net change over a window
///
/// Requires at least 2 samples; fails with `InsufficientData` otherwise.
pub fn market_analytics(
    asset_id: &str,
    window: &[PriceSnapshot],
) -> Result<MarketAnalytics, TrackerError> {
    let samples = window.len();
    if samples < MIN_SUMMARY_SAMPLES {
        return Err(TrackerError::insufficient_data(
            asset_id,
            MIN_SUMMARY_SAMPLES,
            samples,
        ));
    }

    let close = window[0].price;
    let open = window[samples - 1].price;

    let mut high = f64::MIN;
    let mut low = f64::MAX;
    let mut sum = 0.0;
    for snapshot in window {
        high = high.max(snapshot.price);
        low = low.min(snapshot.price);
        sum += snapshot.price;
    }

    Ok(MarketAnalytics {
        asset_id: asset_id.to_string(),
        samples,
        open,
        close,
        high,
        low,
        average: sum / samples as f64,
        change_pct: net_change_pct(open, close),
    })
}

/// Computes trend, volatility and momentum over a window
///
/// Requires at least 4 samples; fails with `InsufficientData` otherwise.
///
/// - Volatility is the coefficient of variation (population standard
///   deviation over mean), bucketed by [`VolatilityLabel::classify`].
/// - Trend is the least-squares slope of price against chronological
///   index, normalized by the mean price and scaled to percent, bucketed
///   by [`TrendLabel::classify`].
/// - Momentum blends the absolute net change and absolute normalized
///   slope, clamped to [0, 10].
pub fn trend_analysis(
    asset_id: &str,
    window: &[PriceSnapshot],
) -> Result<TrendAnalysis, TrackerError> {
    let samples = window.len();
    if samples < MIN_TREND_SAMPLES {
        return Err(TrackerError::insufficient_data(
            asset_id,
            MIN_TREND_SAMPLES,
            samples,
        ));
    }

    // Oldest-first for regression: index 0 is the oldest sample
    let prices: Vec<f64> = window.iter().rev().map(|s| s.price).collect();

    let mean = mean(&prices);
    let cv = if mean == 0.0 {
        0.0
    } else {
        population_std_dev(&prices, mean) / mean
    };

    let slope = ols_slope(&prices);
    let normalized_slope = if mean == 0.0 {
        0.0
    } else {
        slope / mean * 100.0
    };

    let open = prices[0];
    let close = prices[samples - 1];
    let change_pct = net_change_pct(open, close);

    Ok(TrendAnalysis {
        asset_id: asset_id.to_string(),
        samples,
        trend: TrendLabel::classify(normalized_slope),
        volatility: VolatilityLabel::classify(cv),
        momentum: momentum_score(change_pct, normalized_slope),
        change_pct,
    })
}

/// Net change from open to close in percent; 0 when open is 0
fn net_change_pct(open: f64, close: f64) -> f64 {
    if open == 0.0 {
        0.0
    } else {
        (close - open) / open * 100.0
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Ordinary least-squares slope of `values` against their index
///
/// Returns 0 when the denominator degenerates.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, v)| i as f64 * v).sum();
    let sum_x2: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    }
}

/// Momentum score in [0, 10]
fn momentum_score(change_pct: f64, normalized_slope: f64) -> f64 {
    (change_pct.abs() * MOMENTUM_CHANGE_WEIGHT + normalized_slope.abs() * MOMENTUM_SLOPE_WEIGHT)
        .clamp(0.0, MOMENTUM_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Builds a newest-first window: `prices[0]` is the most recent
    fn window(prices: &[f64]) -> Vec<PriceSnapshot> {
        let n = prices.len() as i64;
        prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let at = Utc.timestamp_opt(1_700_000_000 + (n - i as i64), 0).unwrap();
                PriceSnapshot::at("bitcoin", *price, at)
            })
            .collect()
    }

    #[test]
    fn summary_open_is_oldest_close_is_newest() {
        let window = window(&[100.0, 105.0, 95.0, 110.0]);
        let summary = market_analytics("bitcoin", &window).unwrap();

        assert_eq!(summary.samples, 4);
        assert_eq!(summary.open, 110.0);
        assert_eq!(summary.close, 100.0);
        assert_eq!(summary.high, 110.0);
        assert_eq!(summary.low, 95.0);
        assert!((summary.average - 102.5).abs() < 1e-9);
        assert!((summary.change_pct - (-9.090909090909092)).abs() < 1e-9);
    }

    #[test]
    fn summary_requires_two_samples() {
        let err = market_analytics("bitcoin", &window(&[100.0])).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InsufficientData {
                required: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn summary_zero_open_yields_zero_change() {
        let summary = market_analytics("bitcoin", &window(&[5.0, 0.0])).unwrap();
        assert_eq!(summary.open, 0.0);
        assert_eq!(summary.change_pct, 0.0);
    }

    #[test]
    fn trend_requires_four_samples() {
        let err = trend_analysis("bitcoin", &window(&[100.0, 101.0, 102.0])).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InsufficientData {
                required: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn volatility_buckets_are_monotonic_in_cv() {
        assert_eq!(VolatilityLabel::classify(0.005), VolatilityLabel::Low);
        assert_eq!(VolatilityLabel::classify(0.03), VolatilityLabel::Medium);
        assert_eq!(VolatilityLabel::classify(0.10), VolatilityLabel::High);
    }

    #[test]
    fn flat_series_is_sideways_and_low_volatility() {
        let analysis = trend_analysis("bitcoin", &window(&[100.0; 6])).unwrap();
        assert_eq!(analysis.trend, TrendLabel::Sideways);
        assert_eq!(analysis.volatility, VolatilityLabel::Low);
        assert_eq!(analysis.momentum, 0.0);
        assert_eq!(analysis.change_pct, 0.0);
    }

    #[test]
    fn rising_series_is_strong_uptrend() {
        // Oldest-first prices 1,2,3,4: slope 1, mean 2.5, normalized 40
        let analysis = trend_analysis("bitcoin", &window(&[4.0, 3.0, 2.0, 1.0])).unwrap();
        assert_eq!(analysis.trend, TrendLabel::StrongUptrend);
        assert_eq!(analysis.momentum, 10.0);
        assert!((analysis.change_pct - 300.0).abs() < 1e-9);
    }

    #[test]
    fn falling_series_is_strong_downtrend() {
        let analysis = trend_analysis("bitcoin", &window(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(analysis.trend, TrendLabel::StrongDowntrend);
    }

    #[test]
    fn all_zero_prices_degrade_gracefully() {
        let analysis = trend_analysis("bitcoin", &window(&[0.0; 5])).unwrap();
        assert_eq!(analysis.trend, TrendLabel::Sideways);
        assert_eq!(analysis.volatility, VolatilityLabel::Low);
        assert_eq!(analysis.momentum, 0.0);
    }

    #[test]
    fn momentum_is_clamped_regardless_of_magnitude() {
        let analysis =
            trend_analysis("bitcoin", &window(&[100_000.0, 10.0, 5.0, 1.0])).unwrap();
        assert!(analysis.momentum <= 10.0);
        assert!(analysis.momentum >= 0.0);
        assert_eq!(analysis.momentum, 10.0);
    }

    #[test]
    fn ols_slope_degenerate_denominator_is_zero() {
        assert_eq!(ols_slope(&[42.0]), 0.0);
        assert_eq!(ols_slope(&[]), 0.0);
    }

    #[test]
    fn population_std_dev_matches_known_value() {
        // Prices 2,4,4,4,5,5,7,9: mean 5, population std dev 2
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values);
        assert_eq!(m, 5.0);
        assert_eq!(population_std_dev(&values, m), 2.0);
    }
}
