//! Support / resistance detection from rolling extrema.
//!
//! The bands are descriptive statistics of the recent window. Nothing orders
//! them relative to the current price.

use common::{CandleSeries, Zone, Zones};

/// Zones for `series` using a `lookback`-candle rolling window.
///
/// With less than `lookback` candles (or no usable values) the bands fall back
/// to support = (-5%, -2%) and resistance = (+2%, +5%) around the last close.
pub fn detect_zones(series: &CandleSeries, lookback: usize) -> Zones {
    let price = series.last_close().unwrap_or(f64::NAN);
    if lookback == 0 || series.len() < lookback {
        return fallback_zones(price);
    }

    let rolling_highs = rolling(&series.highs(), lookback, f64::max);
    let rolling_lows = rolling(&series.lows(), lookback, f64::min);

    let (Some(highs), Some(lows)) = (
        sorted_finite(tail(&rolling_highs, lookback)),
        sorted_finite(tail(&rolling_lows, lookback)),
    )
    else {
        return fallback_zones(price);
    };

    Zones {
        support: Zone::new(lows[0], quantile(&lows, 0.2)),
        resistance: Zone::new(quantile(&highs, 0.8), highs[highs.len() - 1]),
    }
}

pub fn fallback_zones(price: f64) -> Zones {
    Zones {
        support: Zone::new(price * 0.95, price * 0.98),
        resistance: Zone::new(price * 1.02, price * 1.05),
    }
}

/// Rolling fold over a full window; positions before the first window are NaN.
fn rolling(values: &[f64], window: usize, fold: fn(f64, f64) -> f64) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return f64::NAN;
            }
            let w = &values[i + 1 - window..=i];
            w[1..].iter().copied().fold(w[0], fold)
        })
        .collect()
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

fn sorted_finite(values: &[f64]) -> Option<Vec<f64>> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    Some(v)
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
