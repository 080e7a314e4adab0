//! Stochastic Oscillator.

use common::Candle;

/// Stochastic Oscillator.
///
/// Compares closing price to the price range over a period:
/// %K = (Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = SMA(%K, d_period)
///
/// A window with zero range has no defined %K and yields NaN.
#[derive(Debug, Clone)]
pub struct StochasticIndicator {
    pub k_period: usize,
    pub d_period: usize,
}

impl Default for StochasticIndicator {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl StochasticIndicator {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self {
            k_period: k_period.max(1),
            d_period: d_period.max(1),
        }
    }

    /// %K aligned with `candles`; NaN before the first full window.
    pub fn k_series(&self, candles: &[Candle]) -> Vec<f64> {
        let mut out = vec![f64::NAN; candles.len()];
        if candles.len() < self.k_period {
            return out;
        }

        for i in (self.k_period - 1)..candles.len() {
            let window = &candles[(i + 1 - self.k_period)..=i];
            let lowest_low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            let highest_high = window
                .iter()
                .map(|c| c.high)
                .fold(f64::NEG_INFINITY, f64::max);

            let range = highest_high - lowest_low;
            if range > 0.0 {
                out[i] = (candles[i].close - lowest_low) / range * 100.0;
            }
        }
        out
    }

    /// %D: simple average of the last `d_period` %K values, NaN if any is missing.
    pub fn d_series(&self, k: &[f64]) -> Vec<f64> {
        let mut out = vec![f64::NAN; k.len()];
        if k.len() < self.d_period {
            return out;
        }
        for i in (self.d_period - 1)..k.len() {
            let window = &k[(i + 1 - self.d_period)..=i];
            out[i] = window.iter().sum::<f64>() / self.d_period as f64;
        }
        out
    }

    /// Both lines, aligned with `candles`.
    pub fn series(&self, candles: &[Candle]) -> (Vec<f64>, Vec<f64>) {
        let k = self.k_series(candles);
        let d = self.d_series(&k);
        (k, d)
    }
}
