//! Keltner Channel: EMA basis +/- multiplier * ATR.

use common::Candle;

use super::ema::ema_series;
use super::latest;

/// Raw band values for the latest candle; any of them may be NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeltnerBands {
    pub upper: f64,
    pub basis: f64,
    pub lower: f64,
}

#[derive(Debug, Clone)]
pub struct KeltnerChannel {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for KeltnerChannel {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
        }
    }
}

impl KeltnerChannel {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self { period, multiplier }
    }

    /// Window actually used for `len` candles: the requested period, shortened
    /// to a third of the history but never below 5.
    pub fn effective_period(&self, len: usize) -> usize {
        self.period.min((len / 3).max(5))
    }

    pub fn compute(&self, candles: &[Candle]) -> KeltnerBands {
        let period = self.effective_period(candles.len());
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let basis = latest(&ema_series(&closes, period));
        let atr = latest(&wilder_smooth(&true_range(candles), period));

        KeltnerBands {
            upper: basis + self.multiplier * atr,
            basis,
            lower: basis - self.multiplier * atr,
        }
    }
}

/// True range per candle; the first candle has no previous close and uses high - low.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let hl = c.high - c.low;
            match i.checked_sub(1).map(|p| candles[p].close) {
                Some(prev_close) => hl
                    .max((c.high - prev_close).abs())
                    .max((c.low - prev_close).abs()),
                None => hl,
            }
        })
        .collect()
}

/// Wilder smoothing seeded with the SMA of the first `period` values.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let p = period as f64;
    let mut avg = values[..period].iter().sum::<f64>() / p;
    out[period - 1] = avg;
    for (i, &v) in values.iter().enumerate().skip(period) {
        avg = (avg * (p - 1.0) + v) / p;
        out[i] = avg;
    }
    out
}
