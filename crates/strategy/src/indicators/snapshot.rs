use serde::Serialize;

use common::CandleSeries;

use super::{
    adaptive_ema_windows, ema_series, latest, previous, KeltnerChannel, Reading, RsiIndicator,
    StochasticIndicator,
};
use crate::config::EngineConfig;

/// Every indicator value the engine reads, taken at the final candle.
///
/// Values that could not be computed are already replaced by their fallback:
/// oscillators, EMAs and the Keltner basis by the close, Keltner bands by
/// +/-2% of it and momentum by zero. Decisions read oscillators through
/// `Reading::computed`, so a substituted close never passes a threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub current_price: f64,
    pub rsi: Reading,
    /// RSI one candle earlier, for cross detection.
    pub rsi_prev: Option<f64>,
    pub stoch_k: Reading,
    pub stoch_k_prev: Option<f64>,
    pub stoch_d: Reading,
    pub ema_fast: Reading,
    pub ema_slow: Reading,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub keltner_upper: Reading,
    pub keltner_basis: Reading,
    pub keltner_lower: Reading,
    pub keltner_period: usize,
    /// Percent change of the close over `momentum_lookback` candles.
    pub momentum_pct: Reading,
}

/// RSI and %K only, as recomputed for breakout what-ifs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Oscillators {
    pub rsi: Reading,
    pub stoch_k: Reading,
}

impl Oscillators {
    pub fn compute(series: &CandleSeries, cfg: &EngineConfig) -> Self {
        let closes = series.closes();
        let price = latest(&closes);
        let rsi = RsiIndicator::new(cfg.rsi_period).series(&closes);
        let stoch = StochasticIndicator::new(cfg.stoch_k_period, cfg.stoch_d_period);
        let k = stoch.k_series(series.candles());
        Self {
            rsi: Reading::finite_or(latest(&rsi), price),
            stoch_k: Reading::finite_or(latest(&k), price),
        }
    }
}

impl IndicatorSnapshot {
    pub fn compute(series: &CandleSeries, cfg: &EngineConfig) -> Self {
        let closes = series.closes();
        let price = latest(&closes);

        let rsi = RsiIndicator::new(cfg.rsi_period).series(&closes);
        let (k, d) =
            StochasticIndicator::new(cfg.stoch_k_period, cfg.stoch_d_period).series(series.candles());

        let (fast_period, slow_period) = adaptive_ema_windows(closes.len());
        let ema_fast = latest(&ema_series(&closes, fast_period));
        let ema_slow = latest(&ema_series(&closes, slow_period));

        let keltner = KeltnerChannel::new(cfg.keltner_period, cfg.keltner_multiplier);
        let bands = keltner.compute(series.candles());

        Self {
            current_price: price,
            rsi: Reading::finite_or(latest(&rsi), price),
            rsi_prev: previous(&rsi),
            stoch_k: Reading::finite_or(latest(&k), price),
            stoch_k_prev: previous(&k),
            stoch_d: Reading::finite_or(latest(&d), price),
            ema_fast: Reading::nonzero_or(ema_fast, price),
            ema_slow: Reading::nonzero_or(ema_slow, price),
            ema_fast_period: fast_period,
            ema_slow_period: slow_period,
            keltner_upper: Reading::nonzero_or(bands.upper, price * 1.02),
            keltner_basis: Reading::nonzero_or(bands.basis, price),
            keltner_lower: Reading::nonzero_or(bands.lower, price * 0.98),
            keltner_period: keltner.effective_period(closes.len()),
            momentum_pct: momentum(&closes, cfg.momentum_lookback),
        }
    }
}

/// Percent move from the close `lookback` candles back (counting the last
/// candle as one) to the latest close.
fn momentum(closes: &[f64], lookback: usize) -> Reading {
    let raw = match (closes.len().checked_sub(lookback), closes.last()) {
        (Some(i), Some(&last)) if lookback > 0 => (last - closes[i]) / closes[i] * 100.0,
        _ => f64::NAN,
    };
    Reading::finite_or(raw, 0.0)
}
