//! Five-feature directional vote.
//!
//! Thresholds are empirically tuned and deliberately asymmetric around the
//! oscillator midpoints. Keep the literals as they are.

use serde::Serialize;

use crate::indicators::IndicatorSnapshot;

pub const RSI_MIDLINE: f64 = 50.0;
pub const RSI_BULLISH: f64 = 52.0;
pub const RSI_BEARISH: f64 = 48.0;
pub const STOCH_OVERSOLD: f64 = 20.0;
pub const STOCH_OVERBOUGHT: f64 = 80.0;
pub const STOCH_BULLISH: f64 = 45.0;
pub const STOCH_BEARISH: f64 = 55.0;
/// Relative margin for price-vs-basis and fast-vs-slow EMA (0.1%).
pub const TREND_MARGIN: f64 = 0.001;
/// Momentum beyond +/- this many percent counts as directional.
pub const MOMENTUM_THRESHOLD: f64 = 1.0;

/// Number of voting features; confidence is a share of this total.
pub const FEATURE_COUNT: usize = 5;

/// Lean of one feature. Bullish and bearish are exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl Bias {
    /// A feature whose raw conditions point both ways has no lean.
    pub fn from_flags(bullish: bool, bearish: bool) -> Self {
        match (bullish, bearish) {
            (true, false) => Bias::Bullish,
            (false, true) => Bias::Bearish,
            _ => Bias::Neutral,
        }
    }

    pub fn is_bullish(self) -> bool {
        self == Bias::Bullish
    }

    pub fn is_bearish(self) -> bool {
        self == Bias::Bearish
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Features {
    pub rsi: Bias,
    pub stochastic: Bias,
    pub price_vs_basis: Bias,
    pub ema: Bias,
    pub momentum: Bias,
}

impl Features {
    pub fn derive(snap: &IndicatorSnapshot) -> Self {
        Self {
            rsi: snap.rsi.computed().map_or(Bias::Neutral, |v| rsi_bias(v, snap.rsi_prev)),
            stochastic: snap
                .stoch_k
                .computed()
                .map_or(Bias::Neutral, |k| stochastic_bias(k, snap.stoch_k_prev)),
            price_vs_basis: margin_bias(snap.current_price, snap.keltner_basis.value()),
            ema: margin_bias(snap.ema_fast.value(), snap.ema_slow.value()),
            momentum: momentum_bias(snap.momentum_pct.value()),
        }
    }

    pub fn all(&self) -> [Bias; FEATURE_COUNT] {
        [self.rsi, self.stochastic, self.price_vs_basis, self.ema, self.momentum]
    }

    pub fn bullish_points(&self) -> usize {
        self.all().iter().filter(|b| b.is_bullish()).count()
    }

    pub fn bearish_points(&self) -> usize {
        self.all().iter().filter(|b| b.is_bearish()).count()
    }

    /// Share of the votes held by the larger camp, in percent.
    pub fn confidence(&self) -> f64 {
        self.bullish_points().max(self.bearish_points()) as f64 / FEATURE_COUNT as f64 * 100.0
    }
}

fn rsi_bias(rsi: f64, prev: Option<f64>) -> Bias {
    let cross_up = rsi > RSI_MIDLINE && prev.is_some_and(|p| p <= RSI_MIDLINE);
    let cross_down = rsi < RSI_MIDLINE && prev.is_some_and(|p| p >= RSI_MIDLINE);
    Bias::from_flags(cross_up || rsi > RSI_BULLISH, cross_down || rsi < RSI_BEARISH)
}

fn stochastic_bias(k: f64, prev: Option<f64>) -> Bias {
    let cross_up = k > STOCH_OVERSOLD && prev.is_some_and(|p| p <= STOCH_OVERSOLD);
    let cross_down = k < STOCH_OVERBOUGHT && prev.is_some_and(|p| p >= STOCH_OVERBOUGHT);
    Bias::from_flags(
        k > STOCH_OVERSOLD && (cross_up || k > STOCH_BULLISH),
        k < STOCH_OVERBOUGHT && (cross_down || k < STOCH_BEARISH),
    )
}

/// `value` against `reference` with a symmetric 0.1% dead band.
fn margin_bias(value: f64, reference: f64) -> Bias {
    Bias::from_flags(
        value > reference * (1.0 + TREND_MARGIN),
        value < reference * (1.0 - TREND_MARGIN),
    )
}

fn momentum_bias(pct: f64) -> Bias {
    Bias::from_flags(pct > MOMENTUM_THRESHOLD, pct < -MOMENTUM_THRESHOLD)
}
