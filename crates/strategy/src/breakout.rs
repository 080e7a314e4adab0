//! What-if re-evaluation when the live decision is NO SIGNAL.
//!
//! Each scenario rewrites the final candle of its own copy of the series so
//! price sits just past a zone edge, then re-reads RSI and %K.

use serde::Serialize;
use tracing::debug;

use common::{CandleSeries, SignalKind, Zones};

use crate::config::EngineConfig;
use crate::features::{RSI_BEARISH, RSI_BULLISH, STOCH_BEARISH, STOCH_BULLISH};
use crate::forecast::Forecast;
use crate::indicators::snapshot::Oscillators;
use crate::indicators::Reading;

/// Breakout overshoot past the zone edge (1%).
const OVERSHOOT: f64 = 0.01;
/// Target extension beyond the broken zone (3%).
const TARGET_EXTENSION: f64 = 0.03;
/// Stop distance from the current price (2%).
const STOP_DISTANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakoutScenario {
    /// Hypothetical close of the final candle.
    pub trigger_price: f64,
    pub rsi: Reading,
    pub stoch_k: Reading,
    pub signal: SignalKind,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakoutScenarios {
    pub bullish: BreakoutScenario,
    pub bearish: BreakoutScenario,
}

/// Simulate a break above resistance and a break below support.
pub fn simulate(
    series: &CandleSeries,
    zones: &Zones,
    price: f64,
    forecast: Option<&Forecast>,
    cfg: &EngineConfig,
) -> BreakoutScenarios {
    let bull_trigger = zones.resistance.high * (1.0 + OVERSHOOT);
    let bear_trigger = zones.support.low * (1.0 - OVERSHOOT);

    let bull = Oscillators::compute(&series.with_final_close(bull_trigger), cfg);
    let bear = Oscillators::compute(&series.with_final_close(bear_trigger), cfg);

    let bull_fires = bull.rsi.computed().is_some_and(|v| v > RSI_BULLISH)
        && bull.stoch_k.computed().is_some_and(|v| v > STOCH_BULLISH);
    let bear_fires = bear.rsi.computed().is_some_and(|v| v < RSI_BEARISH)
        && bear.stoch_k.computed().is_some_and(|v| v < STOCH_BEARISH);

    let mut bull_tp = zones.resistance.high * (1.0 + TARGET_EXTENSION);
    let mut bear_tp = zones.support.low * (1.0 - TARGET_EXTENSION);
    if let Some(f) = forecast.filter(|_| bull_fires || bear_fires) {
        bull_tp = bull_tp.max(f.yhat_quantile(0.75));
        bear_tp = bear_tp.min(f.yhat_quantile(0.25));
    }

    debug!(
        pair = %series.pair(),
        bull_trigger,
        bear_trigger,
        bull_fires,
        bear_fires,
        "Breakout scenarios simulated"
    );

    BreakoutScenarios {
        bullish: BreakoutScenario {
            trigger_price: bull_trigger,
            rsi: bull.rsi,
            stoch_k: bull.stoch_k,
            signal: if bull_fires { SignalKind::Buy } else { SignalKind::NoSignal },
            take_profit: bull_fires.then_some(bull_tp),
            stop_loss: bull_fires.then_some(price * (1.0 - STOP_DISTANCE)),
        },
        bearish: BreakoutScenario {
            trigger_price: bear_trigger,
            rsi: bear.rsi,
            stoch_k: bear.stoch_k,
            signal: if bear_fires { SignalKind::Sell } else { SignalKind::NoSignal },
            take_profit: bear_fires.then_some(bear_tp),
            stop_loss: bear_fires.then_some(price * (1.0 + STOP_DISTANCE)),
        },
    }
}
