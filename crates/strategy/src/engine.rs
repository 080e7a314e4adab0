use tracing::{debug, info};

use common::{CandleSeries, Error, Result, RiskLevels, SignalKind, TradeSide, Zones};
use risk::{normalize_reward_risk, refine_with_forecast, zone_levels, Strength};

use crate::breakout;
use crate::config::EngineConfig;
use crate::features::{Features, STOCH_OVERBOUGHT, STOCH_OVERSOLD};
use crate::forecast::Forecast;
use crate::indicators::IndicatorSnapshot;
use crate::report::{indicator_trends, ConfidenceLevel, SignalReport};
use crate::zones::detect_zones;

/// Confidence floor for strong calls.
pub const STRONG_CONFIDENCE_FLOOR: f64 = 70.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
/// Votes needed for a medium call.
pub const MEDIUM_MIN_POINTS: usize = 2;

/// One rung of the decision ladder.
pub struct Rule {
    pub name: &'static str,
    pub side: TradeSide,
    pub strength: Strength,
    pub applies: fn(&Features, &IndicatorSnapshot) -> bool,
}

/// Evaluated top to bottom; the first rule that applies decides.
pub static DECISION_LADDER: [Rule; 4] = [
    Rule {
        name: "strong_bullish",
        side: TradeSide::Buy,
        strength: Strength::Strong,
        applies: strong_bullish,
    },
    Rule {
        name: "strong_bearish",
        side: TradeSide::Sell,
        strength: Strength::Strong,
        applies: strong_bearish,
    },
    Rule {
        name: "medium_bullish",
        side: TradeSide::Buy,
        strength: Strength::Medium,
        applies: medium_bullish,
    },
    Rule {
        name: "medium_bearish",
        side: TradeSide::Sell,
        strength: Strength::Medium,
        applies: medium_bearish,
    },
];

fn strong_bullish(f: &Features, _: &IndicatorSnapshot) -> bool {
    f.price_vs_basis.is_bullish() && f.ema.is_bullish() && f.momentum.is_bullish()
}

fn strong_bearish(f: &Features, _: &IndicatorSnapshot) -> bool {
    f.price_vs_basis.is_bearish() && f.ema.is_bearish() && f.momentum.is_bearish()
}

/// Medium rules need both oscillators computed; a fallback value fails the gate.
fn medium_bullish(f: &Features, snap: &IndicatorSnapshot) -> bool {
    let not_overbought = snap.rsi.computed().is_some_and(|v| v < RSI_OVERBOUGHT)
        && snap.stoch_k.computed().is_some_and(|v| v < STOCH_OVERBOUGHT);
    f.bullish_points() >= MEDIUM_MIN_POINTS && not_overbought
}

fn medium_bearish(f: &Features, snap: &IndicatorSnapshot) -> bool {
    let not_oversold = snap.rsi.computed().is_some_and(|v| v > RSI_OVERSOLD)
        && snap.stoch_k.computed().is_some_and(|v| v > STOCH_OVERSOLD);
    f.bearish_points() >= MEDIUM_MIN_POINTS && not_oversold
}

/// First matching rung of `DECISION_LADDER`.
pub fn decide(features: &Features, snap: &IndicatorSnapshot) -> Option<&'static Rule> {
    DECISION_LADDER
        .iter()
        .find(|rule| (rule.applies)(features, snap))
}

/// Stateless signal-scoring engine. One call evaluates one candle window.
#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    cfg: EngineConfig,
}

impl SignalEngine {
    pub fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Run every stage on `series`.
    ///
    /// Only the guard stage fails: too few candles, a non-finite last close,
    /// or EMA / Keltner values that are zero even after fallback substitution.
    pub fn evaluate(&self, series: &CandleSeries) -> Result<SignalReport> {
        if series.len() < self.cfg.candle_limit {
            return Err(Error::InsufficientData {
                got: series.len(),
                need: self.cfg.candle_limit,
            });
        }

        debug!(pair = %series.pair(), candles = series.len(), "Running strategy indicators");
        let snap = IndicatorSnapshot::compute(series, &self.cfg);
        if !snap.current_price.is_finite() {
            return Err(Error::InvalidIndicator("last close is not a finite price".into()));
        }
        if snap.ema_fast.value() == 0.0 || snap.ema_slow.value() == 0.0 {
            return Err(Error::InvalidIndicator("EMA evaluated to zero".into()));
        }
        if snap.keltner_upper.value() == 0.0 || snap.keltner_lower.value() == 0.0 {
            return Err(Error::InvalidIndicator("Keltner band evaluated to zero".into()));
        }

        let zones = detect_zones(series, self.cfg.zone_lookback);
        let price = snap.current_price;

        let features = Features::derive(&snap);
        let mut confidence = features.confidence();
        debug!(
            pair = %series.pair(),
            bullish = features.bullish_points(),
            bearish = features.bearish_points(),
            ?features,
            "Feature vote"
        );

        let rule = decide(&features, &snap);
        if rule.is_some_and(|r| r.strength == Strength::Strong) {
            confidence = confidence.max(STRONG_CONFIDENCE_FLOOR);
        }

        let forecast = Forecast::project(series, self.cfg.forecast_horizon);
        let levels = rule.map(|r| self.risk_levels(r, price, &zones, forecast.as_ref()));

        let signal = rule.map_or(SignalKind::NoSignal, |r| r.side.into());
        let breakout = (signal == SignalKind::NoSignal).then(|| {
            breakout::simulate(series, &zones, price, forecast.as_ref(), &self.cfg)
        });

        info!(
            pair = %series.pair(),
            %signal,
            rule = rule.map(|r| r.name),
            confidence,
            sl = levels.map(|l| l.stop_loss),
            tp = levels.map(|l| l.take_profit),
            "Signal evaluated"
        );

        Ok(SignalReport {
            pair: series.pair().to_string(),
            signal,
            rule: rule.map(|r| r.name),
            strength: rule.map(|r| r.strength),
            current_price: price,
            take_profit: levels.map(|l| l.take_profit),
            stop_loss: levels.map(|l| l.stop_loss),
            confidence,
            confidence_level: ConfidenceLevel::from_score(confidence),
            bullish_points: features.bullish_points(),
            bearish_points: features.bearish_points(),
            indicator_trends: indicator_trends(&snap, &features, confidence),
            features,
            indicators: snap,
            support_zone: zones.support,
            resistance_zone: zones.resistance,
            breakout,
            candles: series.len(),
        })
    }

    /// Zone levels, widened by the forecast when one exists, then held to the
    /// minimum reward/risk.
    fn risk_levels(
        &self,
        rule: &Rule,
        price: f64,
        zones: &Zones,
        forecast: Option<&Forecast>,
    ) -> RiskLevels {
        let mut levels = zone_levels(rule.side, rule.strength, price, zones);
        if let Some(f) = forecast {
            levels = refine_with_forecast(rule.side, price, zones, levels, f.bounds(rule.side));
        }
        normalize_reward_risk(rule.side, price, levels, self.cfg.min_reward_risk)
    }
}
