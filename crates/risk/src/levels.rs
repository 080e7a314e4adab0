use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{RiskLevels, TradeSide, Zones};

/// Minimum reward-to-risk ratio every directional call must carry.
pub const MIN_REWARD_RISK: f64 = 1.5;

/// Buffer around price applied to strong calls (1.5%).
const STRONG_BUFFER: f64 = 0.015;
/// Buffer around price applied to medium calls and forecast refinement (2%).
const MEDIUM_BUFFER: f64 = 0.02;

/// How decisively the decision ladder fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Medium,
}

impl Strength {
    fn buffer(self) -> f64 {
        match self {
            Strength::Strong => STRONG_BUFFER,
            Strength::Medium => MEDIUM_BUFFER,
        }
    }
}

/// Forecast-derived candidate levels for one side.
///
/// For a BUY, `take_profit` is the 75th percentile of the projected path and
/// `stop_loss` the lowest lower bound; for a SELL, the 25th percentile and the
/// highest upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastBounds {
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// Initial stop/target from the zones, never closer than the strength buffer.
pub fn zone_levels(side: TradeSide, strength: Strength, price: f64, zones: &Zones) -> RiskLevels {
    let buffer = strength.buffer();
    match side {
        TradeSide::Buy => RiskLevels {
            stop_loss: zones.support.low.min(price * (1.0 - buffer)),
            take_profit: zones.resistance.high.max(price * (1.0 + buffer)),
        },
        TradeSide::Sell => RiskLevels {
            stop_loss: zones.resistance.high.max(price * (1.0 + buffer)),
            take_profit: zones.support.low.min(price * (1.0 - buffer)),
        },
    }
}

/// Widen `levels` with forecast bounds, keeping the farther level on each side.
pub fn refine_with_forecast(
    side: TradeSide,
    price: f64,
    zones: &Zones,
    levels: RiskLevels,
    forecast: ForecastBounds,
) -> RiskLevels {
    let refined = match side {
        TradeSide::Buy => RiskLevels {
            stop_loss: levels
                .stop_loss
                .min(forecast.stop_loss)
                .min(zones.support.low)
                .min(price * (1.0 - MEDIUM_BUFFER)),
            take_profit: levels
                .take_profit
                .max(forecast.take_profit)
                .max(zones.resistance.high)
                .max(price * (1.0 + MEDIUM_BUFFER)),
        },
        TradeSide::Sell => RiskLevels {
            stop_loss: levels
                .stop_loss
                .max(forecast.stop_loss)
                .max(zones.resistance.high)
                .max(price * (1.0 + MEDIUM_BUFFER)),
            take_profit: levels
                .take_profit
                .min(forecast.take_profit)
                .min(zones.support.low)
                .min(price * (1.0 - MEDIUM_BUFFER)),
        },
    };
    debug!(%side, sl = refined.stop_loss, tp = refined.take_profit, "Levels refined with forecast");
    refined
}

/// Push the target out until reward/risk reaches `min_ratio`.
///
/// Levels already at or above the ratio, and degenerate zero-risk levels, are
/// returned unchanged.
pub fn normalize_reward_risk(
    side: TradeSide,
    price: f64,
    levels: RiskLevels,
    min_ratio: f64,
) -> RiskLevels {
    let risk = levels.risk(price);
    let reward = levels.reward(price);
    if risk <= 0.0 || reward / risk >= min_ratio {
        return levels;
    }

    let take_profit = match side {
        TradeSide::Buy => price + risk * min_ratio,
        TradeSide::Sell => price - risk * min_ratio,
    };
    debug!(%side, risk, old_tp = levels.take_profit, new_tp = take_profit, "Take-profit extended to minimum reward/risk");
    RiskLevels {
        stop_loss: levels.stop_loss,
        take_profit,
    }
}
