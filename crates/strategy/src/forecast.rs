//! Short-horizon linear price projection.

use serde::Serialize;

use common::{CandleSeries, TradeSide};
use risk::ForecastBounds;

use crate::zones::quantile;

/// Closes used to estimate the trend.
pub const TREND_WINDOW: usize = 10;
/// Half-width of the interval around each projected point (5%).
const BAND: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub yhat: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub trend: f64,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Project `horizon` steps from the last `TREND_WINDOW` closes.
    ///
    /// Returns `None` with too little history or a zero horizon; callers treat
    /// that as "no refinement available".
    pub fn project(series: &CandleSeries, horizon: usize) -> Option<Self> {
        if series.len() < TREND_WINDOW || horizon == 0 {
            return None;
        }
        let closes = series.closes();
        let recent = &closes[closes.len() - TREND_WINDOW..];
        let last = recent[TREND_WINDOW - 1];
        let trend = (last - recent[0]) / TREND_WINDOW as f64;
        if !trend.is_finite() {
            return None;
        }

        let points = (1..=horizon)
            .map(|step| {
                let yhat = last + trend * step as f64;
                ForecastPoint {
                    yhat,
                    lower: yhat * (1.0 - BAND),
                    upper: yhat * (1.0 + BAND),
                }
            })
            .collect();
        Some(Self { trend, points })
    }

    /// Linear-interpolated quantile of the projected path.
    pub fn yhat_quantile(&self, q: f64) -> f64 {
        let mut values: Vec<f64> = self.points.iter().map(|p| p.yhat).collect();
        values.sort_by(f64::total_cmp);
        quantile(&values, q)
    }

    pub fn min_lower(&self) -> f64 {
        self.points.iter().map(|p| p.lower).fold(f64::INFINITY, f64::min)
    }

    pub fn max_upper(&self) -> f64 {
        self.points.iter().map(|p| p.upper).fold(f64::NEG_INFINITY, f64::max)
    }

    /// Candidate stop and target for `side`.
    pub fn bounds(&self, side: TradeSide) -> ForecastBounds {
        match side {
            TradeSide::Buy => ForecastBounds {
                take_profit: self.yhat_quantile(0.75),
                stop_loss: self.min_lower(),
            },
            TradeSide::Sell => ForecastBounds {
                take_profit: self.yhat_quantile(0.25),
                stop_loss: self.max_upper(),
            },
        }
    }
}
