pub mod ema;
pub mod keltner;
pub mod rsi;
pub mod snapshot;
pub mod stochastic;

pub use ema::{adaptive_ema_windows, ema_series};
pub use keltner::{KeltnerBands, KeltnerChannel};
pub use rsi::RsiIndicator;
pub use snapshot::IndicatorSnapshot;
pub use stochastic::StochasticIndicator;

use serde::Serialize;

/// An indicator value that is always defined.
///
/// `Substituted` marks a value that replaced a NaN, infinite or zero result,
/// so callers can tell a clean computation from a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum Reading {
    Computed(f64),
    Substituted(f64),
}

impl Reading {
    /// Keep `raw` when it is finite, otherwise use `fallback`.
    pub fn finite_or(raw: f64, fallback: f64) -> Self {
        if raw.is_finite() {
            Reading::Computed(raw)
        } else {
            Reading::Substituted(fallback)
        }
    }

    /// Keep `raw` when it is finite and non-zero, otherwise use `fallback`.
    pub fn nonzero_or(raw: f64, fallback: f64) -> Self {
        if raw.is_finite() && raw != 0.0 {
            Reading::Computed(raw)
        } else {
            Reading::Substituted(fallback)
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Reading::Computed(v) | Reading::Substituted(v) => *v,
        }
    }

    pub fn is_substituted(&self) -> bool {
        matches!(self, Reading::Substituted(_))
    }

    /// The value only if it was computed. Thresholds test this, so a
    /// fallback never satisfies a comparison.
    pub fn computed(&self) -> Option<f64> {
        match self {
            Reading::Computed(v) => Some(*v),
            Reading::Substituted(_) => None,
        }
    }
}

/// Last element of an indicator series, or NaN when the series is empty.
pub(crate) fn latest(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(f64::NAN)
}

/// Second-to-last element if it is a finite number.
pub(crate) fn previous(series: &[f64]) -> Option<f64> {
    series
        .len()
        .checked_sub(2)
        .map(|i| series[i])
        .filter(|v| v.is_finite())
}
