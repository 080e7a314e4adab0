//! Structured snapshot of one evaluation, ready for JSON output.

use std::collections::BTreeMap;

use serde::Serialize;

use common::{Error, SignalKind, Zone};
use risk::Strength;

use crate::breakout::BreakoutScenarios;
use crate::features::{Bias, Features};
use crate::indicators::{IndicatorSnapshot, Reading};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(confidence: f64) -> Self {
        if confidence >= 70.0 {
            ConfidenceLevel::High
        } else if confidence >= 50.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "High"),
            ConfidenceLevel::Medium => write!(f, "Medium"),
            ConfidenceLevel::Low => write!(f, "Low"),
        }
    }
}

/// Everything one evaluation decided, plus the evidence behind it.
///
/// Field and map ordering is fixed, so identical inputs serialize to
/// identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalReport {
    pub pair: String,
    pub signal: SignalKind,
    /// Name of the ladder rule that fired, if any.
    pub rule: Option<&'static str>,
    pub strength: Option<Strength>,
    pub current_price: f64,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub bullish_points: usize,
    pub bearish_points: usize,
    pub features: Features,
    pub indicators: IndicatorSnapshot,
    pub indicator_trends: BTreeMap<String, String>,
    pub support_zone: Zone,
    pub resistance_zone: Zone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakout: Option<BreakoutScenarios>,
    /// Number of candles evaluated.
    pub candles: usize,
}

/// Payload for an invocation that produced no analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    pub error: String,
    pub kind: &'static str,
    pub pair: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    pub message: String,
    pub signal: SignalKind,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
}

impl FailureReport {
    pub fn new(headline: impl Into<String>, pair: impl Into<String>, err: &Error) -> Self {
        Self {
            error: headline.into(),
            kind: err.kind(),
            pair: pair.into(),
            timeframe: None,
            message: err.to_string(),
            signal: SignalKind::NoSignal,
            take_profit: None,
            stop_loss: None,
        }
    }

    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }
}

/// Human-readable per-indicator labels.
pub fn indicator_trends(
    snap: &IndicatorSnapshot,
    features: &Features,
    confidence: f64,
) -> BTreeMap<String, String> {
    let price = snap.current_price;
    let mut trends = BTreeMap::new();

    trends.insert(
        "rsi".to_string(),
        format!("{} → {}", format_reading(snap.rsi), trend_word(features.rsi)),
    );
    trends.insert(
        "stochastic".to_string(),
        format!(
            "%K {}, %D {} → {}",
            format_reading(snap.stoch_k),
            format_reading(snap.stoch_d),
            trend_word(features.stochastic)
        ),
    );

    let ema = match features.ema {
        Bias::Bullish => "EMA fast higher (Bullish)",
        Bias::Bearish => "EMA slow higher (Bearish)",
        Bias::Neutral => "EMAs neutral",
    };
    trends.insert(
        "ema".to_string(),
        format!(
            "{ema}{}",
            fallback_suffix(snap.ema_fast.is_substituted() || snap.ema_slow.is_substituted())
        ),
    );

    let upper = snap.keltner_upper.value();
    let lower = snap.keltner_lower.value();
    let position = if price > upper {
        "Above Upper"
    } else if price < lower {
        "Below Lower"
    } else {
        "Within"
    };
    trends.insert(
        "keltner".to_string(),
        format!(
            "{position} range: Upper {}, Lower {}{}",
            format_price(upper),
            format_price(lower),
            fallback_suffix(snap.keltner_upper.is_substituted() || snap.keltner_lower.is_substituted())
        ),
    );

    let momentum_word = match features.momentum {
        Bias::Bullish => "Bullish",
        Bias::Bearish => "Bearish",
        Bias::Neutral => "Neutral",
    };
    trends.insert(
        "momentum".to_string(),
        format!(
            "20-Period: {:+.2}% ({momentum_word}){}",
            snap.momentum_pct.value(),
            fallback_suffix(snap.momentum_pct.is_substituted())
        ),
    );

    trends.insert(
        "confidence".to_string(),
        format!("{confidence:.1}% ({})", ConfidenceLevel::from_score(confidence)),
    );
    trends
}

fn trend_word(bias: Bias) -> &'static str {
    match bias {
        Bias::Bullish => "Bullish Trend",
        Bias::Bearish => "Bearish Trend",
        Bias::Neutral => "Neutral Trend",
    }
}

fn fallback_suffix(substituted: bool) -> &'static str {
    if substituted {
        " (fallback)"
    } else {
        ""
    }
}

fn format_reading(reading: Reading) -> String {
    format!("{}{}", format_number(reading.value()), fallback_suffix(reading.is_substituted()))
}

/// Two decimals, `N/A` for non-finite values.
pub fn format_number(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "N/A".to_string()
    }
}

/// Dollar price: 4 decimals under 100, 2 otherwise, `N/A` for zero or non-finite.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() || price == 0.0 {
        "N/A".to_string()
    } else if price < 100.0 {
        format!("${price:.4}")
    } else {
        format!("${price:.2}")
    }
}
