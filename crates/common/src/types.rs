use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One OHLCV record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Ordered candle window for a single trading pair.
///
/// Timestamps are strictly increasing. The pair label is carried for
/// reporting only and never influences evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSeries {
    pair: String,
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(pair: impl Into<String>, candles: Vec<Candle>) -> Result<Self> {
        if let Some(pos) = candles
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(Error::InvalidSeries(format!(
                "timestamps not strictly increasing at index {}",
                pos + 1
            )));
        }
        Ok(Self {
            pair: pair.into(),
            candles,
        })
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Close of the final candle, the engine's notion of "current price".
    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    /// Independent copy whose final candle closes at `price`, with the high and
    /// low stretched to include it. Used for what-if re-evaluation.
    pub fn with_final_close(&self, price: f64) -> Self {
        let mut copy = self.clone();
        if let Some(last) = copy.candles.last_mut() {
            last.close = price;
            last.high = last.high.max(price);
            last.low = last.low.min(price);
        }
        copy
    }
}

/// Direction of a trade call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Final verdict of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "NO SIGNAL")]
    NoSignal,
}

impl SignalKind {
    pub fn side(&self) -> Option<TradeSide> {
        match self {
            SignalKind::Buy => Some(TradeSide::Buy),
            SignalKind::Sell => Some(TradeSide::Sell),
            SignalKind::NoSignal => None,
        }
    }
}

impl From<TradeSide> for SignalKind {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => SignalKind::Buy,
            TradeSide::Sell => SignalKind::Sell,
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::NoSignal => write!(f, "NO SIGNAL"),
        }
    }
}

/// A price band. `low <= high` is not guaranteed relative to the current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub low: f64,
    pub high: f64,
}

impl Zone {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Support and resistance bands derived from recent extrema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zones {
    pub support: Zone,
    pub resistance: Zone,
}

/// Stop-loss / take-profit pair attached to a directional call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl RiskLevels {
    /// Distance from `price` to the stop.
    pub fn risk(&self, price: f64) -> f64 {
        (price - self.stop_loss).abs()
    }

    /// Distance from `price` to the target.
    pub fn reward(&self, price: f64) -> f64 {
        (self.take_profit - price).abs()
    }
}

/// One raw sample from a price-only market-data feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Latest price with optional 24h percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotPrice {
    pub price: f64,
    pub change_24h: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(minute: i64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn series_rejects_out_of_order_timestamps() {
        let err = CandleSeries::new("BTCUSDT", vec![candle(0, 1.0), candle(2, 2.0), candle(1, 3.0)])
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_series");
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn series_rejects_duplicate_timestamps() {
        assert!(CandleSeries::new("X", vec![candle(0, 1.0), candle(0, 2.0)]).is_err());
    }

    #[test]
    fn with_final_close_leaves_original_untouched() {
        let series =
            CandleSeries::new("ETHUSDT", vec![candle(0, 100.0), candle(1, 101.0)]).unwrap();
        let pushed = series.with_final_close(150.0);

        assert_eq!(series.last_close(), Some(101.0));
        let last = pushed.last().unwrap();
        assert_eq!(last.close, 150.0);
        assert_eq!(last.high, 150.0);
        assert_eq!(last.low, 100.0);
        assert_eq!(pushed.candles()[0], series.candles()[0]);
    }

    #[test]
    fn with_final_close_stretches_low_on_breakdown() {
        let series = CandleSeries::new("ETHUSDT", vec![candle(0, 100.0)]).unwrap();
        let last = *series.with_final_close(50.0).last().unwrap();
        assert_eq!(last.low, 50.0);
        assert_eq!(last.high, 101.0);
    }

    #[test]
    fn signal_kind_serializes_with_space() {
        assert_eq!(serde_json::to_string(&SignalKind::NoSignal).unwrap(), "\"NO SIGNAL\"");
        assert_eq!(serde_json::to_string(&SignalKind::Buy).unwrap(), "\"BUY\"");
        assert_eq!(SignalKind::from(TradeSide::Sell), SignalKind::Sell);
        assert_eq!(SignalKind::NoSignal.side(), None);
    }

    #[test]
    fn risk_levels_measure_distances() {
        let levels = RiskLevels { stop_loss: 98.0, take_profit: 103.0 };
        assert_eq!(levels.risk(100.0), 2.0);
        assert_eq!(levels.reward(100.0), 3.0);
    }
}
