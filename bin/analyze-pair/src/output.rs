use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{SignalKind, SpotPrice};
use strategy::SignalReport;

pub const DATA_SOURCE: &str = "CoinGecko API + Advanced Strategy";

/// Success document printed on stdout.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub pair: String,
    pub timeframe: String,
    pub timestamp: DateTime<Utc>,
    pub signal: SignalKind,
    pub confidence: u32,
    pub reason: String,
    pub last_price: f64,
    pub price_change_24h: Option<f64>,
    pub data_source: &'static str,
    pub coin_id: String,
    pub report: SignalReport,
}

impl Analysis {
    /// Without a spot quote, the last close stands in and the 24h change is null.
    pub fn new(
        timeframe: &str,
        coin_id: &str,
        points: usize,
        spot: Option<SpotPrice>,
        report: SignalReport,
    ) -> Self {
        let (last_price, change) = match spot {
            Some(s) => (s.price, s.change_24h),
            None => (report.current_price, None),
        };
        Self {
            pair: report.pair.clone(),
            timeframe: timeframe.to_string(),
            timestamp: Utc::now(),
            signal: report.signal,
            confidence: report.confidence.clamp(0.0, 100.0) as u32,
            reason: format!("Advanced strategy analysis with {points} data points"),
            last_price,
            price_change_24h: change.filter(|c| c.is_finite()).map(round2),
            data_source: DATA_SOURCE,
            coin_id: coin_id.to_string(),
            report,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use common::{Candle, CandleSeries};
    use strategy::SignalEngine;

    fn report() -> SignalReport {
        let base = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let candles = (0..60)
            .map(|i| {
                let close = 50.0 * 1.004f64.powi(i);
                Candle {
                    timestamp: base + Duration::minutes(5 * i as i64),
                    open: close,
                    high: close * 1.001,
                    low: close * 0.999,
                    close,
                    volume: 1_000_000.0,
                }
            })
            .collect();
        let series = CandleSeries::new("SOLUSDT", candles).unwrap();
        SignalEngine::default().evaluate(&series).unwrap()
    }

    #[test]
    fn spot_quote_wins_over_last_close() {
        let spot = SpotPrice {
            price: 61.5,
            change_24h: Some(3.14159),
        };
        let a = Analysis::new("1h", "solana", 60, Some(spot), report());
        assert_eq!(a.last_price, 61.5);
        assert_eq!(a.price_change_24h, Some(3.14));
        assert_eq!(a.pair, "SOLUSDT");
        assert_eq!(a.reason, "Advanced strategy analysis with 60 data points");
    }

    #[test]
    fn missing_spot_falls_back_to_last_close() {
        let r = report();
        let close = r.current_price;
        let a = Analysis::new("15m", "solana", 60, None, r);
        assert_eq!(a.last_price, close);
        assert_eq!(a.price_change_24h, None);

        let json = serde_json::to_value(&a).unwrap();
        assert!(json["price_change_24h"].is_null());
        assert_eq!(json["data_source"], DATA_SOURCE);
        assert!(json["confidence"].is_u64());
        assert_eq!(json["signal"], json["report"]["signal"]);
    }
}
