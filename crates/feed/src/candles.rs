use common::{Candle, CandleSeries, Error, PricePoint, Result};

/// Fraction of a candle's body added above and below it as wick.
const WICK_FACTOR: f64 = 0.1;
/// Placeholder volume; the price feed carries none.
const SYNTHETIC_VOLUME: f64 = 1_000_000.0;

/// Build OHLC candles from a close-only price history.
///
/// Each candle opens at the previous close and gets a wick of a tenth of its
/// body on both sides. Points whose timestamp does not advance are dropped.
pub fn synthesize_candles(pair: &str, points: &[PricePoint]) -> Result<CandleSeries> {
    let mut candles: Vec<Candle> = Vec::with_capacity(points.len());

    for point in points {
        let candle = match candles.last() {
            None => Candle {
                timestamp: point.timestamp,
                open: point.price,
                high: point.price,
                low: point.price,
                close: point.price,
                volume: SYNTHETIC_VOLUME,
            },
            Some(prev) if point.timestamp <= prev.timestamp => continue,
            Some(prev) => {
                let open = prev.close;
                let close = point.price;
                let wick = (close - open).abs() * WICK_FACTOR;
                Candle {
                    timestamp: point.timestamp,
                    open,
                    high: open.max(close) + wick,
                    low: open.min(close) - wick,
                    close,
                    volume: SYNTHETIC_VOLUME,
                }
            }
        };
        candles.push(candle);
    }

    if candles.is_empty() {
        return Err(Error::Upstream(format!("no price history for {pair}")));
    }
    CandleSeries::new(pair, candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn points(prices: &[(i64, f64)]) -> Vec<PricePoint> {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        prices
            .iter()
            .map(|&(min, price)| PricePoint {
                timestamp: base + Duration::minutes(min),
                price,
            })
            .collect()
    }

    #[test]
    fn first_candle_is_flat() {
        let series = synthesize_candles("BTCUSDT", &points(&[(0, 100.0)])).unwrap();
        let c = series.candles()[0];
        assert_eq!((c.open, c.high, c.low, c.close), (100.0, 100.0, 100.0, 100.0));
        assert_eq!(c.volume, 1_000_000.0);
    }

    #[test]
    fn later_candles_open_at_previous_close_with_wicks() {
        let series = synthesize_candles("BTCUSDT", &points(&[(0, 100.0), (5, 110.0), (10, 105.0)])).unwrap();
        let up = series.candles()[1];
        assert_eq!(up.open, 100.0);
        assert_eq!(up.close, 110.0);
        assert!((up.high - 111.0).abs() < 1e-12);
        assert!((up.low - 99.0).abs() < 1e-12);

        let down = series.candles()[2];
        assert_eq!(down.open, 110.0);
        assert!((down.high - 110.5).abs() < 1e-12);
        assert!((down.low - 104.5).abs() < 1e-12);
    }

    #[test]
    fn non_advancing_timestamps_are_dropped() {
        let series = synthesize_candles(
            "ETHUSDT",
            &points(&[(0, 1.0), (5, 2.0), (5, 3.0), (3, 4.0), (10, 5.0)]),
        )
        .unwrap();
        let closes = series.closes();
        assert_eq!(closes, vec![1.0, 2.0, 5.0]);
        assert_eq!(series.candles()[2].open, 2.0);
    }

    #[test]
    fn empty_history_is_an_upstream_error() {
        let err = synthesize_candles("ETHUSDT", &[]).unwrap_err();
        assert_eq!(err.kind(), "upstream");
    }
}
