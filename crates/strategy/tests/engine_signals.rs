use chrono::{Duration, TimeZone, Utc};
use common::{Candle, CandleSeries, Error, SignalKind};
use strategy::{Bias, EngineConfig, FailureReport, Reading, SignalEngine};

/// Each close moves by `step` (fractional) from the previous one.
fn trending(n: usize, step: f64) -> CandleSeries {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut prev = 100.0;
    let candles = (0..n)
        .map(|i| {
            let close = if i == 0 { prev } else { prev * (1.0 + step) };
            let candle = Candle {
                timestamp: base + Duration::minutes(15 * i as i64),
                open: prev,
                high: prev.max(close) * 1.001,
                low: prev.min(close) * 0.999,
                close,
                volume: 1_000_000.0,
            };
            prev = close;
            candle
        })
        .collect();
    CandleSeries::new("TESTUSDT", candles).unwrap()
}

fn assert_min_reward_risk(price: f64, tp: f64, sl: f64) {
    let risk = (price - sl).abs();
    let reward = (tp - price).abs();
    assert!(risk > 0.0);
    assert!(reward / risk >= 1.5 - 1e-9, "reward/risk {} below 1.5", reward / risk);
}

#[test]
fn steady_uptrend_is_a_strong_buy() {
    let report = SignalEngine::default().evaluate(&trending(60, 0.005)).unwrap();

    assert_eq!(report.signal, SignalKind::Buy);
    assert_eq!(report.rule, Some("strong_bullish"));
    assert!(report.confidence >= 70.0);
    assert_eq!(report.features.ema, Bias::Bullish);
    assert_eq!(report.features.momentum, Bias::Bullish);
    assert_eq!(report.features.price_vs_basis, Bias::Bullish);
    assert!(report.breakout.is_none());

    let (tp, sl) = (report.take_profit.unwrap(), report.stop_loss.unwrap());
    assert!(sl < report.current_price && report.current_price < tp);
    assert!(sl <= report.support_zone.low);
    assert_min_reward_risk(report.current_price, tp, sl);
}

#[test]
fn steady_downtrend_is_a_strong_sell() {
    let report = SignalEngine::default().evaluate(&trending(60, -0.005)).unwrap();

    assert_eq!(report.signal, SignalKind::Sell);
    assert_eq!(report.rule, Some("strong_bearish"));
    assert!(report.confidence >= 70.0);

    let (tp, sl) = (report.take_profit.unwrap(), report.stop_loss.unwrap());
    assert!(tp < report.current_price && report.current_price < sl);
    assert!(sl >= report.resistance_zone.high);
    assert_min_reward_risk(report.current_price, tp, sl);
}

#[test]
fn flat_market_is_no_signal_with_breakouts() {
    let report = SignalEngine::default().evaluate(&trending(60, 0.0)).unwrap();

    assert_eq!(report.signal, SignalKind::NoSignal);
    assert_eq!(report.rule, None);
    assert!(report.take_profit.is_none() && report.stop_loss.is_none());
    assert_eq!(report.indicators.momentum_pct.value(), 0.0);
    assert!((report.indicators.rsi.value() - 50.0).abs() <= 5.0);
    assert_eq!(report.bullish_points, 0);
    assert_eq!(report.bearish_points, 0);

    let breakout = report.breakout.expect("NO SIGNAL carries breakout scenarios");
    assert!(breakout.bullish.trigger_price > report.current_price);
    assert!(breakout.bearish.trigger_price < report.current_price);
}

#[test]
fn short_series_is_rejected_for_every_length() {
    let engine = SignalEngine::default();
    for n in 0..50 {
        let err = engine.evaluate(&trending(n, 0.005)).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { got, need: 50 } if got == n));

        let failure = FailureReport::new("Strategy analysis failed", "TESTUSDT", &err);
        assert_eq!(failure.signal, SignalKind::NoSignal);
        assert!(failure.take_profit.is_none() && failure.stop_loss.is_none());
    }
}

#[test]
fn candle_limit_is_configurable() {
    let cfg = EngineConfig {
        candle_limit: 30,
        ..EngineConfig::default()
    };
    let report = SignalEngine::new(cfg).evaluate(&trending(30, 0.005)).unwrap();
    assert_eq!(report.candles, 30);
    assert_eq!(report.indicators.ema_fast_period, 10);
    assert_eq!(report.indicators.ema_slow_period, 20);
}

#[test]
fn nan_close_falls_back_to_current_price_for_emas() {
    let mut candles = trending(60, 0.002).candles().to_vec();
    candles[30].close = f64::NAN;
    let series = CandleSeries::new("TESTUSDT", candles).unwrap();

    let report = SignalEngine::default().evaluate(&series).unwrap();
    let price = report.current_price;
    assert!(report.indicators.ema_fast.is_substituted());
    assert!(report.indicators.ema_slow.is_substituted());
    assert_eq!(report.indicators.ema_fast.value(), price);
    assert_eq!(report.features.ema, Bias::Neutral);
    assert!(report.indicator_trends["ema"].ends_with("(fallback)"));
}

#[test]
fn identical_input_serializes_identically() {
    let series = trending(80, 0.001);
    let engine = SignalEngine::default();
    let a = serde_json::to_string(&engine.evaluate(&series).unwrap()).unwrap();
    let b = serde_json::to_string(&engine.evaluate(&series).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn evaluation_leaves_the_series_untouched() {
    let series = trending(60, 0.0);
    let before = series.clone();
    let _ = SignalEngine::default().evaluate(&series).unwrap();
    assert_eq!(series, before);
}

#[test]
fn zero_prices_trip_the_indicator_guard() {
    let candles = trending(60, 0.0)
        .candles()
        .iter()
        .map(|c| Candle {
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            ..*c
        })
        .collect();
    let series = CandleSeries::new("ZEROUSDT", candles).unwrap();
    let err = SignalEngine::default().evaluate(&series).unwrap_err();
    assert_eq!(err.kind(), "invalid_indicator");
}

#[test]
fn nan_last_close_is_rejected() {
    let mut candles = trending(60, 0.001).candles().to_vec();
    candles[59].close = f64::NAN;
    let series = CandleSeries::new("TESTUSDT", candles).unwrap();
    let err = SignalEngine::default().evaluate(&series).unwrap_err();
    assert!(matches!(err, Error::InvalidIndicator(_)));
}

#[test]
fn flat_range_tail_cannot_pass_medium_gates() {
    // 40 zig-zag candles, then 20 candles with high = low = close
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let candles = (0..60)
        .map(|i| {
            let (high, low, close) = if i < 40 {
                let c = if i % 2 == 0 { 100.0 } else { 102.0 };
                (c + 0.5, c - 0.5, c)
            } else {
                (103.0, 103.0, 103.0)
            };
            Candle {
                timestamp: base + Duration::minutes(15 * i as i64),
                open: close,
                high,
                low,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect();
    let series = CandleSeries::new("TESTUSDT", candles).unwrap();

    let report = SignalEngine::default().evaluate(&series).unwrap();
    assert_eq!(report.signal, SignalKind::NoSignal);
    assert_eq!(report.rule, None);
    assert_eq!(report.indicators.stoch_k, Reading::Substituted(103.0));
    assert_eq!(report.features.stochastic, Bias::Neutral);
    assert!(report.take_profit.is_none() && report.stop_loss.is_none());
    assert!(report.breakout.is_some());
}
