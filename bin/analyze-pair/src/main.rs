use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, Error, MarketDataProvider};
use feed::{resolve_coin_id, synthesize_candles, CoinGeckoClient};
use strategy::{EngineConfig, FailureReport, SignalEngine};

mod output;

use output::Analysis;

#[derive(Parser)]
#[command(
    name = "analyze-pair",
    version,
    about = "Score a trading pair and print the signal as JSON"
)]
struct Cli {
    /// Trading pair, e.g. BTCUSDT or pepeusdt.
    pair: String,

    /// Label echoed in the output; the price feed is not resampled.
    #[arg(default_value = "15m")]
    timeframe: String,
}

/// A parsed invocation: normalized pair plus the echoed timeframe.
struct Request {
    pair: String,
    timeframe: String,
}

impl From<Cli> for Request {
    fn from(cli: Cli) -> Self {
        Self {
            pair: cli.pair.trim().to_uppercase(),
            timeframe: cli.timeframe,
        }
    }
}

impl Request {
    fn fail(&self, headline: impl Into<String>, err: &Error) -> FailureReport {
        FailureReport::new(headline, &self.pair, err).with_timeframe(&self.timeframe)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // ── Logging ──────────────────────────────────────────────────────────────
    // stdout carries only the JSON document.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let outcome = match Cli::try_parse() {
        Ok(cli) => run(&Request::from(cli)).await,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => Err(usage_failure(&e)),
    };

    let written = render(outcome)
        .map_err(anyhow::Error::from)
        .and_then(|(doc, code)| emit(&doc).map(|()| code));
    match written {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("failed to write output: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load process config and run against the live CoinGecko feed.
async fn run(req: &Request) -> Result<Analysis, FailureReport> {
    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().map_err(|e| req.fail("Configuration error", &e))?;
    let engine_cfg = match &cfg.strategy_config_path {
        Some(path) => EngineConfig::load(path).map_err(|e| req.fail("Configuration error", &e))?,
        None => EngineConfig::default(),
    };
    let client = CoinGeckoClient::new(&cfg).map_err(|e| req.fail("Configuration error", &e))?;

    analyze_with(&client, cfg.history_days, engine_cfg, req).await
}

async fn analyze_with(
    provider: &dyn MarketDataProvider,
    history_days: u32,
    engine_cfg: EngineConfig,
    req: &Request,
) -> Result<Analysis, FailureReport> {
    let pair = req.pair.as_str();
    let coin_id = resolve_coin_id(pair);
    info!(pair, coin_id = %coin_id, timeframe = %req.timeframe, "Analyzing pair");

    // ── Market data ───────────────────────────────────────────────────────────
    let unavailable = |e: Error| {
        let mut report = req.fail(format!("Unable to fetch data for {pair}"), &e);
        report.message = format!("{} (tried coin id '{coin_id}')", report.message);
        report
    };
    let history = provider
        .price_history(&coin_id, history_days)
        .await
        .map_err(unavailable)?;
    let series = synthesize_candles(pair, &history).map_err(unavailable)?;

    // ── Strategy ──────────────────────────────────────────────────────────────
    let report = SignalEngine::new(engine_cfg)
        .evaluate(&series)
        .map_err(|e| req.fail("Strategy analysis failed", &e))?;

    let spot = match provider.spot_price(&coin_id).await {
        Ok(spot) => Some(spot),
        Err(e) => {
            warn!(coin_id = %coin_id, error = %e, "Spot price unavailable, using last close");
            None
        }
    };

    Ok(Analysis::new(&req.timeframe, &coin_id, series.len(), spot, report))
}

/// Failure document for arguments clap rejected.
fn usage_failure(err: &clap::Error) -> FailureReport {
    let headline = match err.kind() {
        ErrorKind::MissingRequiredArgument => "Trading pair is required",
        _ => "Invalid arguments",
    };
    // First paragraph of clap's message, without the usage block
    let rendered = err.to_string();
    let detail = rendered
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with("Usage:"))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let detail = detail.strip_prefix("error: ").unwrap_or(&detail).to_string();
    FailureReport::new(headline, "", &Error::Usage(detail))
}

/// JSON document and process exit code for an outcome.
fn render(outcome: Result<Analysis, FailureReport>) -> serde_json::Result<(serde_json::Value, u8)> {
    match outcome {
        Ok(analysis) => Ok((serde_json::to_value(&analysis)?, 0)),
        Err(failure) => {
            warn!(pair = %failure.pair, kind = failure.kind, message = %failure.message, "Analysis failed");
            Ok((serde_json::to_value(&failure)?, 1))
        }
    }
}

fn emit(doc: &impl Serialize) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, doc).context("serializing output")?;
    writeln!(stdout).context("writing output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use common::{PricePoint, SpotPrice};

    struct FakeFeed {
        history: Result<Vec<PricePoint>, &'static str>,
        spot: Option<SpotPrice>,
    }

    #[async_trait]
    impl MarketDataProvider for FakeFeed {
        async fn price_history(&self, _coin_id: &str, _days: u32) -> common::Result<Vec<PricePoint>> {
            self.history.clone().map_err(|m| Error::Http(m.to_string()))
        }

        async fn spot_price(&self, _coin_id: &str) -> common::Result<SpotPrice> {
            self.spot.ok_or_else(|| Error::Upstream("no quote".into()))
        }
    }

    fn rising(n: usize) -> Vec<PricePoint> {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| PricePoint {
                timestamp: base + Duration::minutes(15 * i as i64),
                price: 100.0 * 1.004f64.powi(i as i32),
            })
            .collect()
    }

    fn request(args: &[&str]) -> Request {
        Request::from(Cli::try_parse_from(args.iter().copied()).unwrap())
    }

    async fn analyze(feed: &FakeFeed, req: &Request) -> (serde_json::Value, u8) {
        render(analyze_with(feed, 7, EngineConfig::default(), req).await).unwrap()
    }

    #[test]
    fn missing_pair_is_a_json_error_with_exit_code_one() {
        let err = Cli::try_parse_from(["analyze-pair"]).err().unwrap();
        let (doc, code) = render(Err(usage_failure(&err))).unwrap();
        assert_eq!(code, 1);
        assert_eq!(doc["error"], "Trading pair is required");
        assert_eq!(doc["kind"], "usage");
        assert_eq!(doc["signal"], "NO SIGNAL");
        assert!(doc["take_profit"].is_null() && doc["stop_loss"].is_null());
        assert!(doc["message"].as_str().unwrap().contains("<PAIR>"));
    }

    #[test]
    fn unknown_flag_is_reported_as_invalid_arguments() {
        let err = Cli::try_parse_from(["analyze-pair", "BTCUSDT", "--bogus"]).err().unwrap();
        let (doc, code) = render(Err(usage_failure(&err))).unwrap();
        assert_eq!(code, 1);
        assert_eq!(doc["error"], "Invalid arguments");
        assert_eq!(doc["kind"], "usage");
    }

    #[test]
    fn help_and_version_are_left_to_clap() {
        let help = Cli::try_parse_from(["analyze-pair", "--help"]).err().unwrap();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        let version = Cli::try_parse_from(["analyze-pair", "--version"]).err().unwrap();
        assert_eq!(version.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn pair_is_normalized_and_timeframe_defaults() {
        let req = request(&["analyze-pair", "  solusdt "]);
        assert_eq!(req.pair, "SOLUSDT");
        assert_eq!(req.timeframe, "15m");
        assert_eq!(request(&["analyze-pair", "ethusdt", "4h"]).timeframe, "4h");
    }

    #[tokio::test]
    async fn provider_error_becomes_failure_document() {
        let feed = FakeFeed { history: Err("503 Service Unavailable"), spot: None };
        let (doc, code) = analyze(&feed, &request(&["analyze-pair", "btcusdt"])).await;
        assert_eq!(code, 1);
        assert_eq!(doc["error"], "Unable to fetch data for BTCUSDT");
        assert_eq!(doc["kind"], "http");
        assert_eq!(doc["pair"], "BTCUSDT");
        assert_eq!(doc["timeframe"], "15m");
        assert!(doc["message"].as_str().unwrap().ends_with("(tried coin id 'bitcoin')"));
    }

    #[tokio::test]
    async fn short_history_is_insufficient_data() {
        let feed = FakeFeed { history: Ok(rising(10)), spot: None };
        let (doc, code) = analyze(&feed, &request(&["analyze-pair", "BTCUSDT", "1h"])).await;
        assert_eq!(code, 1);
        assert_eq!(doc["error"], "Strategy analysis failed");
        assert_eq!(doc["kind"], "insufficient_data");
        assert_eq!(doc["timeframe"], "1h");
    }

    #[tokio::test]
    async fn spot_failure_still_produces_analysis() {
        let history = rising(60);
        let last = history[history.len() - 1].price;
        let feed = FakeFeed { history: Ok(history), spot: None };
        let (doc, code) = analyze(&feed, &request(&["analyze-pair", "BTCUSDT"])).await;
        assert_eq!(code, 0);
        assert_eq!(doc["last_price"].as_f64(), Some(last));
        assert!(doc["price_change_24h"].is_null());
        assert_eq!(doc["coin_id"], "bitcoin");
        assert_eq!(doc["timeframe"], "15m");
    }

    #[tokio::test]
    async fn spot_quote_is_reported_when_available() {
        let spot = SpotPrice { price: 131.5, change_24h: Some(2.5) };
        let feed = FakeFeed { history: Ok(rising(60)), spot: Some(spot) };
        let (doc, code) = analyze(&feed, &request(&["analyze-pair", "BTCUSDT"])).await;
        assert_eq!(code, 0);
        assert_eq!(doc["last_price"].as_f64(), Some(131.5));
        assert_eq!(doc["price_change_24h"].as_f64(), Some(2.5));
    }
}
