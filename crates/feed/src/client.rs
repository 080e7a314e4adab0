use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use common::{Config, Error, MarketDataProvider, PricePoint, Result, SpotPrice};

const USER_AGENT: &str = concat!("analyze-pair/", env!("CARGO_PKG_VERSION"));

/// REST client for the public CoinGecko API.
pub struct CoinGeckoClient {
    base_url: String,
    http: Client,
}

impl CoinGeckoClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: cfg.coingecko_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, ?query, "CoinGecko request");

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            warn!(%url, %status, "CoinGecko request failed");
            return Err(Error::Upstream(format!("HTTP {status}: {body}")));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn price_history(&self, coin_id: &str, days: u32) -> Result<Vec<PricePoint>> {
        check_coin_id(coin_id)?;
        let days = days.to_string();
        let chart: MarketChart = self
            .get_json(
                &format!("/coins/{coin_id}/market_chart"),
                &[("vs_currency", "usd"), ("days", &days)],
            )
            .await?;
        let points = chart.into_points()?;
        debug!(coin_id, points = points.len(), "Fetched price history");
        Ok(points)
    }

    async fn spot_price(&self, coin_id: &str) -> Result<SpotPrice> {
        check_coin_id(coin_id)?;
        let prices: HashMap<String, SimplePrice> = self
            .get_json(
                "/simple/price",
                &[
                    ("ids", coin_id),
                    ("vs_currencies", "usd"),
                    ("include_24hr_change", "true"),
                ],
            )
            .await?;
        spot_from(prices, coin_id)
    }
}

/// Coin ids are lowercase slugs; anything else would escape the URL path.
fn check_coin_id(coin_id: &str) -> Result<()> {
    let valid = !coin_id.is_empty()
        && coin_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::Other(format!("invalid coin id '{coin_id}'")))
    }
}

fn spot_from(mut prices: HashMap<String, SimplePrice>, coin_id: &str) -> Result<SpotPrice> {
    let entry = prices
        .remove(coin_id)
        .ok_or_else(|| Error::Upstream(format!("no spot price for '{coin_id}'")))?;
    let price = entry
        .usd
        .ok_or_else(|| Error::Upstream(format!("no USD price for '{coin_id}'")))?;
    Ok(SpotPrice {
        price,
        change_24h: entry.usd_24h_change,
    })
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

impl MarketChart {
    fn into_points(self) -> Result<Vec<PricePoint>> {
        if self.prices.is_empty() {
            return Err(Error::Upstream("market chart has no prices".into()));
        }
        self.prices
            .into_iter()
            .map(|(ts_ms, price)| {
                DateTime::<Utc>::from_timestamp_millis(ts_ms as i64)
                    .map(|timestamp| PricePoint { timestamp, price })
                    .ok_or_else(|| Error::Upstream(format!("bad timestamp {ts_ms}")))
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}
