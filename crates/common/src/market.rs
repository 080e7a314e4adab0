use async_trait::async_trait;

use crate::{PricePoint, Result, SpotPrice};

/// Abstraction over the market-data source.
///
/// `CoinGeckoClient` in `crates/feed` implements this for live data. The
/// signal engine never talks to a provider; the caller fetches and builds a
/// `CandleSeries` first.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Chronological `(timestamp, price)` history covering the last `days` days.
    async fn price_history(&self, coin_id: &str, days: u32) -> Result<Vec<PricePoint>>;

    /// Latest spot price and 24h change for a coin.
    async fn spot_price(&self, coin_id: &str) -> Result<SpotPrice>;
}
