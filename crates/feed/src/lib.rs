//! Market data: CoinGecko client, OHLC synthesis and pair → coin id mapping.

pub mod candles;
pub mod client;
pub mod symbols;

pub use candles::synthesize_candles;
pub use client::CoinGeckoClient;
pub use symbols::resolve_coin_id;
