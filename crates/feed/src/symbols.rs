/// Base asset (lowercase) → CoinGecko coin id.
const BASE_ASSET_IDS: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("ada", "cardano"),
    ("dot", "polkadot"),
    ("link", "chainlink"),
    ("bnb", "binancecoin"),
    ("sol", "solana"),
    ("matic", "polygon"),
    ("avax", "avalanche-2"),
    ("ltc", "litecoin"),
    ("xrp", "ripple"),
    ("atom", "cosmos"),
    ("algo", "algorand"),
    ("vet", "vechain"),
    ("fil", "filecoin"),
    ("pepe", "pepe"),
    ("shib", "shiba-inu"),
    ("doge", "dogecoin"),
    ("floki", "floki"),
    ("bonk", "bonk"),
    ("wif", "dogwifcoin"),
];

const QUOTE: &str = "USDT";

/// Map a trading pair such as `btcusdt` to the CoinGecko coin id.
///
/// Known bases map through the table; an unknown `XYZUSDT` becomes `xyz`.
/// Anything without the USDT quote is passed through lowercased.
pub fn resolve_coin_id(pair: &str) -> String {
    let pair = pair.trim().to_uppercase();
    match pair.strip_suffix(QUOTE) {
        Some(base) if !base.is_empty() => {
            let base = base.to_lowercase();
            match BASE_ASSET_IDS.iter().find(|(b, _)| *b == base.as_str()) {
                Some((_, id)) => id.to_string(),
                None => base,
            }
        }
        _ => pair.to_lowercase(),
    }
}
