use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Engine tuning (TOML). Every field is optional in the file.
///
/// Example `config/engine.toml`:
/// ```toml
/// candle_limit = 50
/// rsi_period = 14
///
/// keltner_period = 20
/// keltner_multiplier = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum candles before any analysis runs.
    pub candle_limit: usize,
    pub rsi_period: usize,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
    /// Requested Keltner window; shortened on short histories.
    pub keltner_period: usize,
    pub keltner_multiplier: f64,
    /// Candles scanned for support/resistance.
    pub zone_lookback: usize,
    /// Candles back for the price-momentum feature.
    pub momentum_lookback: usize,
    /// Steps projected by the forecaster.
    pub forecast_horizon: usize,
    pub min_reward_risk: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candle_limit: 50,
            rsi_period: 14,
            stoch_k_period: 14,
            stoch_d_period: 3,
            keltner_period: 20,
            keltner_multiplier: 2.0,
            zone_lookback: 20,
            momentum_lookback: 20,
            forecast_horizon: 30,
            min_reward_risk: risk::MIN_REWARD_RISK,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("failed to parse engine config at '{path}': {e}")))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.momentum_lookback == 0 || self.momentum_lookback > self.candle_limit {
            return Err(Error::Config(format!(
                "momentum_lookback must be in 1..={}, got {}",
                self.candle_limit, self.momentum_lookback
            )));
        }
        if !(self.min_reward_risk > 0.0 && self.min_reward_risk.is_finite()) {
            return Err(Error::Config(format!(
                "min_reward_risk must be a positive finite ratio, got {}",
                self.min_reward_risk
            )));
        }
        Ok(())
    }
}
