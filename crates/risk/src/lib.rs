pub mod levels;

pub use levels::{
    normalize_reward_risk, refine_with_forecast, zone_levels, ForecastBounds, Strength,
    MIN_REWARD_RISK,
};
