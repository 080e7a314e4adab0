//! Indicator pipeline, feature vote and decision ladder for one trading pair.

pub mod breakout;
pub mod config;
pub mod engine;
pub mod features;
pub mod forecast;
pub mod indicators;
pub mod report;
pub mod zones;

pub use breakout::{BreakoutScenario, BreakoutScenarios};
pub use config::EngineConfig;
pub use engine::{decide, Rule, SignalEngine, DECISION_LADDER};
pub use features::{Bias, Features};
pub use forecast::Forecast;
pub use indicators::{IndicatorSnapshot, Reading};
pub use report::{ConfidenceLevel, FailureReport, SignalReport};
