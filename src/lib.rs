pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod report;

pub use engine::{Budget, PriceSnapshot, PricingEngine, ScoredDriver, TeamIndex};
pub use error::EngineError;
