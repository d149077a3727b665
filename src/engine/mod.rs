//! The pricing engine: per-driver extraction, cohort normalisation, score
//! composition, band solving and elastic repricing.

pub mod band;
pub mod championship;
pub mod dna;
pub mod live_form;
pub mod normalize;
pub mod pipeline;
pub mod pricing;
pub mod score;
pub mod season;
pub mod team;

pub use band::{Budget, PriceBand};
pub use pipeline::{snapshot_of, PricingEngine, ScoredDriver};
pub use pricing::PriceSnapshot;
pub use team::TeamIndex;
