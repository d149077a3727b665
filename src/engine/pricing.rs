//! Base price, charm rounding and elastic smoothing against the previous
//! published price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Elasticity before any reliability, DNA or volatility loading.
const BASE_ELASTICITY: f64 = 0.45;
const UNRELIABILITY_LOADING: f64 = 0.25;
const DNA_VARIANCE_LOADING: f64 = 0.10;
const VOLATILITY_LOADING: f64 = 0.10;

/// Round up to the next half unit.
pub fn charm(price: f64) -> f64 {
    (price * 2.0).ceil() / 2.0
}

/// Fraction of the gap to the new base closed in one update.
///
/// Unreliable, spiky or volatile drivers move faster.
pub fn elasticity(reliability: f64, dna_variance_z: f64, volatility_z: f64) -> f64 {
    BASE_ELASTICITY
        + UNRELIABILITY_LOADING * (1.0 - reliability)
        + DNA_VARIANCE_LOADING * dna_variance_z.max(0.0)
        + VOLATILITY_LOADING * volatility_z.max(0.0)
}

/// Move `previous` towards `base`. A driver never priced before (0) takes
/// the base outright.
pub fn reprice(previous: f64, base: f64, elasticity: f64) -> f64 {
    if previous == 0.0 {
        return base;
    }
    previous + elasticity * (base - previous)
}

/// Last published price per driver, carried between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub generated_at: DateTime<Utc>,
    pub prices: BTreeMap<String, f64>,
}

impl Default for PriceSnapshot {
    fn default() -> Self {
        PriceSnapshot {
            generated_at: Utc::now(),
            prices: BTreeMap::new(),
        }
    }
}

impl PriceSnapshot {
    pub fn new(prices: impl IntoIterator<Item = (String, f64)>) -> Self {
        PriceSnapshot {
            generated_at: Utc::now(),
            prices: prices.into_iter().collect(),
        }
    }

    /// Previous price of `driver`, 0 when never priced.
    pub fn price_of(&self, driver: &str) -> f64 {
        self.prices.get(driver).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
