//! The pricing pass: raw extraction per driver, cohort-wide normalisation,
//! score composition, band solving and elastic pricing.
//!
//! Per-driver extraction is independent across drivers; every later stage
//! needs the whole cohort materialised first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::engine::band::{solve_band, Budget, PriceBand};
use crate::engine::championship::championship_shares;
use crate::engine::dna::{AbilityStats, DriverDna};
use crate::engine::live_form::LiveForm;
use crate::engine::normalize::{normalize_families, MetricFamily, WindowRows, ZPolicy};
use crate::engine::pricing::{charm, elasticity, reprice, PriceSnapshot};
use crate::engine::score::{compose, logistic, strength_spread, ZScores};
use crate::engine::season::SeasonRollup;
use crate::engine::team::{TeamContext, TeamIndex};
use crate::error::EngineError;
use crate::models::DriverRecord;

/// Every derived value for one driver in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDriver {
    pub name: String,
    pub team: String,
    pub rollup: SeasonRollup,
    pub live: LiveForm,
    pub team_context: TeamContext,
    pub dna: DriverDna,
    /// Current points over the leader's
    pub championship_share: f64,
    pub z: ZScores,
    pub raw_score: f64,
    /// logistic(raw_score)
    pub strength: f64,
    pub normalized_strength: f64,
    pub scaled_strength: f64,
    /// 0 when never priced
    pub previous_price: f64,
    pub base_price: f64,
    pub elasticity: f64,
    pub price: f64,
    /// Weighted score components plus pricing terms
    pub breakdown: BTreeMap<String, f64>,
}

impl ScoredDriver {
    pub fn new(name: &str, team: &str) -> Self {
        ScoredDriver {
            name: name.to_string(),
            team: team.to_string(),
            rollup: SeasonRollup::default(),
            live: LiveForm::default(),
            team_context: TeamContext::default(),
            dna: DriverDna::default(),
            championship_share: 0.0,
            z: ZScores::default(),
            raw_score: 0.0,
            strength: 0.0,
            normalized_strength: 0.0,
            scaled_strength: 0.0,
            previous_price: 0.0,
            base_price: 0.0,
            elasticity: 0.0,
            price: 0.0,
            breakdown: BTreeMap::new(),
        }
    }
}

impl WindowRows for ScoredDriver {
    fn window_rows(&self) -> usize {
        self.live.rows
    }
}

/// Every cohort-normalised family, with its clamp and damping policy.
const FAMILIES: &[MetricFamily<ScoredDriver>] = &[
    // three-year roll-up
    MetricFamily { name: "points_per_race_3y", policy: ZPolicy::CLAMPED, raw: |d| d.rollup.points_per_race, store: |d, z| d.z.points_per_race = z },
    MetricFamily { name: "win_rate_3y", policy: ZPolicy::CLAMPED, raw: |d| d.rollup.win_rate, store: |d, z| d.z.win_rate = z },
    MetricFamily { name: "podium_rate_3y", policy: ZPolicy::CLAMPED, raw: |d| d.rollup.podium_rate, store: |d, z| d.z.podium_rate = z },
    MetricFamily { name: "point_finish_rate_3y", policy: ZPolicy::CLAMPED, raw: |d| d.rollup.point_finish_rate, store: |d, z| d.z.point_finish_rate = z },
    MetricFamily { name: "dnf_rate_3y", policy: ZPolicy::CLAMPED, raw: |d| d.rollup.dnf_rate, store: |d, z| d.z.dnf_rate = z },
    MetricFamily { name: "team_share_3y", policy: ZPolicy::CLAMPED, raw: |d| d.rollup.team_share, store: |d, z| d.z.team_share = z },
    MetricFamily { name: "teammate_delta_3y", policy: ZPolicy::CLAMPED, raw: |d| d.rollup.teammate_delta, store: |d, z| d.z.teammate_delta = z },
    MetricFamily { name: "championship_pct_3y", policy: ZPolicy::CLAMPED, raw: |d| d.rollup.championship_pct, store: |d, z| d.z.championship_pct = z },
    // live window
    MetricFamily { name: "recent_form", policy: ZPolicy::LIVE, raw: |d| d.live.recent_points, store: |d, z| d.z.recent_points = z },
    MetricFamily { name: "position_gain", policy: ZPolicy::LIVE_UNCLAMPED, raw: |d| d.live.gain, store: |d, z| d.z.gain = z },
    MetricFamily { name: "volatility", policy: ZPolicy::LIVE, raw: |d| d.live.volatility, store: |d, z| d.z.volatility = z },
    MetricFamily { name: "clutch", policy: ZPolicy::LIVE, raw: |d| d.live.clutch, store: |d, z| d.z.clutch = z },
    MetricFamily { name: "fastest_lap", policy: ZPolicy::LIVE, raw: |d| d.live.fastest_lap, store: |d, z| d.z.fastest_lap = z },
    MetricFamily { name: "driver_reliability", policy: ZPolicy::CLAMPED, raw: |d| d.live.reliability, store: |d, z| d.z.driver_reliability = z },
    // team context
    MetricFamily { name: "team_strength", policy: ZPolicy::CLAMPED, raw: |d| d.team_context.strength, store: |d, z| d.z.team_strength = z },
    MetricFamily { name: "team_reliability", policy: ZPolicy::CLAMPED, raw: |d| d.team_context.reliability, store: |d, z| d.z.team_reliability = z },
    MetricFamily { name: "team_momentum", policy: ZPolicy::CLAMPED, raw: |d| d.team_context.momentum, store: |d, z| d.z.momentum = z },
    MetricFamily { name: "team_ceiling", policy: ZPolicy::CLAMPED, raw: |d| d.team_context.ceiling, store: |d, z| d.z.ceiling = z },
    MetricFamily { name: "engine_tier", policy: ZPolicy::UNCLAMPED, raw: |d| d.team_context.engine_tier, store: |d, z| d.z.engine_tier = z },
    MetricFamily { name: "budget_tier", policy: ZPolicy::UNCLAMPED, raw: |d| d.team_context.budget_tier, store: |d, z| d.z.budget_tier = z },
    // DNA spread and standings
    MetricFamily { name: "dna_variance", policy: ZPolicy::UNCLAMPED, raw: |d| d.dna.consistency, store: |d, z| d.z.dna_variance = z },
    MetricFamily { name: "championship_share", policy: ZPolicy::CLAMPED, raw: |d| d.championship_share, store: |d, z| d.z.championship_share = z },
];

/// Runs complete pricing passes against a fixed budget.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    budget: Budget,
}

impl PricingEngine {
    pub fn new(budget: Budget) -> Self {
        PricingEngine { budget }
    }

    /// Score and price the cohort. `previous` supplies last run's prices.
    pub fn run(
        &self,
        drivers: &[DriverRecord],
        teams: &TeamIndex,
        previous: &PriceSnapshot,
    ) -> Result<Vec<ScoredDriver>, EngineError> {
        let mut cohort = self.score_cohort(drivers, teams)?;
        let band = self.price_cohort(&mut cohort, previous)?;
        info!(
            "Priced {} drivers in band [{:.2}, {:.2}] (cap {:.2}, roster {})",
            cohort.len(),
            band.min,
            band.max,
            self.budget.salary_cap,
            self.budget.roster_size
        );
        Ok(cohort)
    }

    /// Extract, normalise and compose Strength for every driver.
    pub fn score_cohort(
        &self,
        drivers: &[DriverRecord],
        teams: &TeamIndex,
    ) -> Result<Vec<ScoredDriver>, EngineError> {
        if drivers.is_empty() {
            return Err(EngineError::EmptyCohort);
        }
        info!(
            "Scoring {} drivers across {} teams",
            drivers.len(),
            teams.grid_size()
        );

        let contexts = TeamContext::for_grid(teams);
        let grid_size = teams.grid_size();
        let records: Vec<&DriverRecord> = drivers.iter().collect();
        let shares = championship_shares(&records);
        let ability_stats = AbilityStats::from_cohort(drivers.iter().map(|d| &d.abilities))?;

        let mut cohort = Vec::with_capacity(drivers.len());
        for (record, share) in drivers.iter().zip(shares) {
            let team_context = *contexts
                .get(&record.team.to_lowercase())
                .ok_or_else(|| EngineError::UnknownTeam {
                    driver: record.name.clone(),
                    team: record.team.clone(),
                })?;
            let mut scored = ScoredDriver::new(&record.name, &record.team);
            scored.rollup = SeasonRollup::for_driver(record, grid_size);
            scored.live = LiveForm::for_driver(record);
            scored.dna = DriverDna::compute(record, team_context.recent_upgrades, &ability_stats);
            scored.team_context = team_context;
            scored.championship_share = share;
            cohort.push(scored);
        }

        normalize_families(&mut cohort, FAMILIES)?;

        for driver in cohort.iter_mut() {
            let (raw, parts) = compose(driver);
            driver.raw_score = raw;
            driver.strength = logistic(raw);
            driver.breakdown = parts
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect();
        }

        let strengths: Vec<f64> = cohort.iter().map(|d| d.strength).collect();
        for (driver, (normalized, scaled)) in cohort.iter_mut().zip(strength_spread(&strengths)?) {
            driver.normalized_strength = normalized;
            driver.scaled_strength = scaled;
            debug!(
                "{}: raw={:.4} strength={:.4} scaled={:.4}",
                driver.name, driver.raw_score, driver.strength, driver.scaled_strength
            );
        }
        Ok(cohort)
    }

    /// Solve the band and price an already scored cohort in place.
    pub fn price_cohort(
        &self,
        cohort: &mut [ScoredDriver],
        previous: &PriceSnapshot,
    ) -> Result<PriceBand, EngineError> {
        let strengths: Vec<f64> = cohort.iter().map(|d| d.strength).collect();
        let band = solve_band(&strengths, &self.budget)?;

        for driver in cohort.iter_mut() {
            driver.base_price = charm(band.price_at(driver.scaled_strength));
            driver.elasticity = elasticity(
                driver.live.reliability,
                driver.z.dna_variance,
                driver.z.volatility,
            );
            driver.previous_price = previous.price_of(&driver.name);
            driver.price = reprice(driver.previous_price, driver.base_price, driver.elasticity);

            for (key, value) in [
                ("band_min", band.min),
                ("band_max", band.max),
                ("base_price", driver.base_price),
                ("elasticity", driver.elasticity),
                ("previous_price", driver.previous_price),
                ("price", driver.price),
            ] {
                driver.breakdown.insert(key.to_string(), value);
            }
            debug!(
                "{}: base={:.2} prev={:.2} price={:.2}",
                driver.name, driver.base_price, driver.previous_price, driver.price
            );
        }
        Ok(band)
    }
}

/// Snapshot of the prices a pass produced, for the next pass.
pub fn snapshot_of(cohort: &[ScoredDriver]) -> PriceSnapshot {
    PriceSnapshot::new(cohort.iter().map(|d| (d.name.clone(), d.price)))
}
