//! Cohort and price-snapshot files.
//!
//! The cohort is one JSON document `{ "teams": [...], "drivers": [...] }`.
//! Everything the engine cannot default is rejected here, before scoring.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::engine::{PriceSnapshot, TeamIndex};
use crate::models::{DriverRecord, TeamSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortFile {
    pub teams: Vec<TeamSnapshot>,
    pub drivers: Vec<DriverRecord>,
}

impl CohortFile {
    /// Parse and validate a cohort document.
    pub fn from_json(json: &str) -> Result<Self> {
        let cohort: CohortFile = serde_json::from_str(json).context("Failed to parse cohort JSON")?;
        cohort.validate()?;
        Ok(cohort)
    }

    pub fn validate(&self) -> Result<()> {
        if self.drivers.is_empty() {
            anyhow::bail!("cohort contains no drivers");
        }

        let mut names = HashSet::new();
        for driver in &self.drivers {
            if !names.insert(driver.name.as_str()) {
                anyhow::bail!("duplicate driver name {:?}", driver.name);
            }
            let mut years = HashSet::new();
            for season in &driver.seasons {
                if !years.insert(season.year) {
                    anyhow::bail!("driver {:?} has more than one season for {}", driver.name, season.year);
                }
            }
        }

        let teams: HashSet<String> = self.teams.iter().map(|t| t.name.to_lowercase()).collect();
        for driver in &self.drivers {
            if !teams.contains(&driver.team.to_lowercase()) {
                anyhow::bail!("driver {:?} references unknown team {:?}", driver.name, driver.team);
            }
        }
        Ok(())
    }

    /// Split into the team index and the driver list the engine consumes.
    pub fn into_parts(self) -> (TeamIndex, Vec<DriverRecord>) {
        (TeamIndex::new(self.teams), self.drivers)
    }
}

pub fn load_cohort(path: &Path) -> Result<CohortFile> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cohort file {}", path.display()))?;
    let cohort = CohortFile::from_json(&json)
        .with_context(|| format!("Invalid cohort file {}", path.display()))?;
    info!(
        "Loaded cohort: {} drivers, {} teams",
        cohort.drivers.len(),
        cohort.teams.len()
    );
    Ok(cohort)
}

pub fn load_snapshot(path: &Path) -> Result<PriceSnapshot> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read price snapshot {}", path.display()))?;
    let snapshot: PriceSnapshot =
        serde_json::from_str(&json).context("Failed to parse price snapshot")?;
    info!(
        "Loaded {} previous prices from {} ({})",
        snapshot.len(),
        path.display(),
        snapshot.generated_at
    );
    Ok(snapshot)
}

pub fn save_snapshot(path: &Path, snapshot: &PriceSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialise price snapshot")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write price snapshot {}", path.display()))?;
    info!("Wrote {} prices to {}", snapshot.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ability, BudgetTier, DriverStyle, PopularityTier};

    const COHORT: &str = r#"{
        "teams": [
            {
                "name": "Alpha",
                "power_unit": "Ferrari",
                "position": 1,
                "points": 120,
                "budget_tier": "Top",
                "wins": 2,
                "podiums": 5,
                "dnfs": 1,
                "races_run": 6,
                "total_races": 24
            }
        ],
        "drivers": [
            {
                "name": "Ace",
                "team": "alpha",
                "age": 29,
                "primary_style": "Quali-Ace",
                "market_popularity": "High",
                "abilities": { "QualifyingPace": 0.95, "wet_weather": 0.8 },
                "seasons": [
                    {
                        "year": 2024,
                        "team": "Alpha",
                        "points": 80,
                        "wins": 2,
                        "podiums": 3,
                        "races": 6,
                        "point_finishes": 5,
                        "dnfs": 1,
                        "team_points": 120,
                        "team_position": 1,
                        "teammate_points": 40,
                        "results": [
                            { "race_number": 1, "start_position": 1, "finish_position": 1, "points": 25, "classified": true }
                        ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_cohort_with_defaults() {
        let cohort = CohortFile::from_json(COHORT).unwrap();
        assert_eq!(cohort.teams[0].budget_tier, BudgetTier::Top);
        let ace = &cohort.drivers[0];
        assert_eq!(ace.primary_style, DriverStyle::QualiAce);
        assert_eq!(ace.market_popularity, PopularityTier::High);
        assert_eq!(ace.abilities[Ability::QualifyingPace], 0.95);
        assert_eq!(ace.abilities[Ability::WetWeather], 0.8);
        assert_eq!(ace.abilities[Ability::FuelSaving], 0.7);
        assert_eq!(ace.seasons[0].results.len(), 1);
        assert!(ace.secondary_style.is_none());

        let (teams, drivers) = cohort.into_parts();
        assert!(teams.get("ALPHA").is_some());
        assert_eq!(drivers.len(), 1);
    }

    #[test]
    fn rejects_duplicate_driver() {
        let mut cohort = CohortFile::from_json(COHORT).unwrap();
        let twin = cohort.drivers[0].clone();
        cohort.drivers.push(twin);
        let err = cohort.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate driver"));
    }

    #[test]
    fn rejects_duplicate_season_year() {
        let mut cohort = CohortFile::from_json(COHORT).unwrap();
        let again = cohort.drivers[0].seasons[0].clone();
        cohort.drivers[0].seasons.push(again);
        assert!(cohort.validate().is_err());
    }

    #[test]
    fn rejects_unknown_team_and_empty_cohort() {
        let mut cohort = CohortFile::from_json(COHORT).unwrap();
        cohort.drivers[0].team = "Nowhere".into();
        assert!(cohort.validate().is_err());
        cohort.drivers.clear();
        assert!(cohort.validate().is_err());
    }

    #[test]
    fn snapshot_file_round_trip() {
        let path = std::env::temp_dir().join(format!("driver-pricing-snapshot-{}.json", std::process::id()));
        let snapshot = PriceSnapshot::new(vec![("Ace".to_string(), 27.5), ("Blaze".to_string(), 12.0)]);
        save_snapshot(&path, &snapshot).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn sample_cohort_prices_within_band() {
        use crate::engine::{Budget, PricingEngine};

        let cohort = CohortFile::from_json(include_str!("../data/sample_cohort.json")).unwrap();
        let (teams, drivers) = cohort.into_parts();
        let out = PricingEngine::new(Budget::new(50.0, 2).unwrap())
            .run(&drivers, &teams, &PriceSnapshot::default())
            .unwrap();
        assert_eq!(out.len(), 4);
        for d in &out {
            let min = d.breakdown["band_min"];
            let max = d.breakdown["band_max"];
            assert!(d.price >= min && d.price <= max + 0.5, "{} priced {}", d.name, d.price);
        }
    }

    #[test]
    fn missing_cohort_file_reports_path() {
        let err = load_cohort(Path::new("/nonexistent/cohort.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/cohort.json"));
    }
}
