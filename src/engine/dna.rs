//! Driver DNA: the twelve ability slots standardised against the cohort,
//! adjusted by declared style and tags, then collapsed into a weighted core
//! (`performance_ratio`) and a spread (`consistency`).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::normalize::{CohortStats, ZPolicy};
use crate::error::EngineError;
use crate::models::{Ability, AbilityVector, DriverRecord, DriverStyle};

/// Clamp bound for ability z-scores before and after adjustment.
const DNA_BOUND: f64 = 2.0;
const SPECIALTY_BUMP: f64 = 0.10;
const WEAKNESS_PENALTY: f64 = 0.10;
const UPGRADE_BUMP: f64 = 0.05;
/// Share of its bump a secondary style contributes.
const SECONDARY_STYLE_SHARE: f64 = 0.5;

/// Slots that benefit when the team has just brought upgrades.
const UPGRADE_SLOTS: [Ability; 3] = [
    Ability::SetupAdaptability,
    Ability::TechnicalCorners,
    Ability::RaceConsistency,
];

/// Weight of each slot in the DNA core. Sums to 1.
pub const SLOT_WEIGHTS: [(Ability, f64); Ability::COUNT] = [
    (Ability::QualifyingPace, 0.18),
    (Ability::RaceStart, 0.14),
    (Ability::OvertakingSkill, 0.14),
    (Ability::RaceConsistency, 0.12),
    (Ability::TireManagement, 0.11),
    (Ability::TechnicalCorners, 0.08),
    (Ability::ErsManagement, 0.07),
    (Ability::SetupAdaptability, 0.06),
    (Ability::FuelSaving, 0.04),
    (Ability::BrakingStability, 0.03),
    (Ability::WetWeather, 0.02),
    (Ability::SafetyCarRestart, 0.01),
];

/// Archetype name → z adjustments. A primary style gets the full bump, a
/// secondary style half of it. Archetypes without a row bump nothing.
pub const STYLE_BUMPS: &[(&str, &[(Ability, f64)])] = &[
    (
        "Aggressive",
        &[
            (Ability::OvertakingSkill, 0.15),
            (Ability::RaceStart, 0.15),
            (Ability::ErsManagement, 0.15),
        ],
    ),
    (
        "Smooth",
        &[
            (Ability::TireManagement, 0.15),
            (Ability::FuelSaving, 0.15),
            (Ability::RaceConsistency, 0.15),
        ],
    ),
    ("Quali-Ace", &[(Ability::QualifyingPace, 0.20)]),
    ("Tyre-Whisperer", &[(Ability::TireManagement, 0.20)]),
    ("Rain-Master", &[(Ability::WetWeather, 0.25)]),
    (
        "Engineer's Driver",
        &[
            (Ability::SetupAdaptability, 0.15),
            (Ability::TechnicalCorners, 0.15),
        ],
    ),
    (
        "Defensive",
        &[
            (Ability::BrakingStability, 0.15),
            (Ability::RaceConsistency, 0.15),
            (Ability::SafetyCarRestart, 0.10),
        ],
    ),
];

fn bumps_for(style: &DriverStyle) -> &'static [(Ability, f64)] {
    STYLE_BUMPS
        .iter()
        .find(|(name, _)| *name == style.name())
        .map(|(_, bumps)| *bumps)
        .unwrap_or(&[])
}

/// Summed style adjustments for a primary and optional secondary style.
pub fn style_vector(
    driver: &str,
    primary: &DriverStyle,
    secondary: Option<&DriverStyle>,
) -> [f64; Ability::COUNT] {
    let mut out = [0.0; Ability::COUNT];
    for (style, share) in [(Some(primary), 1.0), (secondary, SECONDARY_STYLE_SHARE)] {
        let Some(style) = style else { continue };
        if let DriverStyle::Unrecognized(tag) = style {
            if !tag.trim().is_empty() {
                warn!("{}: ignoring unknown style {:?}", driver, tag);
            }
            continue;
        }
        for (ability, bump) in bumps_for(style) {
            out[ability.index()] += bump * share;
        }
    }
    out
}

/// Resolve free-form tags to ability slots, dropping the ones that name no
/// ability.
pub fn resolve_tags(driver: &str, kind: &str, tags: &[String]) -> Vec<Ability> {
    tags.iter()
        .filter_map(|tag| {
            let ability = Ability::from_name(tag);
            if ability.is_none() {
                warn!("{}: ignoring unknown {} tag {:?}", driver, kind, tag);
            }
            ability
        })
        .collect()
}

/// Cohort mean and spread of every ability slot.
#[derive(Debug, Clone)]
pub struct AbilityStats([CohortStats; Ability::COUNT]);

impl AbilityStats {
    pub fn from_cohort<'a>(
        cohort: impl IntoIterator<Item = &'a AbilityVector>,
    ) -> Result<Self, EngineError> {
        let vectors: Vec<&AbilityVector> = cohort.into_iter().collect();
        let mut stats = [CohortStats { mean: 0.0, std: 0.0 }; Ability::COUNT];
        for ability in Ability::ALL {
            let column: Vec<f64> = vectors.iter().map(|v| v[ability]).collect();
            stats[ability.index()] = CohortStats::of(&column)?;
        }
        Ok(AbilityStats(stats))
    }

    pub fn slot(&self, ability: Ability) -> &CohortStats {
        &self.0[ability.index()]
    }
}

/// Adjusted ability profile of one driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverDna {
    /// Adjusted z per slot, in [`Ability::ALL`] order, each within ±2
    pub vector: [f64; Ability::COUNT],
    /// Weighted sum of the vector (DNA core)
    pub performance_ratio: f64,
    /// Population std-dev of the vector (DNA variance)
    pub consistency: f64,
}

impl DriverDna {
    pub fn compute(driver: &DriverRecord, recent_upgrades: bool, stats: &AbilityStats) -> Self {
        let style = style_vector(
            &driver.name,
            &driver.primary_style,
            driver.secondary_style.as_ref(),
        );
        let specialties = resolve_tags(&driver.name, "specialty", &driver.specialties);
        let weaknesses = resolve_tags(&driver.name, "weakness", &driver.weaknesses);

        let mut vector = [0.0; Ability::COUNT];
        for ability in Ability::ALL {
            let mut z = ZPolicy::ABILITY.apply(stats.slot(ability), driver.abilities[ability], 0);
            z += style[ability.index()];
            if specialties.contains(&ability) {
                z += SPECIALTY_BUMP;
            }
            if weaknesses.contains(&ability) {
                z -= WEAKNESS_PENALTY;
            }
            if recent_upgrades && UPGRADE_SLOTS.contains(&ability) {
                z += UPGRADE_BUMP;
            }
            vector[ability.index()] = z.clamp(-DNA_BOUND, DNA_BOUND);
        }

        let performance_ratio: f64 = SLOT_WEIGHTS
            .iter()
            .map(|(ability, w)| w * vector[ability.index()])
            .sum();
        let n = Ability::COUNT as f64;
        let mean = vector.iter().sum::<f64>() / n;
        let consistency = (vector.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

        DriverDna {
            vector,
            performance_ratio,
            consistency,
        }
    }
}
