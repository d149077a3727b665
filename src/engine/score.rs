//! Score composition: a fixed-weight linear blend of every normalised signal,
//! squashed through the logistic into Strength.

use serde::{Deserialize, Serialize};

use crate::engine::normalize::CohortStats;
use crate::engine::pipeline::ScoredDriver;
use crate::error::EngineError;

/// Constant added to every raw score.
pub const BIAS: f64 = 0.15;

/// Strength spreads at or below this are treated as a flat cohort.
pub const FLAT_SPREAD: f64 = 1e-9;

/// Cohort z-scores of every metric family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZScores {
    // three-year roll-up
    pub points_per_race: f64,
    pub win_rate: f64,
    pub podium_rate: f64,
    pub point_finish_rate: f64,
    pub dnf_rate: f64,
    pub team_share: f64,
    pub teammate_delta: f64,
    pub championship_pct: f64,
    // live window
    pub recent_points: f64,
    pub gain: f64,
    pub volatility: f64,
    pub clutch: f64,
    pub fastest_lap: f64,
    /// ConsZ; diagnostic only, the score takes the raw value
    pub driver_reliability: f64,
    // team context
    pub team_strength: f64,
    pub team_reliability: f64,
    pub momentum: f64,
    pub ceiling: f64,
    pub engine_tier: f64,
    pub budget_tier: f64,
    // DNA
    pub dna_variance: f64,
    // standings
    pub championship_share: f64,
}

/// One weighted input to the raw score.
pub struct Signal {
    pub name: &'static str,
    pub weight: f64,
    pub value: fn(&ScoredDriver) -> f64,
}

/// Positive weights reward, negative weights penalise. Reliability and the
/// DNA core enter on their natural scale rather than as z-scores.
pub const SIGNALS: &[Signal] = &[
    Signal { name: "points_per_race_3y", weight: 0.16, value: |d| d.z.points_per_race },
    Signal { name: "win_rate_3y", weight: 0.05, value: |d| d.z.win_rate },
    Signal { name: "podium_rate_3y", weight: 0.05, value: |d| d.z.podium_rate },
    Signal { name: "point_finish_rate_3y", weight: 0.03, value: |d| d.z.point_finish_rate },
    Signal { name: "dnf_rate_3y", weight: -0.03, value: |d| d.z.dnf_rate },
    Signal { name: "team_share_3y", weight: 0.04, value: |d| d.z.team_share },
    Signal { name: "teammate_delta_3y", weight: 0.03, value: |d| d.z.teammate_delta },
    Signal { name: "championship_pct_3y", weight: 0.03, value: |d| d.z.championship_pct },
    Signal { name: "recent_form", weight: 0.11, value: |d| d.z.recent_points },
    Signal { name: "position_gain", weight: 0.07, value: |d| d.z.gain },
    Signal { name: "volatility", weight: -0.02, value: |d| d.z.volatility },
    Signal { name: "clutch", weight: 0.03, value: |d| d.z.clutch },
    Signal { name: "fastest_lap", weight: 0.03, value: |d| d.z.fastest_lap },
    Signal { name: "reliability", weight: 0.04, value: |d| d.live.reliability },
    Signal { name: "team_strength", weight: 0.03, value: |d| d.z.team_strength },
    Signal { name: "team_momentum", weight: 0.04, value: |d| d.z.momentum },
    Signal { name: "team_ceiling", weight: 0.03, value: |d| d.z.ceiling },
    Signal { name: "team_reliability", weight: 0.03, value: |d| d.z.team_reliability },
    Signal { name: "engine_tier", weight: 0.02, value: |d| d.z.engine_tier },
    Signal { name: "budget_tier", weight: 0.02, value: |d| d.z.budget_tier },
    Signal { name: "dna_core", weight: 0.04, value: |d| d.dna.performance_ratio },
    Signal { name: "dna_variance", weight: -0.02, value: |d| d.z.dna_variance },
    Signal { name: "championship_share", weight: 0.02, value: |d| d.z.championship_share },
];

/// Numerically stable logistic; exactly 0.5 at 0.
pub fn logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Raw score of a driver and the weighted contribution of each signal.
pub fn compose(driver: &ScoredDriver) -> (f64, Vec<(&'static str, f64)>) {
    let mut parts = Vec::with_capacity(SIGNALS.len() + 1);
    parts.push(("bias", BIAS));
    let mut raw = BIAS;
    for signal in SIGNALS {
        let contribution = signal.weight * (signal.value)(driver);
        raw += contribution;
        parts.push((signal.name, contribution));
    }
    (raw, parts)
}

/// Cohort view of Strength: `(normalized, scaled)` per driver.
///
/// `normalized` is the population z-score; `scaled` is min-max into [0, 1],
/// all zeros for a flat cohort.
pub fn strength_spread(strengths: &[f64]) -> Result<Vec<(f64, f64)>, EngineError> {
    let stats = CohortStats::of(strengths)?;
    let min = strengths.iter().copied().fold(f64::INFINITY, f64::min);
    let max = strengths.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    Ok(strengths
        .iter()
        .map(|s| {
            let scaled = if spread > FLAT_SPREAD {
                (s - min) / spread
            } else {
                0.0
            };
            (stats.z(*s), scaled)
        })
        .collect())
}
