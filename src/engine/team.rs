//! Team context: strength, reliability, momentum, ceiling and categorical
//! tiers, computed once per team and broadcast to the team's drivers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::engine::season::SEASON_WEIGHTS;
use crate::models::{BudgetTier, TeamSnapshot};

/// Ceiling used when no team on the grid has any race history.
const DEFAULT_GRID_CEILING: f64 = 0.05;
/// Prior seasons counted towards momentum and ceiling.
const HISTORY_DEPTH: usize = 2;

// ── Categorical tiers ────────────────────────────────────────────────────────

/// Power-unit supplier → latent horsepower scalar.
const ENGINE_TIERS: &[(&str, f64)] = &[
    ("mercedes", 1.00),
    ("ferrari", 0.90),
    ("honda", 0.85),
    ("rbpt", 0.85),
    ("renault", 0.80),
    ("alpine", 0.80),
];
const DEFAULT_ENGINE_TIER: f64 = 0.60;
const DEFAULT_BUDGET_TIER: f64 = 0.50;

pub fn engine_tier(power_unit: &str) -> f64 {
    let key = power_unit.trim().to_lowercase();
    match ENGINE_TIERS.iter().find(|(name, _)| *name == key) {
        Some((_, tier)) => *tier,
        None => {
            warn!(
                "Unrecognised power unit {:?}; using tier {}",
                power_unit, DEFAULT_ENGINE_TIER
            );
            DEFAULT_ENGINE_TIER
        }
    }
}

pub fn budget_tier(tier: &BudgetTier) -> f64 {
    match tier {
        BudgetTier::Top => 1.00,
        BudgetTier::UpperMid => 0.75,
        BudgetTier::LowerMid => 0.50,
        BudgetTier::Backmarker => 0.25,
        BudgetTier::Unrecognized(s) => {
            warn!(
                "Unrecognised budget tier {:?}; using tier {}",
                s, DEFAULT_BUDGET_TIER
            );
            DEFAULT_BUDGET_TIER
        }
    }
}

// ── Snapshot metrics ─────────────────────────────────────────────────────────

impl TeamSnapshot {
    /// Share of all points scored on the grid this season.
    pub fn strength(&self, total_points: f64) -> f64 {
        if total_points == 0.0 {
            return 0.0;
        }
        self.points / total_points
    }

    /// `1 − DNFs / racesRun`; 1 before the first race.
    pub fn reliability(&self) -> f64 {
        if self.races_run == 0 {
            return 1.0;
        }
        1.0 - self.dnfs as f64 / self.races_run as f64
    }

    /// Current-season points, extrapolated to a full season while fewer than
    /// half the races have been run.
    pub fn projected_points(&self) -> f64 {
        if self.races_run == 0 {
            return 0.0;
        }
        let half = self.total_races / 2;
        if half > 0 && self.races_run < half {
            return self.points * self.total_races as f64 / self.races_run as f64;
        }
        self.points
    }

    /// Decay-weighted points trend over this and up to two prior seasons.
    pub fn momentum(&self) -> f64 {
        let history = self.history_by_recency();
        let mut sum = SEASON_WEIGHTS[0] * self.projected_points();
        let mut weight_sum = SEASON_WEIGHTS[0];
        for (season, w) in history.iter().take(HISTORY_DEPTH).zip(&SEASON_WEIGHTS[1..]) {
            sum += w * season.points;
            weight_sum += w;
        }
        sum / weight_sum
    }

    /// `(wins, races)` over this and up to two prior seasons.
    fn win_history(&self) -> (u32, u32) {
        self.history_by_recency()
            .iter()
            .take(HISTORY_DEPTH)
            .fold((self.wins, self.races_run), |(w, r), s| (w + s.wins, r + s.races))
    }

    /// Win rate over the recent history, or `grid_mean` without any races.
    pub fn ceiling(&self, grid_mean: f64) -> f64 {
        let (wins, races) = self.win_history();
        if races == 0 {
            return grid_mean;
        }
        wins as f64 / races as f64
    }
}

// ── Team index ───────────────────────────────────────────────────────────────

/// Team snapshots keyed by lowercase name.
///
/// Ordered so that grid-wide sums come out identical on every run.
#[derive(Debug, Clone, Default)]
pub struct TeamIndex {
    teams: BTreeMap<String, TeamSnapshot>,
}

impl TeamIndex {
    pub fn new(teams: impl IntoIterator<Item = TeamSnapshot>) -> Self {
        let mut index = BTreeMap::new();
        for team in teams {
            let key = team.name.to_lowercase();
            if index.contains_key(&key) {
                warn!("Duplicate team {:?}; keeping the first snapshot", team.name);
                continue;
            }
            index.insert(key, team);
        }
        TeamIndex { teams: index }
    }

    pub fn get(&self, name: &str) -> Option<&TeamSnapshot> {
        self.teams.get(&name.to_lowercase())
    }

    /// Number of constructors on the grid.
    pub fn grid_size(&self) -> usize {
        self.teams.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamSnapshot> {
        self.teams.values()
    }

    pub fn total_points(&self) -> f64 {
        self.iter().map(|t| t.points).sum()
    }

    /// Races-weighted mean ceiling across teams with any race history.
    pub fn grid_mean_ceiling(&self) -> f64 {
        // Each team's ceiling weighted by its races collapses to total wins
        // over total races.
        let (wins, races) = self
            .iter()
            .map(TeamSnapshot::win_history)
            .fold((0u32, 0u32), |(w, r), (tw, tr)| (w + tw, r + tr));
        if races == 0 {
            return DEFAULT_GRID_CEILING;
        }
        wins as f64 / races as f64
    }
}

/// Raw team-level signals shared by every driver of a team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamContext {
    pub strength: f64,
    pub reliability: f64,
    pub momentum: f64,
    pub ceiling: f64,
    pub engine_tier: f64,
    pub budget_tier: f64,
    pub recent_upgrades: bool,
}

impl TeamContext {
    pub fn new(team: &TeamSnapshot, total_points: f64, grid_mean_ceiling: f64) -> Self {
        TeamContext {
            strength: team.strength(total_points),
            reliability: team.reliability(),
            momentum: team.momentum(),
            ceiling: team.ceiling(grid_mean_ceiling),
            engine_tier: engine_tier(&team.power_unit),
            budget_tier: budget_tier(&team.budget_tier),
            recent_upgrades: team.recent_upgrades,
        }
    }

    /// Context for every team in the index, keyed like the index.
    pub fn for_grid(index: &TeamIndex) -> BTreeMap<String, TeamContext> {
        let total = index.total_points();
        let grid_mean = index.grid_mean_ceiling();
        index
            .iter()
            .map(|t| (t.name.to_lowercase(), TeamContext::new(t, total, grid_mean)))
            .collect()
    }
}
