//! Per-season ratios and the three-year exponentially weighted roll-up.
//!
//! Weights decay geometrically with ratio 0.6: the current season counts
//! 0.60, the one before 0.36, the one before that 0.216. The roll-up divides
//! by the weights actually used, so a driver with one season gets that
//! season's values unchanged.

use serde::{Deserialize, Serialize};

use crate::models::{DriverRecord, SeasonRecord};

/// Decay weights, most recent season first.
pub const SEASON_WEIGHTS: [f64; 3] = [0.60, 0.36, 0.216];

/// Team-share used when the team scored nothing.
const NEUTRAL_TEAM_SHARE: f64 = 0.5;

// ── Season ratios ────────────────────────────────────────────────────────────

fn per_race(count: f64, races: u32) -> f64 {
    if races == 0 {
        return 0.0;
    }
    count / races as f64
}

impl SeasonRecord {
    pub fn points_per_race(&self) -> f64 {
        per_race(self.points, self.races)
    }

    pub fn win_rate(&self) -> f64 {
        per_race(self.wins as f64, self.races)
    }

    pub fn podium_rate(&self) -> f64 {
        per_race(self.podiums as f64, self.races)
    }

    pub fn point_finish_rate(&self) -> f64 {
        per_race(self.point_finishes as f64, self.races)
    }

    pub fn dnf_rate(&self) -> f64 {
        per_race(self.dnfs as f64, self.races)
    }

    /// Driver's fraction of the team's points; 0.5 if the team scored none.
    pub fn team_share(&self) -> f64 {
        if self.team_points == 0.0 {
            return NEUTRAL_TEAM_SHARE;
        }
        self.points / self.team_points
    }

    pub fn teammate_delta(&self) -> f64 {
        self.points - self.teammate_points
    }

    /// `1 − (teamPosition − 1) / (gridSize − 1)`; 1.0 for the champion team.
    ///
    /// Grids of size 0 or 1 have no meaningful percentile and yield 0.
    pub fn championship_percentile(&self, grid_size: usize) -> f64 {
        if grid_size <= 1 {
            return 0.0;
        }
        1.0 - (self.team_position as f64 - 1.0) / (grid_size as f64 - 1.0)
    }
}

// ── Temporal aggregation ─────────────────────────────────────────────────────

/// Weighted three-season roll-up of the eight season ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonRollup {
    pub points_per_race: f64,
    pub win_rate: f64,
    pub podium_rate: f64,
    pub point_finish_rate: f64,
    pub dnf_rate: f64,
    pub team_share: f64,
    pub teammate_delta: f64,
    pub championship_pct: f64,
}

impl SeasonRollup {
    /// Roll up at most the three most recent seasons of `driver`.
    ///
    /// A driver with no seasons rolls up to all zeros.
    pub fn for_driver(driver: &DriverRecord, grid_size: usize) -> Self {
        let seasons = driver.seasons_by_recency();
        let mut out = SeasonRollup::default();
        let mut weight_sum = 0.0;

        for (season, w) in seasons.iter().zip(SEASON_WEIGHTS) {
            weight_sum += w;
            out.points_per_race += w * season.points_per_race();
            out.win_rate += w * season.win_rate();
            out.podium_rate += w * season.podium_rate();
            out.point_finish_rate += w * season.point_finish_rate();
            out.dnf_rate += w * season.dnf_rate();
            out.team_share += w * season.team_share();
            out.teammate_delta += w * season.teammate_delta();
            out.championship_pct += w * season.championship_percentile(grid_size);
        }

        if weight_sum == 0.0 {
            return out;
        }
        out.points_per_race /= weight_sum;
        out.win_rate /= weight_sum;
        out.podium_rate /= weight_sum;
        out.point_finish_rate /= weight_sum;
        out.dnf_rate /= weight_sum;
        out.team_share /= weight_sum;
        out.teammate_delta /= weight_sum;
        out.championship_pct /= weight_sum;
        out
    }
}
