//! Live-form window: the last five classified races of the current season.

use serde::{Deserialize, Serialize};

use crate::models::{DriverRecord, RaceResult, SeasonRecord};

/// Maximum races in the live window.
pub const WINDOW_SIZE: usize = 5;
/// Smoothing factor for the recent-points EWMA.
pub const REC_ALPHA: f64 = 0.35;
/// Finishing position at or above which a race counts as clutch.
const CLUTCH_POSITION: u32 = 5;

/// Raw live-form signals of one driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveForm {
    /// Mean places gained per race
    pub gain: f64,
    /// Population std-dev of per-race gain
    pub volatility: f64,
    /// Fraction of window races finished in the top five
    pub clutch: f64,
    /// Fraction of window races with the fastest lap
    pub fastest_lap: f64,
    /// EWMA of points, most recent race heaviest
    pub recent_points: f64,
    /// `1 − DNFs / races` for the season
    pub reliability: f64,
    /// Classified races in the window; drives early-season damping
    pub rows: usize,
}

impl Default for LiveForm {
    fn default() -> Self {
        LiveForm {
            gain: 0.0,
            volatility: 0.0,
            clutch: 0.0,
            fastest_lap: 0.0,
            recent_points: 0.0,
            reliability: 1.0,
            rows: 0,
        }
    }
}

impl SeasonRecord {
    /// Classified races, most recent round first, at most `max`.
    pub fn classified_window(&self, max: usize) -> Vec<&RaceResult> {
        let mut races: Vec<&RaceResult> = self.results.iter().collect();
        races.sort_by(|a, b| b.race_number.cmp(&a.race_number));
        races
            .into_iter()
            .filter(|r| r.classified)
            .take(max)
            .collect()
    }

    /// `1 − DNFs / races`, 1 when no races were run.
    pub fn reliability(&self) -> f64 {
        if self.races == 0 {
            return 1.0;
        }
        1.0 - self.dnfs as f64 / self.races as f64
    }
}

fn fraction(window: &[&RaceResult], pred: impl Fn(&RaceResult) -> bool) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().filter(|r| pred(r)).count() as f64 / window.len() as f64
}

/// Recent points: `α·P0 + Σ_{i≥1} (1−α)^i · α · P_i`, P0 most recent.
///
/// Kept in this literal form; it is not reseeded like a textbook EWMA.
pub fn recent_points_ewma(window: &[&RaceResult]) -> f64 {
    let Some(first) = window.first() else {
        return 0.0;
    };
    let mut ewma = REC_ALPHA * first.points;
    let mut mult = 1.0;
    for race in &window[1..] {
        mult *= 1.0 - REC_ALPHA;
        ewma += mult * REC_ALPHA * race.points;
    }
    ewma
}

impl LiveForm {
    pub fn from_season(season: &SeasonRecord) -> Self {
        let window = season.classified_window(WINDOW_SIZE);
        let gains: Vec<f64> = window.iter().map(|r| r.gain()).collect();

        let gain = if gains.is_empty() {
            0.0
        } else {
            gains.iter().sum::<f64>() / gains.len() as f64
        };
        let volatility = if gains.len() < 2 {
            0.0
        } else {
            let var = gains.iter().map(|g| (g - gain).powi(2)).sum::<f64>() / gains.len() as f64;
            var.sqrt()
        };

        LiveForm {
            gain,
            volatility,
            clutch: fraction(&window, |r| r.finish_position <= CLUTCH_POSITION),
            fastest_lap: fraction(&window, |r| r.fastest_lap),
            recent_points: recent_points_ewma(&window),
            reliability: season.reliability(),
            rows: window.len(),
        }
    }

    /// Live form from the driver's most recent season; neutral defaults
    /// when the driver has no season data.
    pub fn for_driver(driver: &DriverRecord) -> Self {
        driver
            .latest_season()
            .map(LiveForm::from_season)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn race(number: u32, start: u32, finish: u32, points: f64, classified: bool) -> RaceResult {
        RaceResult {
            race_name: format!("R{}", number),
            race_number: number,
            start_position: start,
            finish_position: finish,
            points,
            fastest_lap: false,
            dnf: !classified,
            classified,
        }
    }

    fn season(results: Vec<RaceResult>, races: u32, dnfs: u32) -> SeasonRecord {
        SeasonRecord {
            year: 2024,
            team: "Team".into(),
            points: 0.0,
            wins: 0,
            podiums: 0,
            races,
            point_finishes: 0,
            dnfs,
            team_points: 0.0,
            team_position: 1,
            teammate_points: 0.0,
            results,
        }
    }

    #[test]
    fn window_keeps_five_latest_classified() {
        let results = vec![
            race(1, 5, 5, 10.0, true),
            race(7, 5, 5, 10.0, true),
            race(3, 5, 5, 10.0, true),
            race(6, 5, 20, 0.0, false),
            race(2, 5, 5, 10.0, true),
            race(5, 5, 5, 10.0, true),
            race(4, 5, 5, 10.0, true),
        ];
        let s = season(results, 7, 1);
        let numbers: Vec<u32> = s.classified_window(5).iter().map(|r| r.race_number).collect();
        assert_eq!(numbers, vec![7, 5, 4, 3, 2]);
    }

    #[test]
    fn gain_and_volatility() {
        // gains: +3, -1
        let s = season(vec![race(2, 8, 5, 10.0, true), race(1, 4, 5, 10.0, true)], 2, 0);
        let f = LiveForm::from_season(&s);
        assert_relative_eq!(f.gain, 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.volatility, 2.0, epsilon = 1e-12);
        assert_relative_eq!(f.clutch, 1.0, epsilon = 1e-12);
        assert_eq!(f.rows, 2);
    }

    #[test]
    fn single_race_has_no_volatility() {
        let s = season(vec![race(1, 10, 2, 18.0, true)], 1, 0);
        let f = LiveForm::from_season(&s);
        assert_eq!(f.volatility, 0.0);
        assert_relative_eq!(f.gain, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn ewma_front_loads_latest_race() {
        let s = season(
            vec![race(3, 1, 1, 25.0, true), race(2, 1, 2, 18.0, true), race(1, 1, 3, 15.0, true)],
            3,
            0,
        );
        let window = s.classified_window(5);
        let expected = 0.35 * 25.0 + 0.65 * 0.35 * 18.0 + 0.65 * 0.65 * 0.35 * 15.0;
        assert_relative_eq!(recent_points_ewma(&window), expected, epsilon = 1e-12);
    }

    #[test]
    fn reliability_defaults_to_one() {
        assert_eq!(season(Vec::new(), 0, 0).reliability(), 1.0);
        assert_relative_eq!(season(Vec::new(), 10, 2).reliability(), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn empty_window_is_neutral() {
        let f = LiveForm::from_season(&season(vec![race(1, 3, 20, 0.0, false)], 1, 1));
        assert_eq!(f.rows, 0);
        assert_eq!(f.gain, 0.0);
        assert_eq!(f.recent_points, 0.0);
        assert_relative_eq!(f.reliability, 0.0, epsilon = 1e-12);
    }
}
