//! Championship share: each driver's current-season points relative to the
//! leader's.

use crate::models::DriverRecord;

fn current_points(driver: &DriverRecord) -> f64 {
    driver.latest_season().map(|s| s.points).unwrap_or(0.0)
}

/// Raw shares in cohort order. Leader = 1.0; all zeros before anyone scores.
pub fn championship_shares(drivers: &[&DriverRecord]) -> Vec<f64> {
    let points: Vec<f64> = drivers.iter().map(|d| current_points(d)).collect();
    let leader = points.iter().copied().fold(0.0, f64::max);
    if leader == 0.0 {
        return vec![0.0; points.len()];
    }
    points.into_iter().map(|p| p / leader).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AbilityVector, DriverStyle, PopularityTier, SeasonRecord};
    use approx::assert_relative_eq;

    fn driver(seasons: &[(i32, f64)]) -> DriverRecord {
        DriverRecord {
            name: "D".into(),
            team: "T".into(),
            age: 30,
            championship_wins: 0,
            career_podiums: 0,
            career_starts: 0,
            seasons: seasons
                .iter()
                .map(|(year, points)| SeasonRecord {
                    year: *year,
                    team: "T".into(),
                    points: *points,
                    wins: 0,
                    podiums: 0,
                    races: 10,
                    point_finishes: 0,
                    dnfs: 0,
                    team_points: 0.0,
                    team_position: 1,
                    teammate_points: 0.0,
                    results: Vec::new(),
                })
                .collect(),
            primary_style: DriverStyle::AllRounder,
            secondary_style: None,
            specialties: Vec::new(),
            weaknesses: Vec::new(),
            market_popularity: PopularityTier::Low,
            is_rookie: false,
            is_team_leader: false,
            previous_team: None,
            races_with_current_team: 0,
            abilities: AbilityVector::default(),
        }
    }

    #[test]
    fn shares_relative_to_leader_current_season() {
        // Old seasons with more points must not count.
        let a = driver(&[(2023, 500.0), (2024, 50.0)]);
        let b = driver(&[(2024, 200.0)]);
        let rookie = driver(&[]);
        let shares = championship_shares(&[&a, &b, &rookie]);
        assert_relative_eq!(shares[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(shares[1], 1.0, epsilon = 1e-12);
        assert_eq!(shares[2], 0.0);
    }

    #[test]
    fn preseason_is_all_zero() {
        let a = driver(&[(2024, 0.0)]);
        let b = driver(&[]);
        assert_eq!(championship_shares(&[&a, &b]), vec![0.0, 0.0]);
    }
}
