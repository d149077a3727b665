//! Cross-sectional normalisation.
//!
//! Every metric family goes through the same reducer: collect the raw value
//! of each cohort member, take the population mean and standard deviation,
//! then map each value back to a z-score. What differs per family (clamp
//! bound, early-season damping) is carried as a [`ZPolicy`], never as a
//! separate loop.

use tracing::debug;

use crate::error::EngineError;

/// Number of live-window races at which a z-score carries full weight.
pub const FULL_WINDOW: usize = 5;

/// Population mean and standard deviation of one metric over the cohort.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohortStats {
    pub mean: f64,
    pub std: f64,
}

impl CohortStats {
    /// Population statistics (N denominator) of `values`.
    pub fn of(values: &[f64]) -> Result<Self, EngineError> {
        if values.is_empty() {
            return Err(EngineError::EmptyCohort);
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Ok(CohortStats {
            mean,
            std: variance.sqrt(),
        })
    }

    /// Unbounded z-score; 0 whenever the cohort has no spread.
    pub fn z(&self, value: f64) -> f64 {
        if self.std == 0.0 {
            return 0.0;
        }
        (value - self.mean) / self.std
    }
}

/// How a family's z-scores are bounded and damped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZPolicy {
    /// Symmetric bound applied after standardising, if any.
    pub clamp: Option<f64>,
    /// Scale by `window_rows / 5` after clamping.
    pub damped: bool,
}

impl ZPolicy {
    /// Season roll-ups, team continuous metrics, championship share.
    pub const CLAMPED: ZPolicy = ZPolicy {
        clamp: Some(3.0),
        damped: false,
    };
    /// Live-window families.
    pub const LIVE: ZPolicy = ZPolicy {
        clamp: Some(3.0),
        damped: true,
    };
    /// Position gain: left unbounded so in-season surges survive.
    pub const LIVE_UNCLAMPED: ZPolicy = ZPolicy {
        clamp: None,
        damped: true,
    };
    /// Categorical tiers and DNA variance.
    pub const UNCLAMPED: ZPolicy = ZPolicy {
        clamp: None,
        damped: false,
    };
    /// Ability slots feeding the DNA vector.
    pub const ABILITY: ZPolicy = ZPolicy {
        clamp: Some(2.0),
        damped: false,
    };

    pub fn apply(&self, stats: &CohortStats, value: f64, window_rows: usize) -> f64 {
        let mut z = stats.z(value);
        if let Some(bound) = self.clamp {
            z = z.clamp(-bound, bound);
        }
        if self.damped {
            z *= window_rows.min(FULL_WINDOW) as f64 / FULL_WINDOW as f64;
        }
        z
    }
}

/// Cohort members that may carry a live-window row count.
pub trait WindowRows {
    fn window_rows(&self) -> usize;
}

/// A named metric family: where its raw value lives, where its z-score goes,
/// and which policy applies.
pub struct MetricFamily<T> {
    pub name: &'static str,
    pub policy: ZPolicy,
    pub raw: fn(&T) -> f64,
    pub store: fn(&mut T, f64),
}

/// Standardise a plain slice under `policy` with no damping.
pub fn z_scores(values: &[f64], policy: ZPolicy) -> Result<Vec<f64>, EngineError> {
    let stats = CohortStats::of(values)?;
    Ok(values
        .iter()
        .map(|v| policy.apply(&stats, *v, FULL_WINDOW))
        .collect())
}

/// Run one family over the whole cohort and write each member's z-score back.
pub fn normalize_family<T: WindowRows>(
    cohort: &mut [T],
    family: &MetricFamily<T>,
) -> Result<CohortStats, EngineError> {
    let raw: Vec<f64> = cohort.iter().map(family.raw).collect();
    let stats = CohortStats::of(&raw)?;
    for (member, value) in cohort.iter_mut().zip(raw) {
        let rows = member.window_rows();
        (family.store)(member, family.policy.apply(&stats, value, rows));
    }
    debug!(
        "Normalised {}: mean={:.4} std={:.4}",
        family.name, stats.mean, stats.std
    );
    Ok(stats)
}

/// Run a table of families in order.
pub fn normalize_families<T: WindowRows>(
    cohort: &mut [T],
    families: &[MetricFamily<T>],
) -> Result<(), EngineError> {
    for family in families {
        normalize_family(cohort, family)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug, Default)]
    struct Row {
        value: f64,
        rows: usize,
        z: f64,
    }

    impl WindowRows for Row {
        fn window_rows(&self) -> usize {
            self.rows
        }
    }

    fn family(policy: ZPolicy) -> MetricFamily<Row> {
        MetricFamily {
            name: "test",
            policy,
            raw: |r| r.value,
            store: |r, z| r.z = z,
        }
    }

    #[test]
    fn population_std_is_used() {
        let stats = CohortStats::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(stats.mean, 5.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_cohort_is_fatal() {
        assert_eq!(CohortStats::of(&[]), Err(EngineError::EmptyCohort));
    }

    #[test]
    fn flat_cohort_yields_zero() {
        let z = z_scores(&[3.0, 3.0, 3.0], ZPolicy::UNCLAMPED).unwrap();
        assert!(z.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn standardised_family_has_zero_mean_unit_std() {
        let values = [1.0, 4.0, 6.0, 9.0, 15.0];
        let z = z_scores(&values, ZPolicy::UNCLAMPED).unwrap();
        let stats = CohortStats::of(&z).unwrap();
        assert_relative_eq!(stats.mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn clamped_family_respects_bound() {
        // One extreme outlier among many identical values pushes its raw z past 3.
        let mut values = vec![0.0; 20];
        values.push(100.0);
        let clamped = z_scores(&values, ZPolicy::CLAMPED).unwrap();
        let free = z_scores(&values, ZPolicy::UNCLAMPED).unwrap();
        assert!(free[20] > 3.0);
        assert_relative_eq!(clamped[20], 3.0, epsilon = 1e-12);
        let ability = z_scores(&values, ZPolicy::ABILITY).unwrap();
        assert_relative_eq!(ability[20], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn live_family_is_damped_by_window_rows() {
        let mut cohort = vec![
            Row { value: 0.0, rows: 5, ..Default::default() },
            Row { value: 10.0, rows: 2, ..Default::default() },
        ];
        normalize_family(&mut cohort, &family(ZPolicy::LIVE)).unwrap();
        assert_relative_eq!(cohort[0].z, -1.0, epsilon = 1e-12);
        assert_relative_eq!(cohort[1].z, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn unclamped_live_family_can_exceed_three() {
        let mut cohort: Vec<Row> = (0..20)
            .map(|_| Row { value: 0.0, rows: 5, ..Default::default() })
            .collect();
        cohort.push(Row { value: 50.0, rows: 5, ..Default::default() });
        normalize_family(&mut cohort, &family(ZPolicy::LIVE_UNCLAMPED)).unwrap();
        assert!(cohort[20].z > 3.0);
    }
}
