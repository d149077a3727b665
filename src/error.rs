use thiserror::Error;

/// Conditions under which a pricing pass cannot produce a defined result.
///
/// Every other numeric edge case (flat cohort, rookie without seasons,
/// zero denominators) resolves to a documented default instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Cross-sectional statistics are undefined over an empty cohort.
    #[error("cohort is empty; at least one driver is required")]
    EmptyCohort,

    #[error("salary cap must be a positive finite number, got {0}")]
    InvalidSalaryCap(f64),

    #[error("roster size must be at least 1, got {0}")]
    InvalidRosterSize(u32),

    /// A driver points at a team the team index does not contain.
    #[error("driver {driver} references unknown team {team}")]
    UnknownTeam { driver: String, team: String },
}
