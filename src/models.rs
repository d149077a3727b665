use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use tracing::warn;

/// One race a driver entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    #[serde(default)]
    pub race_name: String,
    /// Round number within the season (1-based)
    pub race_number: u32,
    /// Grid slot
    pub start_position: u32,
    pub finish_position: u32,
    pub points: f64,
    #[serde(default)]
    pub fastest_lap: bool,
    #[serde(default)]
    pub dnf: bool,
    /// Completed more than 90% of race distance; no default
    pub classified: bool,
}

impl RaceResult {
    /// Places gained from grid to flag; negative when places were lost.
    pub fn gain(&self) -> f64 {
        self.start_position as f64 - self.finish_position as f64
    }
}

/// Aggregate counters for one driver season plus the races behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub year: i32,
    pub team: String,
    pub points: f64,
    pub wins: u32,
    pub podiums: u32,
    pub races: u32,
    pub point_finishes: u32,
    pub dnfs: u32,
    /// Constructor's total points that season
    pub team_points: f64,
    /// Constructor's championship position that season
    pub team_position: u32,
    pub teammate_points: f64,
    /// Insertion order is irrelevant; windows reorder by race number.
    #[serde(default)]
    pub results: Vec<RaceResult>,
}

/// A team's finished season, used for momentum and ceiling history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonSummary {
    pub year: i32,
    pub position: u32,
    pub points: f64,
    pub wins: u32,
    pub podiums: u32,
    pub races: u32,
}

/// Publicly known spending bracket of a constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BudgetTier {
    Top,
    UpperMid,
    LowerMid,
    Backmarker,
    /// Anything the ingestion layer could not match; kept for diagnostics.
    Unrecognized(String),
}

impl From<String> for BudgetTier {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "top" => BudgetTier::Top,
            "upper-mid" | "uppermid" | "upper_mid" => BudgetTier::UpperMid,
            "lower-mid" | "lowermid" | "lower_mid" => BudgetTier::LowerMid,
            "backmarker" => BudgetTier::Backmarker,
            _ => BudgetTier::Unrecognized(s),
        }
    }
}

impl From<BudgetTier> for String {
    fn from(t: BudgetTier) -> Self {
        t.to_string()
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetTier::Top => f.write_str("Top"),
            BudgetTier::UpperMid => f.write_str("Upper-Mid"),
            BudgetTier::LowerMid => f.write_str("Lower-Mid"),
            BudgetTier::Backmarker => f.write_str("Backmarker"),
            BudgetTier::Unrecognized(s) => f.write_str(s),
        }
    }
}

/// Everything observable about a constructor for the current pass.
///
/// Owned by the team index and read by reference from every driver on the
/// team, so all of them see the same team-level numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub name: String,
    /// Engine supplier, e.g. "Mercedes"
    pub power_unit: String,
    pub position: u32,
    pub points: f64,
    pub budget_tier: BudgetTier,
    pub wins: u32,
    pub podiums: u32,
    pub dnfs: u32,
    /// Races run so far this season
    pub races_run: u32,
    /// Races scheduled this season
    pub total_races: u32,
    /// Upgrades introduced in roughly the last three races
    #[serde(default)]
    pub recent_upgrades: bool,
    #[serde(default)]
    pub recent_race_positions: Vec<f64>,
    #[serde(default)]
    pub recent_qualifying_positions: Vec<f64>,
    /// Prior seasons, any order
    #[serde(default)]
    pub history: Vec<TeamSeasonSummary>,
}

impl TeamSnapshot {
    /// Prior seasons, most recent first. Stable for equal years.
    pub fn history_by_recency(&self) -> Vec<&TeamSeasonSummary> {
        let mut out: Vec<&TeamSeasonSummary> = self.history.iter().collect();
        out.sort_by(|a, b| b.year.cmp(&a.year));
        out
    }
}

// ── Driver style ─────────────────────────────────────────────────────────────

/// Declared racing archetype.
///
/// The first six are the archetypes drivers are classified into; the
/// remaining named ones exist in the style-bump table and are accepted when
/// declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DriverStyle {
    Aggressive,
    Smooth,
    Defensive,
    Overtaker,
    AllRounder,
    Rookie,
    QualiAce,
    TyreWhisperer,
    RainMaster,
    EngineersDriver,
    Unrecognized(String),
}

impl DriverStyle {
    pub fn name(&self) -> &str {
        match self {
            DriverStyle::Aggressive => "Aggressive",
            DriverStyle::Smooth => "Smooth",
            DriverStyle::Defensive => "Defensive",
            DriverStyle::Overtaker => "Overtaker",
            DriverStyle::AllRounder => "All-Rounder",
            DriverStyle::Rookie => "Rookie",
            DriverStyle::QualiAce => "Quali-Ace",
            DriverStyle::TyreWhisperer => "Tyre-Whisperer",
            DriverStyle::RainMaster => "Rain-Master",
            DriverStyle::EngineersDriver => "Engineer's Driver",
            DriverStyle::Unrecognized(s) => s,
        }
    }
}

impl From<String> for DriverStyle {
    fn from(s: String) -> Self {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "aggressive" => DriverStyle::Aggressive,
            "smooth" => DriverStyle::Smooth,
            "defensive" => DriverStyle::Defensive,
            "overtaker" => DriverStyle::Overtaker,
            "allrounder" => DriverStyle::AllRounder,
            "rookie" => DriverStyle::Rookie,
            "qualiace" => DriverStyle::QualiAce,
            "tyrewhisperer" | "tirewhisperer" => DriverStyle::TyreWhisperer,
            "rainmaster" => DriverStyle::RainMaster,
            "engineersdriver" => DriverStyle::EngineersDriver,
            _ => DriverStyle::Unrecognized(s),
        }
    }
}

impl From<DriverStyle> for String {
    fn from(s: DriverStyle) -> Self {
        s.name().to_string()
    }
}

/// Declared market popularity of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PopularityTier {
    High,
    #[default]
    Medium,
    Low,
}

// ── Abilities ────────────────────────────────────────────────────────────────

/// The twelve technical-ability slots of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ability {
    WetWeather,
    TireManagement,
    BrakingStability,
    TechnicalCorners,
    RaceStart,
    QualifyingPace,
    SetupAdaptability,
    OvertakingSkill,
    RaceConsistency,
    ErsManagement,
    FuelSaving,
    SafetyCarRestart,
}

impl Ability {
    pub const COUNT: usize = 12;

    pub const ALL: [Ability; Ability::COUNT] = [
        Ability::WetWeather,
        Ability::TireManagement,
        Ability::BrakingStability,
        Ability::TechnicalCorners,
        Ability::RaceStart,
        Ability::QualifyingPace,
        Ability::SetupAdaptability,
        Ability::OvertakingSkill,
        Ability::RaceConsistency,
        Ability::ErsManagement,
        Ability::FuelSaving,
        Ability::SafetyCarRestart,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Ability::WetWeather => "WetWeather",
            Ability::TireManagement => "TireManagement",
            Ability::BrakingStability => "BrakingStability",
            Ability::TechnicalCorners => "TechnicalCorners",
            Ability::RaceStart => "RaceStart",
            Ability::QualifyingPace => "QualifyingPace",
            Ability::SetupAdaptability => "SetupAdaptability",
            Ability::OvertakingSkill => "OvertakingSkill",
            Ability::RaceConsistency => "RaceConsistency",
            Ability::ErsManagement => "ERSManagement",
            Ability::FuelSaving => "FuelSaving",
            Ability::SafetyCarRestart => "SafetyCarRestart",
        }
    }

    /// Case, space, dash and underscore insensitive lookup.
    pub fn from_name(name: &str) -> Option<Ability> {
        let key = normalize_key(name);
        Ability::ALL
            .iter()
            .copied()
            .find(|a| normalize_key(a.name()) == key)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Value given to any ability slot the input does not supply.
pub const DEFAULT_ABILITY: f64 = 0.7;

/// Twelve ability scalars, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct AbilityVector([f64; Ability::COUNT]);

impl AbilityVector {
    pub fn uniform(value: f64) -> Self {
        AbilityVector([value.clamp(0.0, 1.0); Ability::COUNT])
    }

    pub fn with(mut self, ability: Ability, value: f64) -> Self {
        self.0[ability.index()] = value.clamp(0.0, 1.0);
        self
    }

}

impl Default for AbilityVector {
    fn default() -> Self {
        AbilityVector::uniform(DEFAULT_ABILITY)
    }
}

impl Index<Ability> for AbilityVector {
    type Output = f64;

    fn index(&self, ability: Ability) -> &f64 {
        &self.0[ability.index()]
    }
}

impl From<BTreeMap<String, f64>> for AbilityVector {
    fn from(map: BTreeMap<String, f64>) -> Self {
        let mut out = AbilityVector::default();
        for (name, value) in map {
            match Ability::from_name(&name) {
                Some(ability) => {
                    if !(0.0..=1.0).contains(&value) {
                        warn!("Ability {} = {} outside [0, 1]; clamping", name, value);
                    }
                    out = out.with(ability, value);
                }
                None => warn!("Ignoring unknown ability {:?}", name),
            }
        }
        out
    }
}

impl From<AbilityVector> for BTreeMap<String, f64> {
    fn from(v: AbilityVector) -> Self {
        Ability::ALL
            .iter()
            .map(|a| (a.name().to_string(), v[*a]))
            .collect()
    }
}

// ── Driver ───────────────────────────────────────────────────────────────────

/// Everything the ingestion layer knows about one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRecord {
    pub name: String,
    /// Current team; resolved through the team index
    pub team: String,
    pub age: u32,
    #[serde(default)]
    pub championship_wins: u32,
    #[serde(default)]
    pub career_podiums: u32,
    #[serde(default)]
    pub career_starts: u32,
    /// One record per year, any order
    #[serde(default)]
    pub seasons: Vec<SeasonRecord>,
    pub primary_style: DriverStyle,
    #[serde(default)]
    pub secondary_style: Option<DriverStyle>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub market_popularity: PopularityTier,
    #[serde(default)]
    pub is_rookie: bool,
    #[serde(default)]
    pub is_team_leader: bool,
    #[serde(default)]
    pub previous_team: Option<String>,
    #[serde(default)]
    pub races_with_current_team: u32,
    #[serde(default)]
    pub abilities: AbilityVector,
}

impl DriverRecord {
    /// Seasons sorted by year, most recent first.
    ///
    /// Equal years keep their insertion order, so repeated calls always agree.
    pub fn seasons_by_recency(&self) -> Vec<&SeasonRecord> {
        let mut out: Vec<&SeasonRecord> = self.seasons.iter().collect();
        out.sort_by(|a, b| b.year.cmp(&a.year));
        out
    }

    /// The current season, if the driver has any season data.
    pub fn latest_season(&self) -> Option<&SeasonRecord> {
        self.seasons_by_recency().into_iter().next()
    }
}
