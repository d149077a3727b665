use clap::Parser;
use std::path::PathBuf;

/// Fantasy driver pricing from cohort statistics
#[derive(Parser, Debug, Clone)]
#[command(name = "driver-pricing", version, about)]
pub struct Config {
    /// Cohort JSON file with teams and drivers
    #[arg(long, env = "COHORT_PATH")]
    pub cohort: PathBuf,

    /// Price snapshot from the previous run (omit for a cold start)
    #[arg(long, env = "PREVIOUS_PRICES_PATH")]
    pub previous_prices: Option<PathBuf>,

    /// Salary cap for one fantasy roster
    #[arg(long, env = "SALARY_CAP", default_value = "50.0")]
    pub salary_cap: f64,

    /// Drivers per fantasy roster
    #[arg(long, env = "ROSTER_SIZE", default_value = "2")]
    pub roster_size: u32,

    /// Where to write the new price snapshot
    #[arg(long, env = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Print the per-driver score breakdown
    #[arg(long, env = "SHOW_BREAKDOWN", default_value = "false")]
    pub breakdown: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.salary_cap.is_finite() || self.salary_cap <= 0.0 {
            anyhow::bail!("salary_cap must be a positive number");
        }
        if self.roster_size == 0 {
            anyhow::bail!("roster_size must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("driver-pricing").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&["--cohort", "cohort.json"]);
        assert_eq!(config.salary_cap, 50.0);
        assert_eq!(config.roster_size, 2);
        assert!(!config.breakdown);
        assert!(config.previous_prices.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_budget() {
        let config = parse(&["--cohort", "c.json", "--salary-cap", "0"]);
        assert!(config.validate().is_err());
        let config = parse(&["--cohort", "c.json", "--roster-size", "0"]);
        assert!(config.validate().is_err());
    }
}
