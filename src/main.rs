use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use driver_pricing::config::Config;
use driver_pricing::engine::{snapshot_of, Budget, PriceSnapshot, PricingEngine};
use driver_pricing::{ingest, report};

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let (teams, drivers) = ingest::load_cohort(&config.cohort)?.into_parts();

    let previous = match &config.previous_prices {
        Some(path) => ingest::load_snapshot(path)?,
        None => {
            info!("No previous prices given; every driver starts at base price");
            PriceSnapshot::default()
        }
    };
    for name in previous.prices.keys() {
        if !drivers.iter().any(|d| &d.name == name) {
            warn!("Previous price for {:?} has no driver in the cohort", name);
        }
    }

    let budget = Budget::new(config.salary_cap, config.roster_size)?;
    let engine = PricingEngine::new(budget);
    let cohort = engine.run(&drivers, &teams, &previous)?;

    print!("{}", report::render_table(&cohort));
    if config.breakdown {
        for driver in &cohort {
            println!();
            print!("{}", report::render_breakdown(driver));
        }
    }

    let total: f64 = cohort.iter().map(|d| d.price).sum();
    info!(
        "Cohort total {:.2} against target {:.2}",
        total,
        budget.target_spend()
    );

    if let Some(path) = &config.output {
        ingest::save_snapshot(path, &snapshot_of(&cohort))?;
    }
    Ok(())
}
