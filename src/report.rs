//! Plain-text rendering of a priced cohort.

use std::fmt::Write;

use crate::engine::ScoredDriver;

/// Cohort table, most expensive first.
pub fn render_table(cohort: &[ScoredDriver]) -> String {
    let mut ranked: Vec<&ScoredDriver> = cohort.iter().collect();
    ranked.sort_by(|a, b| b.price.total_cmp(&a.price).then_with(|| a.name.cmp(&b.name)));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<24} {:<18} {:>8} {:>8} {:>7} {:>7} {:>7} {:>7}",
        "#", "Driver", "Team", "Raw", "Strength", "Scaled", "Base", "Price", "Δ"
    );
    for (rank, d) in ranked.iter().enumerate() {
        let delta = if d.previous_price == 0.0 {
            "new".to_string()
        } else {
            format!("{:+.2}", d.price - d.previous_price)
        };
        let _ = writeln!(
            out,
            "{:>3}  {:<24} {:<18} {:>8.4} {:>8.4} {:>7.3} {:>7.2} {:>7.2} {:>7}",
            rank + 1,
            d.name,
            d.team,
            d.raw_score,
            d.strength,
            d.scaled_strength,
            d.base_price,
            d.price,
            delta
        );
    }
    out
}

/// Every breakdown entry of one driver, largest score contributions first.
pub fn render_breakdown(driver: &ScoredDriver) -> String {
    const PRICING: [&str; 6] = ["band_min", "band_max", "base_price", "elasticity", "previous_price", "price"];

    let mut components: Vec<(&String, &f64)> = driver
        .breakdown
        .iter()
        .filter(|(k, _)| !PRICING.contains(&k.as_str()))
        .collect();
    components.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()).then_with(|| a.0.cmp(b.0)));

    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", driver.name, driver.team);
    for (name, value) in components {
        let _ = writeln!(out, "  {:<22} {:>+9.4}", name, value);
    }
    let _ = writeln!(out, "  {:<22} {:>+9.4}", "= raw score", driver.raw_score);
    for key in PRICING {
        if let Some(value) = driver.breakdown.get(key) {
            let _ = writeln!(out, "  {:<22} {:>9.4}", key, value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(name: &str, price: f64, previous: f64) -> ScoredDriver {
        let mut d = ScoredDriver::new(name, "Team");
        d.price = price;
        d.base_price = price;
        d.previous_price = previous;
        d
    }

    #[test]
    fn table_ranks_by_price() {
        let table = render_table(&[driver("Cheap", 10.0, 0.0), driver("Dear", 30.0, 28.0)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("Dear"));
        assert!(lines[1].contains("+2.00"));
        assert!(lines[2].contains("Cheap"));
        assert!(lines[2].contains("new"));
    }

    #[test]
    fn breakdown_lists_components_then_pricing() {
        let mut d = driver("Ace", 20.0, 0.0);
        d.raw_score = 0.3;
        d.breakdown.insert("bias".into(), 0.15);
        d.breakdown.insert("recent_form".into(), 0.2);
        d.breakdown.insert("volatility".into(), -0.05);
        d.breakdown.insert("price".into(), 20.0);
        let text = render_breakdown(&d);
        let form = text.find("recent_form").unwrap();
        let bias = text.find("bias").unwrap();
        let price = text.find("price").unwrap();
        assert!(form < bias);
        assert!(bias < price);
        assert!(text.contains("= raw score"));
    }
}
