//! Truncation error across projection horizons
//!
//! Projects one plan over several horizon lengths and reports how much cost a
//! whole-year horizon drops compared to the fractional one.
//!
//! Usage: horizon_analysis [PLAN_JSON] [YEARS...]
//! Without arguments, runs the five-item regression catalog over 39.0, 39.4 and 40.0 years.

use anyhow::{Context, Result};
use care_cost_projection::plan::load_plan_config;
use care_cost_projection::{Catalog, Category, Item, Plan, ProjectionSettings, ScenarioRunner};
use std::time::Instant;

const DEFAULT_HORIZONS: [f64; 3] = [39.0, 39.4, 40.0];

fn regression_plan() -> Result<Plan> {
    // Undiscounted so present value and nominal agree
    let settings = ProjectionSettings::new(2025, 39.4, 0.0)?;
    let catalog = Catalog::new(vec![
        Category::new("Physician Evaluation", 0.032)
            .with_item(Item::recurring("Neurology Evaluation", 444.33, 1.0, 0.032, 2025, 2064)?),
        Category::new("Diagnostics", 0.030)
            .with_item(Item::recurring("MRI", 1852.03, 1.0, 0.030, 2025, 2064)?),
        Category::new("Therapies", 0.028)
            .with_item(Item::recurring("Physical Therapy", 17908.88, 1.0, 0.028, 2025, 2064)?),
        Category::new("Medications", 0.016)
            .with_item(Item::recurring("Gabapentin", 277.40, 12.0, 0.016, 2025, 2064)?),
        Category::new("Surgeries", 0.035)
            .with_item(Item::recurring("Shoulder Arthroscopy", 130600.45, 1.0, 0.035, 2025, 2064)?),
    ])?;
    Ok(Plan::new("Regression Catalog", settings, catalog))
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let plan = match args.first() {
        Some(path) => {
            let config = load_plan_config(path).with_context(|| format!("failed to load plan: {}", path))?;
            Plan::from_config(&config).context("invalid plan")?
        }
        None => regression_plan()?,
    };

    let horizons: Vec<f64> = if args.len() > 1 {
        args[1..]
            .iter()
            .map(|arg| arg.parse::<f64>().with_context(|| format!("invalid horizon '{}'", arg)))
            .collect::<Result<_>>()?
    } else {
        DEFAULT_HORIZONS.to_vec()
    };

    println!("Horizon analysis: {}", plan.name);
    println!("  Base year: {}, {} categories, {} items", plan.settings.base_year, plan.catalog.categories().len(), plan.catalog.item_count());
    println!();

    let start = Instant::now();
    let results = ScenarioRunner::new().horizons(&plan, &horizons)?;

    println!("{:>8} {:>10} {:>18} {:>18} {:>16} {:>9}", "Years", "Last Year", "Nominal", "Present Value", "vs First", "Change");
    println!("{}", "-".repeat(84));
    for result in &results {
        println!(
            "{:>8.2} {:>10} {:>18.2} {:>18.2} {:>16.2} {:>+8.3}%",
            result.projection_years,
            result.last_year,
            result.total_nominal,
            result.total_present_value,
            result.nominal_change,
            result.percent_change
        );
    }

    println!("\nCompleted {} horizons in {:?}", results.len(), start.elapsed());
    Ok(())
}
