//! Care Cost Projection CLI
//!
//! Command-line interface for projecting, validating and comparing care plans

use anyhow::{bail, Context, Result};
use care_cost_projection::analysis::{AnalysisConfig, DEFAULT_TOLERANCE};
use care_cost_projection::catalog::load_categories;
use care_cost_projection::plan::loader::DEFAULT_PLAN_PATH;
use care_cost_projection::plan::{load_plan_config, PlanConfig};
use care_cost_projection::projection::ProjectionResult;
use care_cost_projection::{Catalog, Category, Evaluee, Item, Plan, PlanReport, ProjectionSettings, ScenarioRunner, ScenarioSet};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "care_cost_projection", version, about = "Life care plan cost projection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a plan and print the summary, sensitivity and validation
    Calculate {
        #[arg(long, default_value = DEFAULT_PLAN_PATH)]
        plan: PathBuf,

        /// Replace the plan's categories with items from a CSV file
        #[arg(long)]
        items: Option<PathBuf>,

        /// Project this scenario instead of the baseline
        #[arg(long)]
        scenario: Option<String>,

        /// Write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the year-by-year schedule as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        #[arg(long)]
        no_sensitivity: bool,

        /// Dollar tolerance for reconciliation checks
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,
    },
    /// Check a plan file without projecting it
    Validate {
        #[arg(long, default_value = DEFAULT_PLAN_PATH)]
        plan: PathBuf,
    },
    /// Print an example plan file
    Example,
    /// Project every scenario in a plan file and compare to the baseline
    Compare {
        #[arg(long, default_value = DEFAULT_PLAN_PATH)]
        plan: PathBuf,

        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Calculate {
            plan,
            items,
            scenario,
            json,
            csv,
            no_sensitivity,
            tolerance,
        } => {
            let analysis = AnalysisConfig {
                tolerance,
                run_sensitivity: !no_sensitivity,
                ..AnalysisConfig::default()
            };
            calculate(&plan, items.as_deref(), scenario.as_deref(), json.as_deref(), csv.as_deref(), analysis)
        }
        Commands::Validate { plan } => validate_plan(&plan),
        Commands::Example => print_example(),
        Commands::Compare { plan, json } => compare(&plan, json.as_deref()),
    }
}

fn read_config(path: &Path) -> Result<PlanConfig> {
    load_plan_config(path).with_context(|| format!("failed to load plan: {}", path.display()))
}

fn calculate(
    plan_path: &Path,
    items: Option<&Path>,
    scenario: Option<&str>,
    json: Option<&Path>,
    csv: Option<&Path>,
    analysis: AnalysisConfig,
) -> Result<()> {
    let mut config = read_config(plan_path)?;
    if let Some(items) = items {
        config.categories =
            load_categories(items).with_context(|| format!("failed to load items: {}", items.display()))?;
    }

    let mut scenarios = ScenarioSet::from_config(&config).context("invalid plan")?;
    if let Some(name) = scenario {
        scenarios.set_active(name)?;
    }
    let active = scenarios.active();

    println!("Care Cost Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("{}\n", "=".repeat(30));
    println!("Plan: {} ({})", active.plan.name, active.name);
    if let Some(evaluee) = &active.plan.evaluee {
        println!("  Evaluee: {}, age {:.1}", evaluee.name, evaluee.current_age);
    }

    let report = ScenarioRunner::with_config(analysis).run(&active.plan)?;
    print_report(&report);

    if let Some(path) = csv {
        write_schedule_csv(&report.result, path)?;
        println!("\nSchedule written to {}", path.display());
    }
    if let Some(path) = json {
        write_json(&report, path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn print_report(report: &PlanReport) {
    let summary = &report.result.summary;

    println!("  Period: {}-{} ({} years, {} rows)", summary.first_year, summary.last_year, summary.projection_years, summary.row_count);
    if summary.discounting_enabled {
        println!("  Discount rate: {:.2}%", summary.discount_rate * 100.0);
    } else {
        println!("  Discounting: disabled");
    }
    println!();

    println!("{:<28} {:>6} {:>18} {:>18}", "Category", "Items", "Nominal", "Present Value");
    println!("{}", "-".repeat(73));
    for category in &report.result.categories {
        println!(
            "{:<28} {:>6} {:>18.2} {:>18.2}",
            category.name, category.item_count, category.total_nominal, category.total_present_value
        );
    }
    println!("{}", "-".repeat(73));
    println!("{:<28} {:>6} {:>18.2} {:>18.2}", "Total", "", summary.total_nominal, summary.total_present_value);
    println!("Average annual cost: ${:.2}", summary.average_annual_cost);

    if let Some(sensitivity) = &report.sensitivity {
        println!("\nDiscount Rate Sensitivity:");
        println!("{:>8} {:>10} {:>18} {:>10}", "Shift", "Rate", "Present Value", "Change");
        for variant in &sensitivity.variants {
            println!(
                "{:>+7.2}% {:>9.2}% {:>18.2} {:>+9.2}%",
                variant.delta * 100.0,
                variant.discount_rate * 100.0,
                variant.total_present_value,
                variant.percent_change
            );
        }
    }

    println!(
        "\nValidation: {}/{} checks passed",
        report.validation.passed_count(),
        report.validation.checks.len()
    );
    for check in report.validation.failures() {
        println!("  FAILED {}: {} (delta {:.6})", check.name, check.description, check.delta);
    }
}

fn write_schedule_csv(result: &ProjectionResult, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    let schedule = &result.schedule;

    let mut header = vec!["Year".to_string(), "YearsElapsed".to_string(), "Weight".to_string(), "Age".to_string()];
    header.extend(
        schedule
            .columns
            .iter()
            .map(|column| format!("{}: {}", schedule.categories[column.category], column.name)),
    );
    header.extend(
        ["TotalNominal", "TotalPresentValue", "CumulativeNominal", "CumulativePresentValue"].map(String::from),
    );
    writer.write_record(&header)?;

    for row in &schedule.rows {
        let mut record = vec![
            row.year.to_string(),
            row.years_elapsed.to_string(),
            format!("{:.4}", row.year_weight),
            row.age.map(|age| format!("{:.1}", age)).unwrap_or_default(),
        ];
        record.extend(row.item_costs.iter().map(|cost| format!("{:.2}", cost.nominal)));
        record.extend(
            [
                row.total_nominal,
                row.total_present_value,
                row.cumulative_nominal,
                row.cumulative_present_value,
            ]
            .map(|value| format!("{:.2}", value)),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

fn validate_plan(path: &Path) -> Result<()> {
    let config = read_config(path)?;
    let scenarios = ScenarioSet::from_config(&config).context("invalid plan")?;

    for scenario in scenarios.iter() {
        let plan = &scenario.plan;
        println!(
            "{}: {} categories, {} items, {}",
            scenario.name,
            plan.catalog.categories().len(),
            plan.catalog.item_count(),
            plan.settings.period_label()
        );
        for (category, item) in plan.zero_impact_items() {
            println!("  no years in horizon: {} / {}", category, item);
        }
        for overlap in plan.overlaps() {
            println!(
                "  overlap in {}: '{}' and '{}' share {} years",
                overlap.category,
                overlap.first,
                overlap.second,
                overlap.years.len()
            );
        }
    }

    println!("Plan is valid");
    Ok(())
}

fn print_example() -> Result<()> {
    let settings = ProjectionSettings::new(2025, 39.4, 0.035)?;
    let catalog = Catalog::new(vec![
        Category::new("Physician Evaluation", 0.032)
            .with_item(Item::recurring("Neurology", 444.33, 1.0, 0.032, 2025, 2064)?),
        Category::new("Medications", 0.016)
            .with_item(Item::recurring("Gabapentin", 277.40, 12.0, 0.016, 2025, 2064)?),
        Category::new("Surgeries", 0.035)
            .with_item(Item::discrete("Shoulder Arthroscopy", 130600.45, 1.0, 0.035, [2030, 2045])?),
    ])?;
    let plan = Plan::new("Example Plan", settings, catalog).with_evaluee(Evaluee::new("Jane Doe", 37.8)?);

    println!("{}", serde_json::to_string_pretty(&plan.to_config())?);
    Ok(())
}

fn compare(path: &Path, json: Option<&Path>) -> Result<()> {
    let config = read_config(path)?;
    let scenarios = ScenarioSet::from_config(&config).context("invalid plan")?;
    if scenarios.len() < 2 {
        bail!("plan '{}' has no scenarios to compare", config.name);
    }

    let comparison = ScenarioRunner::new().compare(&scenarios)?;

    println!("{:<24} {:>6} {:>7} {:>7} {:>18} {:>18} {:>9}", "Scenario", "Items", "Years", "Rate", "Nominal", "Present Value", "Change");
    println!("{}", "-".repeat(95));
    for row in &comparison {
        println!(
            "{:<24} {:>6} {:>7.2} {:>6.2}% {:>18.2} {:>18.2} {:>+8.2}%",
            row.name,
            row.item_count,
            row.projection_years,
            row.discount_rate * 100.0,
            row.total_nominal,
            row.total_present_value,
            row.percent_change
        );
    }

    if let Some(path) = json {
        write_json(&comparison, path)?;
        println!("\nComparison written to {}", path.display());
    }
    Ok(())
}
