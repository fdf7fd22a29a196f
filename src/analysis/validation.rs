//! Cross-footing checks on a finished projection
//!
//! Every check runs independently. A failed check is reported and logged,
//! never raised: the schedule stays usable and is flagged for review.

use crate::plan::ProjectionSettings;
use crate::projection::ProjectionResult;
use serde::{Deserialize, Serialize};

/// Tolerance for comparing fractional year weights
const WEIGHT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub name: String,
    pub description: String,
    pub passed: bool,
    /// Largest observed absolute difference
    pub delta: f64,
    pub tolerance: f64,
}

impl ValidationCheck {
    fn new(name: &str, description: &str, delta: f64, tolerance: f64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            passed: delta.is_finite() && delta < tolerance,
            delta,
            tolerance,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn get(&self, name: &str) -> Option<&ValidationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Run all reconciliation checks against `result`
pub fn validate(result: &ProjectionResult, settings: &ProjectionSettings, tolerance: f64) -> ValidationReport {
    let report = ValidationReport {
        checks: vec![
            category_totals(result, tolerance),
            average_annual_cost(result, settings, tolerance),
            cumulative_totals(result, tolerance),
            grand_total(result, tolerance),
            terminal_weight(result, settings),
        ],
    };

    for failure in report.failures() {
        log::warn!(
            "'{}' validation failed: {} (delta {:.6}, tolerance {})",
            result.plan_name,
            failure.description,
            failure.delta,
            failure.tolerance
        );
    }

    report
}

/// 1. Category totals sum to the grand total
fn category_totals(result: &ProjectionResult, tolerance: f64) -> ValidationCheck {
    let nominal: f64 = result.categories.iter().map(|c| c.total_nominal).sum();
    let present_value: f64 = result.categories.iter().map(|c| c.total_present_value).sum();
    let delta = (nominal - result.summary.total_nominal)
        .abs()
        .max((present_value - result.summary.total_present_value).abs());

    ValidationCheck::new(
        "category_totals",
        "sum of category totals equals grand total (nominal and present value)",
        delta,
        tolerance,
    )
}

/// 2. Average annual cost recomputed from rows
fn average_annual_cost(result: &ProjectionResult, settings: &ProjectionSettings, tolerance: f64) -> ValidationCheck {
    let recomputed = result.schedule.sum_of_row_totals().nominal / settings.projection_years;
    let delta = (recomputed - result.summary.average_annual_cost).abs();

    ValidationCheck::new(
        "average_annual_cost",
        "average annual cost recomputed from the schedule matches the summary",
        delta,
        tolerance,
    )
}

/// 3. Running totals equal the sum of rows so far and never decrease
fn cumulative_totals(result: &ProjectionResult, tolerance: f64) -> ValidationCheck {
    let mut running_nominal = 0.0;
    let mut running_pv = 0.0;
    let mut delta: f64 = 0.0;
    let mut previous: Option<(f64, f64)> = None;

    for row in &result.schedule.rows {
        running_nominal += row.total_nominal;
        running_pv += row.total_present_value;
        delta = delta
            .max((row.cumulative_nominal - running_nominal).abs())
            .max((row.cumulative_present_value - running_pv).abs());

        if let Some((prior_nominal, prior_pv)) = previous {
            // A decrease is only possible with negative costs; count it fully
            let drop = (prior_nominal - row.cumulative_nominal).max(prior_pv - row.cumulative_present_value);
            if drop > 0.0 {
                delta = delta.max(drop.max(tolerance));
            }
        }
        previous = Some((row.cumulative_nominal, row.cumulative_present_value));
    }

    ValidationCheck::new(
        "cumulative_totals",
        "each row's cumulative total equals the running sum of row totals and is non-decreasing",
        delta,
        tolerance,
    )
}

/// 4. Sum of all row totals equals the summary totals
fn grand_total(result: &ProjectionResult, tolerance: f64) -> ValidationCheck {
    let sum = result.schedule.sum_of_row_totals();
    let delta = (sum.nominal - result.summary.total_nominal)
        .abs()
        .max((sum.present_value - result.summary.total_present_value).abs());

    ValidationCheck::new(
        "grand_total",
        "sum of row totals equals the summary total (nominal and present value)",
        delta,
        tolerance,
    )
}

/// 5. Terminal row weight equals the horizon's fractional remainder
fn terminal_weight(result: &ProjectionResult, settings: &ProjectionSettings) -> ValidationCheck {
    let full_rows = result
        .schedule
        .rows
        .iter()
        .filter(|r| r.year_weight >= 1.0)
        .count();
    let declared = settings.projection_years - full_rows as f64;
    let observed = result
        .schedule
        .terminal_partial_row()
        .map(|r| r.year_weight)
        .unwrap_or(0.0);

    ValidationCheck::new(
        "terminal_weight",
        "terminal row weight matches the fractional part of projection_years",
        (declared - observed).abs(),
        WEIGHT_TOLERANCE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DEFAULT_TOLERANCE;
    use crate::catalog::{Catalog, Category, Item};
    use crate::plan::Plan;
    use crate::projection::project;

    fn plan(projection_years: f64) -> Plan {
        let settings = ProjectionSettings::new(2025, projection_years, 0.035).unwrap();
        let catalog = Catalog::new(vec![
            Category::new("Medications", 0.016)
                .with_item(Item::recurring("Gabapentin", 277.40, 12.0, 0.016, 2025, 2064).unwrap()),
            Category::new("Surgeries", 0.035)
                .with_item(Item::discrete("Arthroscopy", 130_600.45, 1.0, 0.035, [2030, 2045]).unwrap())
                .with_item(Item::one_time("Revision", 50_000.0, 0.035, 2064).unwrap()),
        ])
        .unwrap();
        Plan::new("Validation", settings, catalog)
    }

    #[test]
    fn test_clean_projection_passes_all_checks() {
        for years in [1.0, 0.5, 39.0, 39.4, 39.999] {
            let plan = plan(years);
            let result = project(&plan).unwrap();
            let report = validate(&result, &plan.settings, DEFAULT_TOLERANCE);
            assert_eq!(report.checks.len(), 5);
            assert!(report.all_passed(), "failures for {}: {:?}", years, report.failures().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_tampered_summary_flagged_not_fatal() {
        let plan = plan(39.4);
        let mut result = project(&plan).unwrap();
        result.summary.total_nominal += 5.0;
        result.summary.average_annual_cost += 5.0;

        let report = validate(&result, &plan.settings, DEFAULT_TOLERANCE);
        assert!(!report.get("category_totals").unwrap().passed);
        assert!(!report.get("average_annual_cost").unwrap().passed);
        assert!(!report.get("grand_total").unwrap().passed);
        assert!(report.get("cumulative_totals").unwrap().passed);
        assert!(report.get("terminal_weight").unwrap().passed);
        assert_eq!(report.passed_count(), 2);
        assert!((report.get("grand_total").unwrap().delta - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_broken_running_total_flagged() {
        let plan = plan(10.0);
        let mut result = project(&plan).unwrap();
        result.schedule.rows[3].cumulative_nominal -= 100.0;

        let report = validate(&result, &plan.settings, DEFAULT_TOLERANCE);
        let check = report.get("cumulative_totals").unwrap();
        assert!(!check.passed);
        assert!(check.delta > 99.0);
    }

    #[test]
    fn test_dropped_terminal_row_flagged() {
        let plan = plan(39.4);
        let mut result = project(&plan).unwrap();
        result.schedule.rows.pop();

        let report = validate(&result, &plan.settings, DEFAULT_TOLERANCE);
        let check = report.get("terminal_weight").unwrap();
        assert!(!check.passed);
        assert!((check.delta - 0.4).abs() < 1e-9);
    }
}
