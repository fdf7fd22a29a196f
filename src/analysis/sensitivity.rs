//! Discount-rate sensitivity
//!
//! Each variant is an independent re-run of the schedule builder with only the
//! discount rate changed, so variants fan out across threads.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::plan::ProjectionSettings;
use crate::projection::ScheduleBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One discount-rate variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityVariant {
    pub delta: f64,
    pub discount_rate: f64,
    pub total_present_value: f64,
    /// Change versus baseline in percent (2.5 = +2.5%)
    pub percent_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub baseline_discount_rate: f64,
    pub baseline_present_value: f64,
    /// In the order the deltas were given
    pub variants: Vec<SensitivityVariant>,
}

impl SensitivityReport {
    pub fn get(&self, delta: f64) -> Option<&SensitivityVariant> {
        self.variants.iter().find(|v| (v.delta - delta).abs() < 1e-12)
    }

    /// Lowest and highest present value across variants
    pub fn present_value_range(&self) -> Option<(f64, f64)> {
        let values = self.variants.iter().map(|v| v.total_present_value);
        let min = values.clone().reduce(f64::min)?;
        let max = values.reduce(f64::max)?;
        Some((min, max))
    }
}

/// Run sensitivity, computing the baseline present value first
pub fn run_sensitivity(
    settings: &ProjectionSettings,
    catalog: &Catalog,
    deltas: &[f64],
) -> Result<SensitivityReport> {
    let baseline = ScheduleBuilder::new(settings, catalog)
        .build_schedule()?
        .final_cumulative()
        .present_value;
    run_sensitivity_against(settings, catalog, deltas, baseline)
}

/// Run sensitivity against an already-known baseline present value
pub fn run_sensitivity_against(
    settings: &ProjectionSettings,
    catalog: &Catalog,
    deltas: &[f64],
    baseline_present_value: f64,
) -> Result<SensitivityReport> {
    let variants = deltas
        .par_iter()
        .map(|&delta| -> Result<SensitivityVariant> {
            let shifted = settings.with_discount_rate(settings.discount_rate + delta)?;
            let total_present_value = ScheduleBuilder::new(&shifted, catalog)
                .build_schedule()?
                .final_cumulative()
                .present_value;

            Ok(SensitivityVariant {
                delta,
                discount_rate: shifted.discount_rate,
                total_present_value,
                percent_change: percent_change(baseline_present_value, total_present_value),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::info!(
        "sensitivity: {} variants around discount rate {:.4}",
        variants.len(),
        settings.discount_rate
    );

    Ok(SensitivityReport {
        baseline_discount_rate: settings.discount_rate,
        baseline_present_value,
        variants,
    })
}

fn percent_change(baseline: f64, value: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (value - baseline) / baseline * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DEFAULT_SENSITIVITY_DELTAS;
    use crate::catalog::{Category, Item};
    use crate::projection::project;
    use crate::plan::Plan;

    fn plan(discount_rate: f64) -> Plan {
        let settings = ProjectionSettings::new(2025, 20.5, discount_rate).unwrap();
        let catalog = Catalog::new(vec![Category::new("Care", 0.03)
            .with_item(Item::recurring("Attendant", 25.0, 2000.0, 0.03, 2025, 2045).unwrap())
            .with_item(Item::discrete("Van", 60_000.0, 1.0, 0.025, [2026, 2036]).unwrap())])
        .unwrap();
        Plan::new("Sensitivity", settings, catalog)
    }

    #[test]
    fn test_zero_delta_matches_baseline_exactly() {
        let plan = plan(0.035);
        let baseline = project(&plan).unwrap().summary.total_present_value;
        let report = run_sensitivity(&plan.settings, &plan.catalog, &DEFAULT_SENSITIVITY_DELTAS).unwrap();

        assert_eq!(report.baseline_present_value, baseline);
        let zero = report.get(0.0).unwrap();
        assert_eq!(zero.total_present_value, baseline);
        assert_eq!(zero.percent_change, 0.0);
    }

    #[test]
    fn test_higher_rate_lowers_present_value() {
        let plan = plan(0.035);
        let report = run_sensitivity(&plan.settings, &plan.catalog, &DEFAULT_SENSITIVITY_DELTAS).unwrap();

        assert_eq!(report.variants.len(), 5);
        let pvs: Vec<f64> = report.variants.iter().map(|v| v.total_present_value).collect();
        assert!(pvs.windows(2).all(|w| w[0] > w[1]));
        assert!(report.get(-0.01).unwrap().percent_change > 0.0);
        assert!(report.get(0.01).unwrap().percent_change < 0.0);
        assert!((report.get(0.005).unwrap().discount_rate - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_negative_shifted_rate_allowed() {
        let plan = plan(0.0);
        let report = run_sensitivity(&plan.settings, &plan.catalog, &[-0.01]).unwrap();
        assert!(report.variants[0].total_present_value > report.baseline_present_value);
    }

    #[test]
    fn test_disabled_discounting_is_insensitive() {
        let mut plan = plan(0.035);
        plan.settings = plan.settings.without_discounting();
        let report = run_sensitivity(&plan.settings, &plan.catalog, &DEFAULT_SENSITIVITY_DELTAS).unwrap();
        assert!(report.variants.iter().all(|v| v.percent_change == 0.0));
    }

    #[test]
    fn test_present_value_range() {
        let plan = plan(0.035);
        let report = run_sensitivity(&plan.settings, &plan.catalog, &DEFAULT_SENSITIVITY_DELTAS).unwrap();
        let (low, high) = report.present_value_range().unwrap();
        assert_eq!(low, report.get(0.01).unwrap().total_present_value);
        assert_eq!(high, report.get(-0.01).unwrap().total_present_value);
    }
}
