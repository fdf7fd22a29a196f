//! Scenarios and batch runs
//!
//! A `ScenarioSet` holds the baseline plan plus any number of named variants.
//! `ScenarioRunner` projects them, adds the analysis pass, and compares them.

use crate::analysis::{run_sensitivity_against, validate, AnalysisConfig, SensitivityReport, ValidationReport};
use crate::error::{ConfigurationError, Result};
use crate::plan::{config, Plan, PlanConfig, ProjectionSettings};
use crate::projection::{project, ProjectionResult, ScheduleBuilder};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the scenario every set starts with
pub const BASELINE_SCENARIO: &str = "Baseline";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub is_baseline: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub plan: Plan,
}

impl Scenario {
    pub fn new(name: impl Into<String>, description: impl Into<String>, plan: Plan) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            is_baseline: false,
            created_at: Some(Utc::now()),
            plan,
        }
    }
}

/// Ordered scenarios; the baseline is always first and always present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
    active: String,
}

impl ScenarioSet {
    pub fn new(baseline: Plan) -> Self {
        let scenario = Scenario {
            name: BASELINE_SCENARIO.to_string(),
            description: "Original plan".to_string(),
            is_baseline: true,
            created_at: Some(Utc::now()),
            plan: baseline,
        };
        Self {
            scenarios: vec![scenario],
            active: BASELINE_SCENARIO.to_string(),
        }
    }

    /// Baseline from the top-level config, one scenario per `scenarios` entry.
    /// Entries inherit whatever they do not override.
    pub fn from_config(config: &PlanConfig) -> std::result::Result<Self, ConfigurationError> {
        let baseline = Plan::from_config(config)?;
        let mut set = Self::new(baseline);

        for entry in &config.scenarios {
            let settings = match &entry.settings {
                Some(settings) => settings.to_settings()?,
                None => set.baseline().plan.settings,
            };
            let categories = entry.categories.as_deref().unwrap_or(&config.categories[..]);
            let catalog = config::build_catalog(categories, &settings)?;

            let mut plan = Plan::new(config.name.clone(), settings, catalog);
            plan.evaluee = set.baseline().plan.evaluee.clone();
            plan.log_data_quality();

            let mut scenario = Scenario::new(entry.name.clone(), entry.description.clone(), plan);
            if entry.created_at.is_some() {
                scenario.created_at = entry.created_at;
            }
            set.add(scenario)?;
        }

        Ok(set)
    }

    pub fn baseline(&self) -> &Scenario {
        &self.scenarios[0]
    }

    pub fn active(&self) -> &Scenario {
        self.get(&self.active).unwrap_or_else(|| self.baseline())
    }

    pub fn set_active(&mut self, name: &str) -> std::result::Result<(), ConfigurationError> {
        self.position(name)?;
        self.active = name.to_string();
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Edit a scenario's plan. The edit is applied to a copy and only kept
    /// if the resulting settings still validate.
    pub fn update_plan<F>(&mut self, name: &str, edit: F) -> std::result::Result<(), ConfigurationError>
    where
        F: FnOnce(&mut Plan),
    {
        let index = self.position(name)?;
        let mut plan = self.scenarios[index].plan.clone();
        edit(&mut plan);
        plan.settings.validate()?;
        plan.log_data_quality();
        self.scenarios[index].plan = plan;
        Ok(())
    }

    pub fn set_description(&mut self, name: &str, description: impl Into<String>) -> std::result::Result<(), ConfigurationError> {
        let index = self.position(name)?;
        self.scenarios[index].description = description.into();
        Ok(())
    }

    pub fn add(&mut self, mut scenario: Scenario) -> std::result::Result<(), ConfigurationError> {
        if self.get(&scenario.name).is_some() {
            return Err(ConfigurationError::DuplicateScenario(scenario.name));
        }
        scenario.is_baseline = false;
        self.scenarios.push(scenario);
        Ok(())
    }

    /// Duplicate `source` under a new name
    pub fn copy(&mut self, source: &str, name: &str) -> std::result::Result<(), ConfigurationError> {
        let plan = self.scenarios[self.position(source)?].plan.clone();
        self.add(Scenario::new(name, format!("Copy of {}", source), plan))
    }

    pub fn rename(&mut self, from: &str, to: &str) -> std::result::Result<(), ConfigurationError> {
        let index = self.position(from)?;
        if index == 0 {
            return Err(ConfigurationError::BaselineProtected("renamed"));
        }
        if self.get(to).is_some() {
            return Err(ConfigurationError::DuplicateScenario(to.to_string()));
        }
        self.scenarios[index].name = to.to_string();
        if self.active == from {
            self.active = to.to_string();
        }
        Ok(())
    }

    /// Remove a scenario; the active one falls back to the baseline
    pub fn remove(&mut self, name: &str) -> std::result::Result<Scenario, ConfigurationError> {
        let index = self.position(name)?;
        if index == 0 {
            return Err(ConfigurationError::BaselineProtected("removed"));
        }
        if self.active == name {
            self.active = BASELINE_SCENARIO.to_string();
        }
        Ok(self.scenarios.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    fn position(&self, name: &str) -> std::result::Result<usize, ConfigurationError> {
        self.scenarios
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ConfigurationError::UnknownScenario(name.to_string()))
    }
}

/// Projection plus the analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub result: ProjectionResult,
    pub sensitivity: Option<SensitivityReport>,
    pub validation: ValidationReport,
}

/// One line of a scenario comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub name: String,
    pub description: String,
    pub is_baseline: bool,
    pub category_count: usize,
    pub item_count: usize,
    pub base_year: i32,
    pub projection_years: f64,
    pub discount_rate: f64,
    pub total_nominal: f64,
    pub total_present_value: f64,
    /// Present value difference from the baseline in dollars
    pub present_value_change: f64,
    /// Present value difference from the baseline in percent
    pub percent_change: f64,
}

/// Totals for one horizon length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonResult {
    pub projection_years: f64,
    pub last_year: i32,
    pub total_nominal: f64,
    pub total_present_value: f64,
    /// Nominal difference from the first horizon requested
    pub nominal_change: f64,
    pub percent_change: f64,
}

/// Runs projections with a shared analysis configuration
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    analysis: AnalysisConfig,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(analysis: AnalysisConfig) -> Self {
        Self { analysis }
    }

    pub fn analysis(&self) -> &AnalysisConfig {
        &self.analysis
    }

    /// Project a plan, then run sensitivity and validation on it
    pub fn run(&self, plan: &Plan) -> Result<PlanReport> {
        let result = project(plan)?;

        let sensitivity = if self.analysis.run_sensitivity {
            Some(run_sensitivity_against(
                &plan.settings,
                &plan.catalog,
                &self.analysis.sensitivity_deltas,
                result.summary.total_present_value,
            )?)
        } else {
            None
        };

        let validation = validate(&result, &plan.settings, self.analysis.tolerance);

        Ok(PlanReport {
            result,
            sensitivity,
            validation,
        })
    }

    /// Run several independent plans in parallel
    pub fn run_batch(&self, plans: &[Plan]) -> Result<Vec<PlanReport>> {
        plans.par_iter().map(|plan| self.run(plan)).collect()
    }

    /// Project every scenario and compare against the baseline
    pub fn compare(&self, scenarios: &ScenarioSet) -> Result<Vec<ScenarioComparison>> {
        let all: Vec<&Scenario> = scenarios.iter().collect();
        let results: Vec<ProjectionResult> = all
            .par_iter()
            .map(|scenario| project(&scenario.plan))
            .collect::<Result<_>>()?;

        let baseline_pv = results[0].summary.total_present_value;
        log::info!("compared {} scenarios against baseline", all.len());

        Ok(all
            .iter()
            .zip(results)
            .map(|(scenario, result)| {
                let settings = &scenario.plan.settings;
                let pv = result.summary.total_present_value;
                ScenarioComparison {
                    name: scenario.name.clone(),
                    description: scenario.description.clone(),
                    is_baseline: scenario.is_baseline,
                    category_count: scenario.plan.catalog.categories().len(),
                    item_count: scenario.plan.catalog.item_count(),
                    base_year: settings.base_year,
                    projection_years: settings.projection_years,
                    discount_rate: settings.discount_rate,
                    total_nominal: result.summary.total_nominal,
                    total_present_value: pv,
                    present_value_change: pv - baseline_pv,
                    percent_change: percent_of(pv - baseline_pv, baseline_pv),
                }
            })
            .collect())
    }

    /// Totals for the same plan over several horizon lengths
    pub fn horizons(&self, plan: &Plan, horizons: &[f64]) -> Result<Vec<HorizonResult>> {
        let settings: Vec<ProjectionSettings> = horizons
            .iter()
            .map(|&years| {
                let settings = ProjectionSettings {
                    projection_years: years,
                    ..plan.settings
                };
                settings.validate().map(|_| settings)
            })
            .collect::<std::result::Result<_, ConfigurationError>>()?;

        let totals = settings
            .par_iter()
            .map(|settings| {
                ScheduleBuilder::new(settings, &plan.catalog)
                    .build_schedule()
                    .map(|schedule| (settings, schedule.final_cumulative()))
            })
            .collect::<Result<Vec<_>>>()?;

        let reference = totals.first().map(|(_, totals)| totals.nominal).unwrap_or(0.0);

        Ok(totals
            .into_iter()
            .map(|(settings, totals)| HorizonResult {
                projection_years: settings.projection_years,
                last_year: settings.last_year(),
                total_nominal: totals.nominal,
                total_present_value: totals.present_value,
                nominal_change: totals.nominal - reference,
                percent_change: percent_of(totals.nominal - reference, reference),
            })
            .collect())
    }
}

fn percent_of(change: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        change / base * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category, Item};
    use crate::plan::load_plan_config_from_reader;
    use approx::assert_relative_eq;

    fn regression_plan(projection_years: f64) -> Plan {
        let settings = ProjectionSettings::new(2025, projection_years, 0.0).unwrap();
        let catalog = Catalog::new(vec![
            Category::new("Physician Evaluation", 0.032)
                .with_item(Item::recurring("Neurology", 444.33, 1.0, 0.032, 2025, 2064).unwrap()),
            Category::new("Diagnostics", 0.03)
                .with_item(Item::recurring("MRI", 1852.03, 1.0, 0.03, 2025, 2064).unwrap()),
            Category::new("Therapies", 0.028)
                .with_item(Item::recurring("Physical Therapy", 17908.88, 1.0, 0.028, 2025, 2064).unwrap()),
            Category::new("Medications", 0.016)
                .with_item(Item::recurring("Gabapentin", 277.40, 12.0, 0.016, 2025, 2064).unwrap()),
            Category::new("Surgeries", 0.035)
                .with_item(Item::recurring("Shoulder Arthroscopy", 130600.45, 1.0, 0.035, 2025, 2064).unwrap()),
        ])
        .unwrap();
        Plan::new("Regression", settings, catalog)
    }

    #[test]
    fn test_run_includes_sensitivity_and_validation() {
        let runner = ScenarioRunner::new();
        let report = runner.run(&regression_plan(39.4)).unwrap();

        assert!(report.validation.all_passed());
        let sensitivity = report.sensitivity.unwrap();
        assert_eq!(sensitivity.variants.len(), 5);
        assert_eq!(sensitivity.get(0.0).unwrap().total_present_value, report.result.summary.total_present_value);
    }

    #[test]
    fn test_run_without_sensitivity() {
        let runner = ScenarioRunner::with_config(AnalysisConfig {
            run_sensitivity: false,
            ..AnalysisConfig::default()
        });
        let report = runner.run(&regression_plan(39.0)).unwrap();
        assert!(report.sensitivity.is_none());
    }

    #[test]
    fn test_run_batch_preserves_order() {
        let runner = ScenarioRunner::new();
        let plans = vec![regression_plan(39.0), regression_plan(39.4)];
        let reports = runner.run_batch(&plans).unwrap();

        assert_eq!(reports.len(), 2);
        assert_relative_eq!(reports[0].result.summary.total_nominal, 12_126_536.58, epsilon = 0.01);
        assert_relative_eq!(reports[1].result.summary.total_nominal, 12_352_831.85, epsilon = 0.01);
    }

    #[test]
    fn test_horizon_analysis() {
        let runner = ScenarioRunner::new();
        let results = runner.horizons(&regression_plan(39.4), &[39.0, 39.4, 40.0]).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].nominal_change, 0.0);
        assert_relative_eq!(results[1].nominal_change, 226_295.27, epsilon = 0.01);
        assert_relative_eq!(results[1].percent_change, 1.866, epsilon = 0.001);
        assert_eq!(results[1].last_year, 2064);
        assert!(results[2].total_nominal > results[1].total_nominal);
    }

    #[test]
    fn test_horizon_analysis_rejects_invalid_horizon() {
        let runner = ScenarioRunner::new();
        assert!(runner.horizons(&regression_plan(39.4), &[39.0, 0.0]).is_err());
    }

    #[test]
    fn test_baseline_is_protected() {
        let mut set = ScenarioSet::new(regression_plan(39.4));
        assert_eq!(
            set.remove(BASELINE_SCENARIO),
            Err(ConfigurationError::BaselineProtected("removed"))
        );
        assert_eq!(
            set.rename(BASELINE_SCENARIO, "Other"),
            Err(ConfigurationError::BaselineProtected("renamed"))
        );
        assert_eq!(set.len(), 1);
        assert!(set.baseline().is_baseline);
    }

    #[test]
    fn test_scenario_lifecycle() {
        let mut set = ScenarioSet::new(regression_plan(39.4));
        set.copy(BASELINE_SCENARIO, "Shorter").unwrap();
        set.update_plan("Shorter", |plan| plan.settings.projection_years = 39.0).unwrap();

        assert_eq!(
            set.copy(BASELINE_SCENARIO, "Shorter"),
            Err(ConfigurationError::DuplicateScenario("Shorter".to_string()))
        );

        set.set_active("Shorter").unwrap();
        assert_eq!(set.active().name, "Shorter");
        assert!(!set.active().is_baseline);

        set.rename("Shorter", "39 Years").unwrap();
        assert_eq!(set.active().name, "39 Years");

        let removed = set.remove("39 Years").unwrap();
        assert_eq!(removed.plan.settings.projection_years, 39.0);
        assert_eq!(set.active().name, BASELINE_SCENARIO);
        assert!(set.set_active("39 Years").is_err());
    }

    #[test]
    fn test_compare_scenarios() {
        let mut set = ScenarioSet::new(regression_plan(39.4));
        set.add(Scenario::new("Shorter", "39 years", regression_plan(39.0))).unwrap();

        let comparison = ScenarioRunner::new().compare(&set).unwrap();
        assert_eq!(comparison.len(), 2);
        assert!(comparison[0].is_baseline);
        assert_eq!(comparison[0].present_value_change, 0.0);
        assert_eq!(comparison[1].item_count, 5);
        assert_relative_eq!(comparison[1].present_value_change, -226_295.27, epsilon = 0.01);
        assert!(comparison[1].percent_change < 0.0);
    }

    #[test]
    fn test_scenarios_from_config_inherit_baseline() {
        let json = r#"{
            "name": "Plan",
            "settings": { "base_year": 2025, "projection_years": 10.5, "discount_rate": 0.03 },
            "categories": [
                { "name": "Medications", "items": [
                    { "name": "Gabapentin", "unit_cost": 277.40, "frequency_per_year": 12,
                      "inflation_rate": 0.016, "start_year": 2025 }
                ]}
            ],
            "scenarios": [
                { "name": "No Discount",
                  "settings": { "base_year": 2025, "projection_years": 10.5, "discount_rate": 0.0 } },
                { "name": "Empty", "categories": [] }
            ]
        }"#;
        let config = load_plan_config_from_reader(json.as_bytes()).unwrap();
        let set = ScenarioSet::from_config(&config).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.get("No Discount").unwrap().plan.catalog.item_count(), 1);
        assert_eq!(set.get("No Discount").unwrap().plan.settings.discount_rate, 0.0);
        assert_eq!(set.get("Empty").unwrap().plan.settings.discount_rate, 0.03);
        assert!(set.get("Empty").unwrap().plan.catalog.is_empty());
    }

    #[test]
    fn test_scenario_named_baseline_rejected() {
        let mut set = ScenarioSet::new(regression_plan(39.4));
        let duplicate = Scenario::new(BASELINE_SCENARIO, "", regression_plan(39.0));
        assert!(set.add(duplicate).is_err());
    }

    #[test]
    fn test_update_plan_rejects_invalid_settings() {
        let mut set = ScenarioSet::new(regression_plan(39.4));
        set.copy(BASELINE_SCENARIO, "Edited").unwrap();

        let result = set.update_plan("Edited", |plan| plan.settings.projection_years = -1.0);
        assert_eq!(result, Err(ConfigurationError::InvalidProjectionYears(-1.0)));
        assert_eq!(set.get("Edited").unwrap().plan.settings.projection_years, 39.4);

        set.update_plan("Edited", |plan| plan.settings.discount_rate = 0.05).unwrap();
        assert_eq!(set.get("Edited").unwrap().plan.settings.discount_rate, 0.05);
        assert!(set.update_plan("Missing", |_| {}).is_err());

        set.set_description("Edited", "Higher discount").unwrap();
        assert_eq!(set.get("Edited").unwrap().description, "Higher discount");
        assert!(!set.get("Edited").unwrap().is_baseline);
    }
}
