//! Plan definition: settings, evaluee and catalog, plus file loading

mod settings;
pub mod config;
pub mod loader;

pub use settings::{Evaluee, ProjectionSettings, ProjectionYear, MAX_PROJECTION_YEARS};
pub use config::{
    CategoryConfig, CostRange, DistributedConfig, EvalueeConfig, IntervalConfig, ItemConfig,
    PlanConfig, ScenarioConfig, SettingsConfig,
};
pub use loader::{load_plan_config, load_plan_config_from_reader};

use crate::catalog::{Catalog, ItemOverlap};
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Everything one projection needs. Passed explicitly; never global.
///
/// Serializes as a `PlanConfig`; deserializing goes through `from_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlanConfig", into = "PlanConfig")]
pub struct Plan {
    pub name: String,
    pub evaluee: Option<Evaluee>,
    pub settings: ProjectionSettings,
    pub catalog: Catalog,
}

impl Plan {
    pub fn new(name: impl Into<String>, settings: ProjectionSettings, catalog: Catalog) -> Self {
        Self {
            name: name.into(),
            evaluee: None,
            settings,
            catalog,
        }
    }

    pub fn with_evaluee(mut self, evaluee: Evaluee) -> Self {
        self.evaluee = Some(evaluee);
        self
    }

    /// Build the baseline plan from a config (scenarios are ignored here)
    pub fn from_config(config: &PlanConfig) -> Result<Self, ConfigurationError> {
        let settings = config.settings.to_settings()?;
        let catalog = config::build_catalog(&config.categories, &settings)?;
        let evaluee = config.evaluee.as_ref().map(EvalueeConfig::to_evaluee).transpose()?;

        let plan = Self {
            name: config.name.clone(),
            evaluee,
            settings,
            catalog,
        };
        plan.log_data_quality();
        Ok(plan)
    }

    /// Items with no active year inside the horizon
    pub fn zero_impact_items(&self) -> Vec<(&str, &str)> {
        let first = self.settings.first_year();
        let last = self.settings.last_year();
        self.catalog
            .items()
            .filter(|(_, item)| item.timing.active_years_within(first, last) == 0)
            .map(|(category, item)| (category.name.as_str(), item.name.as_str()))
            .collect()
    }

    /// Items sharing active years within their category
    pub fn overlaps(&self) -> Vec<ItemOverlap> {
        self.catalog
            .overlaps(self.settings.first_year(), self.settings.last_year())
    }

    /// Back to the file representation
    pub fn to_config(&self) -> PlanConfig {
        PlanConfig {
            name: self.name.clone(),
            evaluee: self.evaluee.as_ref().map(|e| EvalueeConfig {
                name: e.name.clone(),
                current_age: e.current_age,
            }),
            settings: SettingsConfig::from(&self.settings),
            categories: self.catalog.categories().iter().map(CategoryConfig::from).collect(),
            scenarios: Vec::new(),
        }
    }

    pub(crate) fn log_data_quality(&self) {
        for (category, item) in self.zero_impact_items() {
            log::warn!(
                "plan '{}': item '{}' in '{}' has no years inside {} and contributes nothing",
                self.name,
                item,
                category,
                self.settings.period_label()
            );
        }
        for overlap in self.overlaps() {
            log::warn!(
                "plan '{}': '{}' and '{}' in '{}' overlap in {} year(s)",
                self.name,
                overlap.first,
                overlap.second,
                overlap.category,
                overlap.years.len()
            );
        }
    }
}

impl TryFrom<PlanConfig> for Plan {
    type Error = ConfigurationError;

    fn try_from(config: PlanConfig) -> Result<Self, Self::Error> {
        Self::from_config(&config)
    }
}

impl From<Plan> for PlanConfig {
    fn from(plan: Plan) -> Self {
        plan.to_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Item};

    fn plan() -> Plan {
        let settings = ProjectionSettings::new(2025, 10.0, 0.03).unwrap();
        let catalog = Catalog::new(vec![Category::new("Surgeries", 0.05)
            .with_item(Item::one_time("Fusion", 75_000.0, 0.05, 2027).unwrap())
            .with_item(Item::one_time("Too late", 10_000.0, 0.05, 2090).unwrap())])
        .unwrap();
        Plan::new("Test", settings, catalog)
    }

    #[test]
    fn test_zero_impact_items_reported() {
        assert_eq!(plan().zero_impact_items(), vec![("Surgeries", "Too late")]);
    }

    #[test]
    fn test_plan_config_round_trip() {
        let original = plan().with_evaluee(Evaluee::new("Jane", 35.0).unwrap());
        let rebuilt = Plan::from_config(&original.to_config()).unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_deserialize_runs_construction_checks() {
        let original = plan().with_evaluee(Evaluee::new("Jane", 35.0).unwrap());
        let json = serde_json::to_string(&original).unwrap();
        let rebuilt: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(rebuilt, original);

        let negative_cost = r#"{
            "name": "Bad",
            "settings": { "base_year": 2025, "projection_years": 10.0, "discount_rate": 0.03 },
            "categories": [{ "name": "Care", "items": [
                { "name": "Visit", "unit_cost": -5.0, "start_year": 2025 }
            ]}]
        }"#;
        assert!(serde_json::from_str::<Plan>(negative_cost).is_err());

        let duplicate_category = r#"{
            "name": "Bad",
            "settings": { "base_year": 2025, "projection_years": 10.0, "discount_rate": 0.03 },
            "categories": [{ "name": "Care", "items": [] }, { "name": "Care", "items": [] }]
        }"#;
        assert!(serde_json::from_str::<Plan>(duplicate_category).is_err());

        let inverted = r#"{
            "name": "Bad",
            "settings": { "base_year": 2025, "projection_years": 10.0, "discount_rate": 0.03 },
            "categories": [{ "name": "Care", "items": [
                { "name": "Visit", "unit_cost": 5.0, "start_year": 2030, "end_year": 2026 }
            ]}]
        }"#;
        assert!(serde_json::from_str::<Plan>(inverted).is_err());
    }
}
