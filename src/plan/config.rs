//! Raw plan configuration as read from JSON or CSV
//!
//! These structs mirror the input file format and carry serde defaults.
//! Converting them into domain types (`Plan`, `Catalog`, `Item`) is where all
//! construction-time normalization happens: cost ranges collapse to their
//! mean, distributed instances become a frequency, interval schedules expand
//! to explicit years, and items inherit their category's inflation rate.

use super::settings::{Evaluee, ProjectionSettings, MAX_PROJECTION_YEARS};
use crate::catalog::{Catalog, Category, Item, Timing};
use crate::error::ConfigurationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Shortest and longest step accepted for interval schedules
const MIN_INTERVAL_YEARS: f64 = 0.1;
const MAX_INTERVAL_YEARS: f64 = 20.0;

/// Slack when locating the first interval step on or after the base year
const STEP_EPSILON: f64 = 1e-9;

fn default_true() -> bool {
    true
}

fn default_frequency() -> f64 {
    1.0
}

/// Top-level plan file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluee: Option<EvalueeConfig>,

    pub settings: SettingsConfig,

    #[serde(default)]
    pub categories: Vec<CategoryConfig>,

    /// Alternative scenarios; the top-level settings/categories form the baseline
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalueeConfig {
    pub name: String,
    pub current_age: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub base_year: i32,
    pub projection_years: f64,
    pub discount_rate: f64,

    #[serde(default = "default_true")]
    pub discounting_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,

    #[serde(default)]
    pub default_inflation_rate: f64,

    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

/// One item as entered; exactly one timing form must be present
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_range: Option<CostRange>,

    #[serde(default = "default_frequency")]
    pub frequency_per_year: f64,

    /// Falls back to the category default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflation_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_years: Option<Vec<i32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<IntervalConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributed: Option<DistributedConfig>,
}

/// Low/high estimate; the item cost is the mean
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostRange {
    pub low: f64,
    pub high: f64,
}

/// Occurrences every `every_years` starting at a possibly fractional year
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntervalConfig {
    pub start_year: f64,
    pub every_years: f64,
}

/// A fixed number of instances spread evenly over a period
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DistributedConfig {
    pub total_instances: u32,
    pub period_years: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Replaces the baseline settings when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsConfig>,

    /// Replaces the baseline categories when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SettingsConfig {
    pub fn to_settings(&self) -> Result<ProjectionSettings, ConfigurationError> {
        let settings = ProjectionSettings::new(self.base_year, self.projection_years, self.discount_rate)?;
        Ok(if self.discounting_enabled {
            settings
        } else {
            settings.without_discounting()
        })
    }
}

impl From<&ProjectionSettings> for SettingsConfig {
    fn from(settings: &ProjectionSettings) -> Self {
        Self {
            base_year: settings.base_year,
            projection_years: settings.projection_years,
            discount_rate: settings.discount_rate,
            discounting_enabled: settings.discounting_enabled,
        }
    }
}

impl TryFrom<SettingsConfig> for ProjectionSettings {
    type Error = ConfigurationError;

    fn try_from(config: SettingsConfig) -> Result<Self, Self::Error> {
        config.to_settings()
    }
}

impl TryFrom<EvalueeConfig> for Evaluee {
    type Error = ConfigurationError;

    fn try_from(config: EvalueeConfig) -> Result<Self, Self::Error> {
        config.to_evaluee()
    }
}

impl EvalueeConfig {
    pub fn to_evaluee(&self) -> Result<Evaluee, ConfigurationError> {
        Evaluee::new(self.name.clone(), self.current_age)
    }
}

impl CostRange {
    fn mean(&self, item: &str) -> Result<f64, ConfigurationError> {
        for (field, value) in [("cost_range.low", self.low), ("cost_range.high", self.high)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::NegativeValue {
                    item: item.to_string(),
                    field,
                    value,
                });
            }
        }
        if self.low > self.high {
            return Err(ConfigurationError::InvertedCostRange {
                item: item.to_string(),
                low: self.low,
                high: self.high,
            });
        }
        Ok((self.low + self.high) / 2.0)
    }
}

impl DistributedConfig {
    fn frequency(&self, item: &str) -> Result<f64, ConfigurationError> {
        if self.total_instances == 0 {
            return Err(ConfigurationError::InvalidDistribution {
                item: item.to_string(),
                reason: "total_instances must be positive".into(),
            });
        }
        if !self.period_years.is_finite() || self.period_years <= 0.0 || self.period_years > MAX_PROJECTION_YEARS {
            return Err(ConfigurationError::InvalidDistribution {
                item: item.to_string(),
                reason: format!(
                    "period_years must be in (0, {}], got {}",
                    MAX_PROJECTION_YEARS, self.period_years
                ),
            });
        }
        Ok(self.total_instances as f64 / self.period_years)
    }

    /// Last year covered when the item gives no explicit end year
    fn end_year(&self, item: &str, start_year: i32) -> Result<i32, ConfigurationError> {
        start_year
            .checked_add(self.period_years.ceil() as i32 - 1)
            .ok_or_else(|| ConfigurationError::InvalidDistribution {
                item: item.to_string(),
                reason: format!("{}-year period from {} ends past any calendar year", self.period_years, start_year),
            })
    }
}

impl IntervalConfig {
    /// Expand to calendar years from `base_year` up to
    /// `base_year + floor(projection_years)`, rounding each fractional
    /// position half-to-even. Steps before `base_year` are skipped, not walked.
    fn expand(&self, item: &str, settings: &ProjectionSettings) -> Result<BTreeSet<i32>, ConfigurationError> {
        if !self.start_year.is_finite() {
            return Err(ConfigurationError::InvalidInterval {
                item: item.to_string(),
                reason: format!("start_year must be finite, got {}", self.start_year),
            });
        }
        if !self.every_years.is_finite() || !(MIN_INTERVAL_YEARS..=MAX_INTERVAL_YEARS).contains(&self.every_years) {
            return Err(ConfigurationError::InvalidInterval {
                item: item.to_string(),
                reason: format!(
                    "every_years must be between {} and {}, got {}",
                    MIN_INTERVAL_YEARS, MAX_INTERVAL_YEARS, self.every_years
                ),
            });
        }

        let base_year = settings.base_year;
        let end_year = base_year + settings.projection_years.floor() as i32;

        let skipped = ((base_year as f64 - self.start_year) / self.every_years - STEP_EPSILON)
            .ceil()
            .max(0.0);
        let first = self.start_year + skipped * self.every_years;
        let span = end_year as f64 - first;
        if span < 0.0 {
            return Ok(BTreeSet::new());
        }

        let max_steps = ((end_year - base_year) as f64 / self.every_years).ceil() + 1.0;
        let steps = (span / self.every_years).floor().min(max_steps) as u32;
        let years = (0..=steps)
            .map(|k| (first + k as f64 * self.every_years).round_ties_even() as i32)
            .filter(|year| (base_year..=end_year).contains(year))
            .collect();
        Ok(years)
    }
}

impl ItemConfig {
    /// Normalize into a validated `Item`
    pub fn to_item(
        &self,
        default_inflation_rate: f64,
        settings: &ProjectionSettings,
    ) -> Result<Item, ConfigurationError> {
        let name = self.name.as_str();

        let unit_cost = match (self.unit_cost, self.cost_range) {
            (Some(cost), None) => cost,
            (None, Some(range)) => range.mean(name)?,
            (Some(_), Some(_)) => {
                return Err(ConfigurationError::ConflictingCost { item: name.to_string() })
            }
            (None, None) => return Err(ConfigurationError::MissingCost { item: name.to_string() }),
        };

        let mut frequency = match &self.distributed {
            Some(distributed) => distributed.frequency(name)?,
            None => self.frequency_per_year,
        };

        let timing = self.timing(settings)?;
        if matches!(timing, Timing::OneTime { .. }) && frequency != 1.0 {
            log::debug!("one-time item '{}' frequency {} normalized to 1", name, frequency);
            frequency = 1.0;
        }

        let inflation_rate = self.inflation_rate.unwrap_or(default_inflation_rate);
        Item::new(name, unit_cost, frequency, inflation_rate, timing)
    }

    fn timing(&self, settings: &ProjectionSettings) -> Result<Timing, ConfigurationError> {
        let name = self.name.as_str();
        let is_recurring = self.start_year.is_some() || self.end_year.is_some();
        let declared = [
            is_recurring,
            self.occurrence_years.is_some(),
            self.one_time_year.is_some(),
            self.interval.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        match declared {
            0 => return Err(ConfigurationError::MissingTiming { item: name.to_string() }),
            1 => {}
            _ => return Err(ConfigurationError::ConflictingTiming { item: name.to_string() }),
        }

        if let Some(year) = self.one_time_year {
            return Ok(Timing::OneTime { year });
        }

        if let Some(years) = &self.occurrence_years {
            if years.is_empty() {
                return Err(ConfigurationError::EmptyOccurrences { item: name.to_string() });
            }
            return Ok(Timing::Discrete { years: years.iter().copied().collect() });
        }

        if let Some(interval) = &self.interval {
            let years = interval.expand(name, settings)?;
            return Ok(Timing::Discrete { years });
        }

        let start_year = self.start_year.unwrap_or(settings.base_year);
        let end_year = match (self.end_year, &self.distributed) {
            (Some(end), _) => end,
            (None, Some(distributed)) => distributed.end_year(name, start_year)?,
            (None, None) => settings.last_year(),
        };
        Ok(Timing::Recurring { start_year, end_year })
    }
}

impl CategoryConfig {
    pub fn to_category(&self, settings: &ProjectionSettings) -> Result<Category, ConfigurationError> {
        let mut category = Category::new(self.name.clone(), self.default_inflation_rate);
        for item in &self.items {
            category.add_item(item.to_item(self.default_inflation_rate, settings)?);
        }
        Ok(category)
    }
}

/// Build a catalog from category configs under the given settings
pub fn build_catalog(
    categories: &[CategoryConfig],
    settings: &ProjectionSettings,
) -> Result<Catalog, ConfigurationError> {
    let categories = categories
        .iter()
        .map(|c| c.to_category(settings))
        .collect::<Result<Vec<_>, _>>()?;
    Catalog::new(categories)
}

impl From<&Item> for ItemConfig {
    fn from(item: &Item) -> Self {
        let mut config = ItemConfig {
            name: item.name.clone(),
            unit_cost: Some(item.unit_cost),
            frequency_per_year: item.frequency_per_year,
            inflation_rate: Some(item.inflation_rate),
            ..Default::default()
        };
        match &item.timing {
            Timing::Recurring { start_year, end_year } => {
                config.start_year = Some(*start_year);
                config.end_year = Some(*end_year);
            }
            Timing::Discrete { years } => {
                config.occurrence_years = Some(years.iter().copied().collect());
            }
            Timing::OneTime { year } => config.one_time_year = Some(*year),
        }
        config
    }
}

impl From<&Category> for CategoryConfig {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            default_inflation_rate: category.default_inflation_rate,
            items: category.items.iter().map(ItemConfig::from).collect(),
        }
    }
}
