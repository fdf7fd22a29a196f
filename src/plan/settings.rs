//! Projection horizon, discounting settings and the evaluee

use super::config::{EvalueeConfig, SettingsConfig};
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Longest horizon accepted for a single plan
pub const MAX_PROJECTION_YEARS: f64 = 150.0;

/// Fractional remainders smaller than this are treated as whole years
const REMAINDER_EPSILON: f64 = 1e-9;

/// Settings shared by every row of a projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SettingsConfig")]
pub struct ProjectionSettings {
    /// First projected calendar year (years_elapsed = 0)
    pub base_year: i32,

    /// Length of the horizon in years; may be fractional (e.g. 39.4)
    pub projection_years: f64,

    /// Annual discount rate as a decimal
    pub discount_rate: f64,

    /// When false, present value equals nominal
    pub discounting_enabled: bool,
}

/// One row slot of the horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: i32,
    pub years_elapsed: u32,
    /// 1.0 for full years, the fractional remainder for the terminal row
    pub weight: f64,
}

impl ProjectionSettings {
    /// Validated settings with discounting enabled
    pub fn new(base_year: i32, projection_years: f64, discount_rate: f64) -> Result<Self, ConfigurationError> {
        let settings = Self {
            base_year,
            projection_years,
            discount_rate,
            discounting_enabled: true,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn without_discounting(mut self) -> Self {
        self.discounting_enabled = false;
        self
    }

    /// Copy with a different discount rate (used by sensitivity runs)
    pub fn with_discount_rate(&self, discount_rate: f64) -> Result<Self, ConfigurationError> {
        let settings = Self { discount_rate, ..*self };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        // Anything below the snapping threshold would yield an empty schedule
        if !self.projection_years.is_finite()
            || self.projection_years < REMAINDER_EPSILON
            || self.projection_years > MAX_PROJECTION_YEARS
        {
            return Err(ConfigurationError::InvalidProjectionYears(self.projection_years));
        }
        if self.base_year.checked_add(self.row_count() as i32).is_none() {
            return Err(ConfigurationError::InvalidBaseYear {
                base_year: self.base_year,
                projection_years: self.projection_years,
            });
        }
        if !self.discount_rate.is_finite() || self.discount_rate <= -1.0 {
            return Err(ConfigurationError::InvalidRate {
                field: "discount_rate",
                value: self.discount_rate,
            });
        }
        Ok(())
    }

    /// Number of whole years in the horizon
    pub fn full_years(&self) -> u32 {
        let floor = self.projection_years.floor();
        if self.projection_years - floor > 1.0 - REMAINDER_EPSILON {
            // 38.9999999999 is 39 full years, not 38 plus a sliver
            floor as u32 + 1
        } else {
            floor as u32
        }
    }

    /// Fractional part of the horizon in [0, 1); 0 for whole-year horizons
    pub fn remainder(&self) -> f64 {
        let remainder = self.projection_years - self.full_years() as f64;
        if remainder.abs() < REMAINDER_EPSILON {
            0.0
        } else {
            remainder
        }
    }

    /// Rows in the schedule: full years plus one for a fractional remainder
    pub fn row_count(&self) -> u32 {
        self.full_years() + u32::from(self.remainder() > 0.0)
    }

    pub fn first_year(&self) -> i32 {
        self.base_year
    }

    /// Calendar year of the last (possibly partial) row
    pub fn last_year(&self) -> i32 {
        self.base_year + self.row_count() as i32 - 1
    }

    /// Row slots of the horizon in calendar order
    pub fn horizon(&self) -> Vec<ProjectionYear> {
        let full_years = self.full_years();
        let remainder = self.remainder();

        let mut years: Vec<ProjectionYear> = (0..full_years)
            .map(|offset| ProjectionYear {
                year: self.base_year + offset as i32,
                years_elapsed: offset,
                weight: 1.0,
            })
            .collect();

        if remainder > 0.0 {
            years.push(ProjectionYear {
                year: self.base_year + full_years as i32,
                years_elapsed: full_years,
                weight: remainder,
            });
        }

        years
    }

    /// Display label such as "2025-2064"
    pub fn period_label(&self) -> String {
        format!("{}-{}", self.first_year(), self.last_year())
    }
}

/// The person the plan is written for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EvalueeConfig")]
pub struct Evaluee {
    pub name: String,
    /// Age at the base year (may be fractional)
    pub current_age: f64,
}

impl Evaluee {
    pub fn new(name: impl Into<String>, current_age: f64) -> Result<Self, ConfigurationError> {
        if !current_age.is_finite() || current_age <= 0.0 || current_age > 120.0 {
            return Err(ConfigurationError::InvalidField(format!(
                "evaluee age must be between 0 and 120, got {}",
                current_age
            )));
        }
        Ok(Self {
            name: name.into(),
            current_age,
        })
    }

    /// Age in the row `years_elapsed` years after the base year
    pub fn age_at(&self, years_elapsed: u32) -> f64 {
        self.current_age + years_elapsed as f64
    }
}
