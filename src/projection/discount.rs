//! Inflation growth and present-value discounting
//!
//! Both factors use the integer year offset from the base year. Proration of
//! a partial terminal year happens through the timing weight, never through
//! a fractional exponent.

use crate::catalog::Item;
use crate::error::{ProjectionError, Result};
use crate::plan::ProjectionSettings;
use serde::{Deserialize, Serialize};

/// Nominal and present-value amounts for one cell of the schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostPair {
    pub nominal: f64,
    pub present_value: f64,
}

impl CostPair {
    pub fn new(nominal: f64, present_value: f64) -> Self {
        Self { nominal, present_value }
    }

    pub fn add(&mut self, other: CostPair) {
        self.nominal += other.nominal;
        self.present_value += other.present_value;
    }
}

/// Single-rate annual discount curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    /// Annual discount rate as a decimal
    pub annual_rate: f64,

    /// When false every discount factor is 1
    pub enabled: bool,
}

impl DiscountCurve {
    pub fn single_rate(annual_rate: f64) -> Self {
        Self { annual_rate, enabled: true }
    }

    pub fn disabled() -> Self {
        Self { annual_rate: 0.0, enabled: false }
    }

    pub fn from_settings(settings: &ProjectionSettings) -> Self {
        Self {
            annual_rate: settings.discount_rate,
            enabled: settings.discounting_enabled,
        }
    }

    /// (1 + r)^years, or 1 when discounting is off
    pub fn discount_factor(&self, years: u32) -> Result<f64> {
        if !self.enabled {
            return Ok(1.0);
        }
        compound_factor("discount", self.annual_rate, years)
    }

    /// Amount `years` out expressed in base-year dollars
    pub fn present_value(&self, amount: f64, years: u32) -> Result<f64> {
        Ok(amount / self.discount_factor(years)?)
    }
}

/// (1 + rate)^years, rejecting a zero or non-finite result
pub fn compound_factor(kind: &str, rate: f64, years: u32) -> Result<f64> {
    let exponent = i32::try_from(years)
        .map_err(|_| ProjectionError::Computation(format!("{} exponent {} out of range", kind, years)))?;
    let factor = (1.0 + rate).powi(exponent);
    if factor == 0.0 || !factor.is_finite() {
        return Err(ProjectionError::Computation(format!(
            "{} factor for rate {} over {} years is {}",
            kind, rate, years, factor
        )));
    }
    Ok(factor)
}

/// Prices items for a given base year and discount curve
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    base_year: i32,
    curve: DiscountCurve,
}

impl CostModel {
    pub fn new(base_year: i32, curve: DiscountCurve) -> Self {
        Self { base_year, curve }
    }

    pub fn from_settings(settings: &ProjectionSettings) -> Self {
        Self::new(settings.base_year, DiscountCurve::from_settings(settings))
    }

    pub fn curve(&self) -> &DiscountCurve {
        &self.curve
    }

    /// Cost of `item` in `year` at timing weight `weight`
    ///
    /// nominal = unit_cost × frequency × (1 + inflation)^elapsed × weight
    pub fn cost_at(&self, item: &Item, year: i32, weight: f64) -> Result<CostPair> {
        if weight == 0.0 {
            return Ok(CostPair::default());
        }

        let elapsed = u32::try_from(year - self.base_year).map_err(|_| {
            ProjectionError::Computation(format!(
                "year {} precedes base year {}",
                year, self.base_year
            ))
        })?;

        let growth = compound_factor("inflation", item.inflation_rate, elapsed)?;
        let nominal = item.base_annual_cost() * growth * weight;
        let present_value = self.curve.present_value(nominal, elapsed)?;

        Ok(CostPair { nominal, present_value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn item(inflation: f64) -> Item {
        Item::recurring("Visit", 100.0, 1.0, inflation, 2025, 2025).unwrap()
    }

    #[test]
    fn test_base_year_cost() {
        let model = CostModel::new(2025, DiscountCurve::single_rate(0.0));
        let cost = model.cost_at(&item(0.0), 2025, 1.0).unwrap();
        assert_eq!(cost.nominal, 100.0);
        assert_eq!(cost.present_value, 100.0);
    }

    #[test]
    fn test_inflation_one_year_out() {
        let model = CostModel::new(2025, DiscountCurve::single_rate(0.0));
        let cost = model.cost_at(&item(0.10), 2026, 1.0).unwrap();
        assert_relative_eq!(cost.nominal, 110.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_discount_is_exact() {
        let model = CostModel::new(2025, DiscountCurve::single_rate(0.0));
        for year in 2025..2070 {
            let cost = model.cost_at(&item(0.037), year, 1.0).unwrap();
            assert_eq!(cost.present_value, cost.nominal);
        }
    }

    #[test]
    fn test_discounting() {
        let model = CostModel::new(2025, DiscountCurve::single_rate(0.05));
        let cost = model.cost_at(&item(0.0), 2027, 1.0).unwrap();
        assert_relative_eq!(cost.present_value, 100.0 / 1.05_f64.powi(2), epsilon = 1e-9);
    }

    #[test]
    fn test_disabled_discounting() {
        let model = CostModel::new(2025, DiscountCurve::disabled());
        let cost = model.cost_at(&item(0.03), 2040, 1.0).unwrap();
        assert_eq!(cost.present_value, cost.nominal);
    }

    #[test]
    fn test_weight_prorates_with_integer_exponent() {
        let model = CostModel::new(2025, DiscountCurve::single_rate(0.0));
        let cost = model.cost_at(&item(0.10), 2027, 0.5).unwrap();
        assert_relative_eq!(cost.nominal, 100.0 * 1.21 * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_year_before_base_is_computation_error() {
        let model = CostModel::new(2025, DiscountCurve::single_rate(0.03));
        let result = model.cost_at(&item(0.0), 2024, 1.0);
        assert!(matches!(result, Err(ProjectionError::Computation(_))));
    }

    #[test]
    fn test_zero_discount_factor_guarded() {
        let curve = DiscountCurve::single_rate(-1.0);
        assert!(matches!(curve.present_value(100.0, 3), Err(ProjectionError::Computation(_))));
    }
}
