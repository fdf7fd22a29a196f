//! Priced care items and their timing

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// When an item applies within the projection horizon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Timing {
    /// Every year in the inclusive range
    Recurring { start_year: i32, end_year: i32 },
    /// Only the listed years
    Discrete { years: BTreeSet<i32> },
    /// Exactly once
    OneTime { year: i32 },
}

impl Timing {
    /// Whether the item is active in `year`, ignoring any proration
    pub fn occurs_in(&self, year: i32) -> bool {
        match self {
            Timing::Recurring { start_year, end_year } => (*start_year..=*end_year).contains(&year),
            Timing::Discrete { years } => years.contains(&year),
            Timing::OneTime { year: y } => *y == year,
        }
    }

    /// Earliest active year, if any
    pub fn first_year(&self) -> Option<i32> {
        match self {
            Timing::Recurring { start_year, .. } => Some(*start_year),
            Timing::Discrete { years } => years.first().copied(),
            Timing::OneTime { year } => Some(*year),
        }
    }

    /// Latest active year, if any
    pub fn last_year(&self) -> Option<i32> {
        match self {
            Timing::Recurring { end_year, .. } => Some(*end_year),
            Timing::Discrete { years } => years.last().copied(),
            Timing::OneTime { year } => Some(*year),
        }
    }

    /// Active years clipped to `[first, last]`
    pub fn years_within(&self, first: i32, last: i32) -> BTreeSet<i32> {
        match self {
            Timing::Recurring { start_year, end_year } => {
                let lo = (*start_year).max(first);
                let hi = (*end_year).min(last);
                (lo..=hi).collect()
            }
            Timing::Discrete { years } => years.range(first..=last).copied().collect(),
            Timing::OneTime { year } => {
                if (first..=last).contains(year) {
                    BTreeSet::from([*year])
                } else {
                    BTreeSet::new()
                }
            }
        }
    }

    /// Number of active years within `[first, last]`
    pub fn active_years_within(&self, first: i32, last: i32) -> usize {
        match self {
            Timing::Recurring { start_year, end_year } => {
                let lo = (*start_year).max(first);
                let hi = (*end_year).min(last);
                if hi < lo { 0 } else { (hi - lo + 1) as usize }
            }
            _ => self.years_within(first, last).len(),
        }
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timing::Recurring { start_year, end_year } => write!(f, "{}-{}", start_year, end_year),
            Timing::Discrete { years } => {
                let listed: Vec<String> = years.iter().map(|y| y.to_string()).collect();
                write!(f, "{}", listed.join(", "))
            }
            Timing::OneTime { year } => write!(f, "{} (one-time)", year),
        }
    }
}

/// A single priced item in the catalog
///
/// `unit_cost` is always a resolved point cost; cost ranges are averaged
/// before an `Item` is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub name: String,

    /// Cost per occurrence in base-year dollars
    pub unit_cost: f64,

    /// Occurrences per active year (may be fractional)
    pub frequency_per_year: f64,

    /// Annual inflation rate as a decimal (0.035 = 3.5%)
    pub inflation_rate: f64,

    pub timing: Timing,
}

impl Item {
    /// Create a validated item
    pub fn new(
        name: impl Into<String>,
        unit_cost: f64,
        frequency_per_year: f64,
        inflation_rate: f64,
        timing: Timing,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();

        check_non_negative(&name, "unit_cost", unit_cost)?;
        check_non_negative(&name, "frequency_per_year", frequency_per_year)?;

        if !inflation_rate.is_finite() || inflation_rate <= -1.0 {
            return Err(ConfigurationError::InvalidRate {
                field: "inflation_rate",
                value: inflation_rate,
            });
        }

        if let Timing::Recurring { start_year, end_year } = &timing {
            if start_year > end_year {
                return Err(ConfigurationError::InvertedYearRange {
                    item: name,
                    start: *start_year,
                    end: *end_year,
                });
            }
        }

        Ok(Self {
            name,
            unit_cost,
            frequency_per_year,
            inflation_rate,
            timing,
        })
    }

    /// Item applying every year from `start_year` through `end_year`
    pub fn recurring(
        name: impl Into<String>,
        unit_cost: f64,
        frequency_per_year: f64,
        inflation_rate: f64,
        start_year: i32,
        end_year: i32,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            name,
            unit_cost,
            frequency_per_year,
            inflation_rate,
            Timing::Recurring { start_year, end_year },
        )
    }

    /// Item applying only in the listed years (duplicates collapse)
    pub fn discrete(
        name: impl Into<String>,
        unit_cost: f64,
        frequency_per_year: f64,
        inflation_rate: f64,
        years: impl IntoIterator<Item = i32>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let years: BTreeSet<i32> = years.into_iter().collect();
        if years.is_empty() {
            return Err(ConfigurationError::EmptyOccurrences { item: name });
        }
        Self::new(name, unit_cost, frequency_per_year, inflation_rate, Timing::Discrete { years })
    }

    /// Item applying once; frequency is fixed at 1
    pub fn one_time(
        name: impl Into<String>,
        unit_cost: f64,
        inflation_rate: f64,
        year: i32,
    ) -> Result<Self, ConfigurationError> {
        Self::new(name, unit_cost, 1.0, inflation_rate, Timing::OneTime { year })
    }

    /// Uninflated cost for one full active year
    pub fn base_annual_cost(&self) -> f64 {
        self.unit_cost * self.frequency_per_year
    }
}

fn check_non_negative(item: &str, field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigurationError::NegativeValue {
            item: item.to_string(),
            field,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurring_occurs_inclusive() {
        let timing = Timing::Recurring { start_year: 2025, end_year: 2027 };
        assert!(!timing.occurs_in(2024));
        assert!(timing.occurs_in(2025));
        assert!(timing.occurs_in(2027));
        assert!(!timing.occurs_in(2028));
    }

    #[test]
    fn test_discrete_years_deduplicated() {
        let item = Item::discrete("Wheelchair", 2500.0, 1.0, 0.03, [2035, 2025, 2035, 2045]).unwrap();
        match &item.timing {
            Timing::Discrete { years } => {
                assert_eq!(years.iter().copied().collect::<Vec<_>>(), vec![2025, 2035, 2045]);
            }
            other => panic!("unexpected timing {:?}", other),
        }
    }

    #[test]
    fn test_empty_discrete_rejected() {
        let err = Item::discrete("Nothing", 10.0, 1.0, 0.0, Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyOccurrences { .. }));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = Item::recurring("PT", 150.0, 52.0, 0.04, 2030, 2025).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvertedYearRange { item: "PT".into(), start: 2030, end: 2025 }
        );
    }

    #[test]
    fn test_negative_cost_and_frequency_rejected() {
        assert!(Item::recurring("A", -1.0, 1.0, 0.0, 2025, 2025).is_err());
        assert!(Item::recurring("A", 1.0, -0.5, 0.0, 2025, 2025).is_err());
        assert!(Item::recurring("A", 1.0, f64::NAN, 0.0, 2025, 2025).is_err());
    }

    #[test]
    fn test_zero_frequency_allowed() {
        let item = Item::recurring("Paused", 100.0, 0.0, 0.02, 2025, 2030).unwrap();
        assert_eq!(item.base_annual_cost(), 0.0);
    }

    #[test]
    fn test_one_time_has_unit_frequency() {
        let item = Item::one_time("Surgery", 75_000.0, 0.05, 2027).unwrap();
        assert_eq!(item.frequency_per_year, 1.0);
        assert!(item.timing.occurs_in(2027));
        assert!(!item.timing.occurs_in(2028));
    }

    #[test]
    fn test_years_within_clips_to_horizon() {
        let timing = Timing::Recurring { start_year: 2020, end_year: 2100 };
        assert_eq!(timing.active_years_within(2025, 2029), 5);
        assert_eq!(timing.years_within(2025, 2029).len(), 5);

        let outside = Timing::OneTime { year: 2200 };
        assert!(outside.years_within(2025, 2064).is_empty());
    }

    #[test]
    fn test_timing_display() {
        assert_eq!(Timing::Recurring { start_year: 2025, end_year: 2054 }.to_string(), "2025-2054");
        assert_eq!(Timing::OneTime { year: 2030 }.to_string(), "2030 (one-time)");
        let discrete = Timing::Discrete { years: BTreeSet::from([2027, 2045]) };
        assert_eq!(discrete.to_string(), "2027, 2045");
    }
}
