//! Load catalog items from a flat CSV file
//!
//! One row per item; rows are grouped into categories in first-seen order.

use crate::error::{ConfigurationError, ProjectionError, Result};
use crate::plan::{CategoryConfig, CostRange, ItemConfig};
use csv::Reader;
use std::path::Path;

/// Raw CSV row matching the item export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "UnitCost")]
    unit_cost: Option<f64>,
    #[serde(rename = "CostLow")]
    cost_low: Option<f64>,
    #[serde(rename = "CostHigh")]
    cost_high: Option<f64>,
    #[serde(rename = "Frequency")]
    frequency: Option<f64>,
    #[serde(rename = "InflationRate")]
    inflation_rate: Option<f64>,
    #[serde(rename = "StartYear")]
    start_year: Option<i32>,
    #[serde(rename = "EndYear")]
    end_year: Option<i32>,
    /// Semicolon-separated, e.g. "2027;2045"
    #[serde(rename = "OccurrenceYears")]
    occurrence_years: Option<String>,
    #[serde(rename = "OneTimeYear")]
    one_time_year: Option<i32>,
}

impl CsvRow {
    fn to_item_config(self) -> Result<(String, ItemConfig)> {
        let cost_range = match (self.cost_low, self.cost_high) {
            (Some(low), Some(high)) => Some(CostRange { low, high }),
            (None, None) => None,
            _ => {
                return Err(ConfigurationError::InvalidField(format!(
                    "item '{}': CostLow and CostHigh must be given together",
                    self.name
                ))
                .into())
            }
        };

        let occurrence_years = match self.occurrence_years.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_years(&self.name, raw)?),
        };

        let item = ItemConfig {
            name: self.name,
            unit_cost: self.unit_cost,
            cost_range,
            frequency_per_year: self.frequency.unwrap_or(1.0),
            inflation_rate: self.inflation_rate,
            start_year: self.start_year,
            end_year: self.end_year,
            occurrence_years,
            one_time_year: self.one_time_year,
            interval: None,
            distributed: None,
        };
        Ok((self.category, item))
    }
}

fn parse_years(item: &str, raw: &str) -> Result<Vec<i32>> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>().map_err(|_| {
                ProjectionError::from(ConfigurationError::InvalidField(format!(
                    "item '{}': '{}' is not a year",
                    item, s
                )))
            })
        })
        .collect()
}

fn group_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<CategoryConfig>> {
    let mut categories: Vec<CategoryConfig> = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let (category_name, item) = row.to_item_config()?;

        match categories.iter_mut().find(|c| c.name == category_name) {
            Some(category) => category.items.push(item),
            None => categories.push(CategoryConfig {
                name: category_name,
                default_inflation_rate: 0.0,
                items: vec![item],
            }),
        }
    }

    Ok(categories)
}

/// Load categories from a CSV file
pub fn load_categories<P: AsRef<Path>>(path: P) -> Result<Vec<CategoryConfig>> {
    group_rows(Reader::from_path(path)?)
}

/// Load categories from any reader
pub fn load_categories_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<CategoryConfig>> {
    group_rows(Reader::from_reader(reader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{config::build_catalog, ProjectionSettings};
    use crate::catalog::Timing;

    const SAMPLE: &str = "\
Category,Name,UnitCost,CostLow,CostHigh,Frequency,InflationRate,StartYear,EndYear,OccurrenceYears,OneTimeYear
Medications,Gabapentin,277.40,,,12,0.016,2025,2064,,
Surgeries,Shoulder Arthroscopy,,120000,141200.9,1,0.035,,,2030;2045,
Medications,Baclofen,45.00,,,12,0.05,2025,,,
Surgeries,Revision,50000,,,1,0.035,,,,2050
";

    #[test]
    fn test_rows_grouped_by_category() {
        let categories = load_categories_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Medications");
        assert_eq!(categories[0].items.len(), 2);
        assert_eq!(categories[1].items.len(), 2);
    }

    #[test]
    fn test_csv_items_build_catalog() {
        let categories = load_categories_from_reader(SAMPLE.as_bytes()).unwrap();
        let settings = ProjectionSettings::new(2025, 39.4, 0.035).unwrap();
        let catalog = build_catalog(&categories, &settings).unwrap();

        let surgery = catalog.get("Surgeries").unwrap().get_item("Shoulder Arthroscopy").unwrap();
        assert!((surgery.unit_cost - 130_600.45).abs() < 1e-9);
        assert!(matches!(surgery.timing, Timing::Discrete { .. }));

        let baclofen = catalog.get("Medications").unwrap().get_item("Baclofen").unwrap();
        assert_eq!(baclofen.timing, Timing::Recurring { start_year: 2025, end_year: 2064 });
    }

    #[test]
    fn test_half_cost_range_rejected() {
        let csv = "\
Category,Name,UnitCost,CostLow,CostHigh,Frequency,InflationRate,StartYear,EndYear,OccurrenceYears,OneTimeYear
Equipment,Bed,,100,,1,0.02,2025,2030,,
";
        assert!(load_categories_from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_bad_occurrence_year_rejected() {
        let csv = "\
Category,Name,UnitCost,CostLow,CostHigh,Frequency,InflationRate,StartYear,EndYear,OccurrenceYears,OneTimeYear
Equipment,Chair,2500,,,1,0.03,,,2025;soon,
";
        assert!(load_categories_from_reader(csv.as_bytes()).is_err());
    }
}
