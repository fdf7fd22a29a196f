//! Plan-level and per-category aggregates

use super::schedule::CostSchedule;
use crate::catalog::{Catalog, Timing};
use crate::plan::ProjectionSettings;
use serde::{Deserialize, Serialize};

/// Headline totals for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_nominal: f64,
    pub total_present_value: f64,

    /// total_nominal / projection_years (the real-valued horizon)
    pub average_annual_cost: f64,

    pub projection_years: f64,
    pub discount_rate: f64,
    pub discounting_enabled: bool,
    pub first_year: i32,
    pub last_year: i32,
    pub row_count: usize,
}

impl Summary {
    pub fn from_schedule(schedule: &CostSchedule, settings: &ProjectionSettings) -> Self {
        let totals = schedule.final_cumulative();
        Self {
            total_nominal: totals.nominal,
            total_present_value: totals.present_value,
            average_annual_cost: totals.nominal / settings.projection_years,
            projection_years: settings.projection_years,
            discount_rate: settings.discount_rate,
            discounting_enabled: settings.discounting_enabled,
            first_year: settings.first_year(),
            last_year: settings.last_year(),
            row_count: schedule.len(),
        }
    }

    /// Display label such as "2025-2064"
    pub fn projection_period(&self) -> String {
        format!("{}-{}", self.first_year, self.last_year)
    }
}

/// Totals for one item over the whole horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub name: String,
    pub unit_cost: f64,
    pub frequency_per_year: f64,
    pub inflation_rate: f64,
    pub timing: Timing,
    pub total_nominal: f64,
    pub total_present_value: f64,
}

/// Totals for one category over the whole horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub total_nominal: f64,
    pub total_present_value: f64,
    pub item_count: usize,
    pub items: Vec<ItemSummary>,
}

impl CategorySummary {
    /// Build per-category totals from the schedule's item columns.
    ///
    /// Works from item cells rather than the rows' category subtotals so the
    /// two can be reconciled against each other.
    pub fn from_schedule(schedule: &CostSchedule, catalog: &Catalog) -> Vec<Self> {
        let item_totals = schedule.item_totals();
        let mut columns = schedule.columns.iter().zip(item_totals);

        catalog
            .categories()
            .iter()
            .map(|category| {
                let items: Vec<ItemSummary> = category
                    .items
                    .iter()
                    .zip(columns.by_ref())
                    .map(|(item, (_, totals))| ItemSummary {
                        name: item.name.clone(),
                        unit_cost: item.unit_cost,
                        frequency_per_year: item.frequency_per_year,
                        inflation_rate: item.inflation_rate,
                        timing: item.timing.clone(),
                        total_nominal: totals.nominal,
                        total_present_value: totals.present_value,
                    })
                    .collect();

                CategorySummary {
                    name: category.name.clone(),
                    total_nominal: items.iter().map(|i| i.total_nominal).sum(),
                    total_present_value: items.iter().map(|i| i.total_present_value).sum(),
                    item_count: items.len(),
                    items,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{CostPair, CostScheduleRow, ItemColumn};

    #[test]
    fn test_average_uses_real_horizon() {
        let settings = ProjectionSettings::new(2025, 2.5, 0.0).unwrap();
        let mut schedule = CostSchedule::default();
        for (i, total) in [100.0, 100.0, 50.0].into_iter().enumerate() {
            let mut row = CostScheduleRow::new(2025 + i as i32, i as u32, 1.0, 0, 0);
            row.total_nominal = total;
            row.total_present_value = total;
            schedule.push_row(row);
        }

        let summary = Summary::from_schedule(&schedule, &settings);
        assert_eq!(summary.total_nominal, 250.0);
        assert_eq!(summary.average_annual_cost, 100.0);
        assert_eq!(summary.projection_period(), "2025-2027");
    }

    #[test]
    fn test_category_summary_groups_columns() {
        use crate::catalog::{Category, Item};

        let catalog = Catalog::new(vec![
            Category::new("A", 0.0)
                .with_item(Item::one_time("a1", 1.0, 0.0, 2025).unwrap())
                .with_item(Item::one_time("a2", 1.0, 0.0, 2025).unwrap()),
            Category::new("B", 0.0).with_item(Item::one_time("b1", 1.0, 0.0, 2025).unwrap()),
        ])
        .unwrap();

        let columns = vec![
            ItemColumn { category: 0, name: "a1".into() },
            ItemColumn { category: 0, name: "a2".into() },
            ItemColumn { category: 1, name: "b1".into() },
        ];
        let mut schedule = CostSchedule::new(vec!["A".into(), "B".into()], columns);
        let mut row = CostScheduleRow::new(2025, 0, 1.0, 3, 2);
        row.item_costs = vec![CostPair::new(1.0, 1.0), CostPair::new(2.0, 2.0), CostPair::new(4.0, 3.0)];
        schedule.push_row(row);

        let categories = CategorySummary::from_schedule(&schedule, &catalog);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].total_nominal, 3.0);
        assert_eq!(categories[0].item_count, 2);
        assert_eq!(categories[1].total_present_value, 3.0);
        assert_eq!(categories[1].items[0].name, "b1");
    }
}
