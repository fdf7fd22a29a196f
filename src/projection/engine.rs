//! Schedule builder: the year × item loop

use super::discount::{CostModel, CostPair};
use super::schedule::{CostSchedule, CostScheduleRow, ItemColumn};
use super::summary::{CategorySummary, Summary};
use super::timing;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::plan::{Evaluee, Plan, ProjectionSettings};
use serde::{Deserialize, Serialize};

/// Complete output of one projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub plan_name: String,
    pub schedule: CostSchedule,
    pub summary: Summary,
    pub categories: Vec<CategorySummary>,
}

/// Builds a cost schedule from settings and a catalog.
///
/// Holds only borrowed, immutable inputs; `build` can be called any number of
/// times and always yields the same schedule.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleBuilder<'a> {
    settings: &'a ProjectionSettings,
    catalog: &'a Catalog,
    evaluee: Option<&'a Evaluee>,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(settings: &'a ProjectionSettings, catalog: &'a Catalog) -> Self {
        Self {
            settings,
            catalog,
            evaluee: None,
        }
    }

    pub fn for_plan(plan: &'a Plan) -> Self {
        Self {
            settings: &plan.settings,
            catalog: &plan.catalog,
            evaluee: plan.evaluee.as_ref(),
        }
    }

    /// Attach an evaluee so rows carry the age in each year
    pub fn with_evaluee(mut self, evaluee: &'a Evaluee) -> Self {
        self.evaluee = Some(evaluee);
        self
    }

    /// Build just the schedule
    pub fn build_schedule(&self) -> Result<CostSchedule> {
        let model = CostModel::from_settings(self.settings);
        let mut schedule = self.empty_schedule();

        for period in self.settings.horizon() {
            let mut row = CostScheduleRow::new(
                period.year,
                period.years_elapsed,
                period.weight,
                schedule.columns.len(),
                schedule.categories.len(),
            );
            row.age = self.evaluee.map(|e| e.age_at(period.years_elapsed));

            let mut column = 0;
            for (category_idx, category) in self.catalog.categories().iter().enumerate() {
                let mut subtotal = CostPair::default();
                for item in &category.items {
                    let weight = timing::resolve(&item.timing, period.year, period.weight);
                    let cost = model.cost_at(item, period.year, weight)?;
                    row.item_costs[column] = cost;
                    subtotal.add(cost);
                    column += 1;
                }
                row.category_costs[category_idx] = subtotal;
                row.total_nominal += subtotal.nominal;
                row.total_present_value += subtotal.present_value;
            }

            schedule.push_row(row);
        }

        log::debug!(
            "built {} rows x {} items for {} (final weight {:.4})",
            schedule.len(),
            schedule.columns.len(),
            self.settings.period_label(),
            schedule.rows.last().map(|r| r.year_weight).unwrap_or(0.0),
        );

        Ok(schedule)
    }

    /// Build the schedule with its summary and category breakdown
    pub fn build(&self, plan_name: &str) -> Result<ProjectionResult> {
        let schedule = self.build_schedule()?;
        let summary = Summary::from_schedule(&schedule, self.settings);
        let categories = CategorySummary::from_schedule(&schedule, self.catalog);

        Ok(ProjectionResult {
            plan_name: plan_name.to_string(),
            schedule,
            summary,
            categories,
        })
    }

    fn empty_schedule(&self) -> CostSchedule {
        let categories = self
            .catalog
            .categories()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        let columns = self
            .catalog
            .categories()
            .iter()
            .enumerate()
            .flat_map(|(idx, c)| {
                c.items.iter().map(move |item| ItemColumn {
                    category: idx,
                    name: item.name.clone(),
                })
            })
            .collect();
        CostSchedule::new(categories, columns)
    }
}

/// Project a plan
pub fn project(plan: &Plan) -> Result<ProjectionResult> {
    log::info!(
        "projecting '{}' over {} years from {}",
        plan.name,
        plan.settings.projection_years,
        plan.settings.base_year
    );
    ScheduleBuilder::for_plan(plan).build(&plan.name)
}
