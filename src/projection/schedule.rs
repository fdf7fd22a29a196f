//! Cost schedule output structures

use super::discount::CostPair;
use serde::{Deserialize, Serialize};

/// Identifies one item column of the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemColumn {
    /// Index into `CostSchedule::categories`
    pub category: usize,
    pub name: String,
}

/// A single year of the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostScheduleRow {
    // Timing
    pub year: i32,
    pub years_elapsed: u32,
    /// 1.0, or the fractional remainder for the terminal row
    pub year_weight: f64,
    pub age: Option<f64>,

    /// Aligned with `CostSchedule::columns`
    pub item_costs: Vec<CostPair>,

    /// Aligned with `CostSchedule::categories`
    pub category_costs: Vec<CostPair>,

    // Row totals
    pub total_nominal: f64,
    pub total_present_value: f64,

    // Running totals including this row
    pub cumulative_nominal: f64,
    pub cumulative_present_value: f64,
}

impl CostScheduleRow {
    pub fn new(year: i32, years_elapsed: u32, year_weight: f64, items: usize, categories: usize) -> Self {
        Self {
            year,
            years_elapsed,
            year_weight,
            age: None,
            item_costs: vec![CostPair::default(); items],
            category_costs: vec![CostPair::default(); categories],
            total_nominal: 0.0,
            total_present_value: 0.0,
            cumulative_nominal: 0.0,
            cumulative_present_value: 0.0,
        }
    }

    /// Whether this row covers only part of a year
    pub fn is_partial(&self) -> bool {
        self.year_weight < 1.0
    }
}

/// Ordered year-by-year schedule for a whole plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSchedule {
    pub categories: Vec<String>,
    pub columns: Vec<ItemColumn>,
    pub rows: Vec<CostScheduleRow>,
}

impl CostSchedule {
    pub fn new(categories: Vec<String>, columns: Vec<ItemColumn>) -> Self {
        Self {
            categories,
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, carrying the running totals forward from the previous one
    pub fn push_row(&mut self, mut row: CostScheduleRow) {
        let (prior_nominal, prior_pv) = self
            .rows
            .last()
            .map(|r| (r.cumulative_nominal, r.cumulative_present_value))
            .unwrap_or((0.0, 0.0));
        row.cumulative_nominal = prior_nominal + row.total_nominal;
        row.cumulative_present_value = prior_pv + row.total_present_value;
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The final row if it covers a partial year
    pub fn terminal_partial_row(&self) -> Option<&CostScheduleRow> {
        self.rows.last().filter(|r| r.is_partial())
    }

    pub fn row_for_year(&self, year: i32) -> Option<&CostScheduleRow> {
        self.rows.iter().find(|r| r.year == year)
    }

    /// Per-column totals over all rows
    pub fn item_totals(&self) -> Vec<CostPair> {
        let mut totals = vec![CostPair::default(); self.columns.len()];
        for row in &self.rows {
            for (total, cost) in totals.iter_mut().zip(&row.item_costs) {
                total.add(*cost);
            }
        }
        totals
    }

    /// Sum of row totals, accumulated independently of the running columns
    pub fn sum_of_row_totals(&self) -> CostPair {
        let mut sum = CostPair::default();
        for row in &self.rows {
            sum.add(CostPair::new(row.total_nominal, row.total_present_value));
        }
        sum
    }

    /// Final running totals
    pub fn final_cumulative(&self) -> CostPair {
        self.rows
            .last()
            .map(|r| CostPair::new(r.cumulative_nominal, r.cumulative_present_value))
            .unwrap_or_default()
    }
}
