//! Per-year applicability of an item

use crate::catalog::Timing;

/// Weight in `[0, 1]` of an item's annual cost in `year`.
///
/// `year_weight` is 1.0 for full years and the fractional remainder for the
/// terminal row. Recurring items are prorated by it; discrete and one-time
/// occurrences are events and always count in full.
pub fn resolve(timing: &Timing, year: i32, year_weight: f64) -> f64 {
    match timing {
        Timing::Recurring { start_year, end_year } => {
            if (*start_year..=*end_year).contains(&year) {
                year_weight
            } else {
                0.0
            }
        }
        Timing::Discrete { years } => {
            if years.contains(&year) {
                1.0
            } else {
                0.0
            }
        }
        Timing::OneTime { year: occurs } => {
            if *occurs == year {
                1.0
            } else {
                0.0
            }
        }
    }
}
