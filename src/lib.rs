//! Care Cost Projection - long-horizon cost schedules for life care plans
//!
//! This library provides:
//! - A service catalog of categories and items with recurring, discrete or one-time timing
//! - Per-item inflation and optional present-value discounting
//! - Year-by-year schedules with fractional-year proration of the final row
//! - Category and grand totals, discount-rate sensitivity and reconciliation checks
//! - Scenario management, scenario comparison and horizon analysis

pub mod error;
pub mod catalog;
pub mod plan;
pub mod projection;
pub mod analysis;
pub mod scenario;

// Re-export commonly used types
pub use error::{ConfigurationError, ProjectionError, Result};
pub use catalog::{Catalog, Category, Item, Timing};
pub use plan::{Evaluee, Plan, PlanConfig, ProjectionSettings};
pub use projection::{project, CostSchedule, ProjectionResult, ScheduleBuilder, Summary};
pub use analysis::{AnalysisConfig, SensitivityReport, ValidationReport};
pub use scenario::{PlanReport, ScenarioRunner, ScenarioSet};
