//! Cost projection: timing resolution, inflation/discounting and schedule building

pub mod timing;
mod discount;
mod schedule;
mod summary;
mod engine;

pub use discount::{compound_factor, CostModel, CostPair, DiscountCurve};
pub use schedule::{CostSchedule, CostScheduleRow, ItemColumn};
pub use summary::{CategorySummary, ItemSummary, Summary};
pub use engine::{project, ProjectionResult, ScheduleBuilder};
