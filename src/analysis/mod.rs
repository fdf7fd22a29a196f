//! Post-projection analysis: discount-rate sensitivity and reconciliation checks

mod sensitivity;
mod validation;

pub use sensitivity::{run_sensitivity, run_sensitivity_against, SensitivityReport, SensitivityVariant};
pub use validation::{validate, ValidationCheck, ValidationReport};

use serde::{Deserialize, Serialize};

/// Discount-rate shifts applied by default
pub const DEFAULT_SENSITIVITY_DELTAS: [f64; 5] = [-0.01, -0.005, 0.0, 0.005, 0.01];

/// Dollar tolerance for reconciliation checks
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// Configuration for the analysis run that follows a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Shifts added to the plan's discount rate
    pub sensitivity_deltas: Vec<f64>,

    /// Maximum dollar difference for a reconciliation check to pass
    pub tolerance: f64,

    /// Skip the sensitivity re-runs entirely
    pub run_sensitivity: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sensitivity_deltas: DEFAULT_SENSITIVITY_DELTAS.to_vec(),
            tolerance: DEFAULT_TOLERANCE,
            run_sensitivity: true,
        }
    }
}
