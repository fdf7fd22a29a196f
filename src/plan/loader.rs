//! Load plan files (JSON)

use super::config::PlanConfig;
use crate::error::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default location of the bundled sample plan
pub const DEFAULT_PLAN_PATH: &str = "data/sample_plan.json";

/// Read a plan config from a JSON file
pub fn load_plan_config<P: AsRef<Path>>(path: P) -> Result<PlanConfig> {
    let path = path.as_ref();
    log::debug!("loading plan config from {}", path.display());
    let file = File::open(path)?;
    load_plan_config_from_reader(BufReader::new(file))
}

/// Read a plan config from any reader (string buffer, stdin, ...)
pub fn load_plan_config_from_reader<R: std::io::Read>(reader: R) -> Result<PlanConfig> {
    let config: PlanConfig = serde_json::from_reader(reader)?;
    Ok(config)
}
