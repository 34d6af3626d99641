use crate::benchmark::BenchmarkConfig;
use crate::currency::Currency;
use crate::errors::{EstimateError, EstimateResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "estimator.toml";

/// Settings read from `estimator.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub standard_table: PathBuf,
    pub luxury_table: PathBuf,
    pub output_dir: PathBuf,
    pub default_currency: Currency,
    /// Starting values for every session; sessions edit their own copy.
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            standard_table: PathBuf::from("data/realistic_materials.csv"),
            luxury_table: PathBuf::from("data/realistic_materials_luxury.csv"),
            output_dir: PathBuf::from("reports"),
            default_currency: Currency::Sar,
            benchmark: BenchmarkConfig::defaults(),
        }
    }
}

fn config_error(path: &Path, reason: impl ToString) -> EstimateError {
    EstimateError::Config {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Load `path`, or write the defaults there when it does not exist yet.
pub fn load_or_default(path: &Path) -> EstimateResult<AppConfig> {
    if path.exists() {
        let content = fs::read_to_string(path).map_err(|e| config_error(path, e))?;
        let cfg: AppConfig = toml::from_str(&content).map_err(|e| config_error(path, e))?;
        cfg.benchmark.validate()?;
        info!(target: "estimator.config", path = %path.display(), "Configuration loaded");
        Ok(cfg)
    } else {
        let cfg = AppConfig::default();
        cfg.save(path)?;
        info!(target: "estimator.config", path = %path.display(), "Default configuration written");
        Ok(cfg)
    }
}

impl AppConfig {
    pub fn save(&self, path: &Path) -> EstimateResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| config_error(path, e))?;
        fs::write(path, content).map_err(|e| config_error(path, e))
    }
}
