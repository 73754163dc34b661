//! Study configuration files.
//!
//! The file is JSON with the shape of `StudyConfig`. Every field is optional;
//! missing fields take their defaults, so a file overriding only the grid is
//! just `{"price_grid": {"low": 1800, "high": 2400, "step": 50}}`.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::StudyConfig;
use crate::error::AppError;

/// Read and validate a config file.
pub fn load_config(path: &Path) -> Result<StudyConfig, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open config JSON '{}': {e}", path.display())))?;
    let config: StudyConfig =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid config JSON: {e}")))?;
    config.validate()?;
    info!(path = %path.display(), "loaded study config");
    Ok(config)
}

/// Pretty JSON of `config`, suitable as a starting file for `--config`.
pub fn config_to_json(config: &StudyConfig) -> Result<String, AppError> {
    serde_json::to_string_pretty(config).map_err(|e| AppError::new(4, format!("Failed to serialize config: {e}")))
}
