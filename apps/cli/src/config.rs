//! Model constants from an optional YAML file.

use anyhow::{Context, Result};
use relief_core::ModelConfig;
use std::path::Path;
use tracing::info;

/// Parse YAML text; missing keys keep their defaults.
pub fn parse_config(text: &str) -> Result<ModelConfig> {
    if text.trim().is_empty() {
        return Ok(ModelConfig::default());
    }
    let cfg: ModelConfig = serde_yaml::from_str(text).context("invalid model config")?;
    Ok(cfg)
}

/// Load constants from `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ModelConfig> {
    let Some(path) = path else {
        return Ok(ModelConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg = parse_config(&text).with_context(|| format!("parsing {}", path.display()))?;
    info!(path = %path.display(), "loaded model config");
    Ok(cfg)
}
