use anyhow::{Context, Result};
use group_slots::SchedulingConfig;
use std::path::{Path, PathBuf};

/// Default config location (~/.config/group-slots/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("group-slots").join("config.toml"))
}

/// Load the scheduling config from `path`, or from the default location if it
/// exists. Falls back to built-in defaults when neither is available.
pub fn load_config(path: Option<&Path>) -> Result<SchedulingConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(SchedulingConfig::default()),
        },
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: SchedulingConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file at {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded scheduling config");
    Ok(config)
}
