//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use engrave::{EngraveError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {err}")]
    Parse { err: toml::de::Error, src: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for EngraveError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Parse { err, src } => EngraveError::new_parse_error(err, src),
            ConfigError::MissingFile(_) => {
                EngraveError::Io(io::Error::new(io::ErrorKind::NotFound, err.to_string()))
            }
            ConfigError::Validation(_) => EngraveError::Io(io::Error::other(err.to_string())),
        }
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (engrave/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - The page leaves no room for systems
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, EngraveError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("engrave/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "engrave", "engrave") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, EngraveError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        err,
        src: content.clone(),
    })?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.style().spatium() <= 0.0 {
        return Err(ConfigError::Validation("spatium must be positive".to_string()));
    }

    let page = config.layout().page();
    if page.content_width() <= 0.0 {
        return Err(ConfigError::Validation(
            "page margins leave no horizontal space".to_string(),
        ));
    }
    if page.height() - page.top_margin() - page.bottom_margin() <= 0.0 {
        return Err(ConfigError::Validation(
            "page margins leave no vertical space".to_string(),
        ));
    }
    Ok(())
}
