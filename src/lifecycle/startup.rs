//! Startup configuration resolution.
//!
//! Order of precedence: built-in defaults, then the config file, then
//! command line overrides. The merged result is validated once more so an
//! override cannot smuggle in a bad value.

use std::path::Path;

use crate::config::loader::{load_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::ServiceConfig;

/// Build the configuration the server starts with.
pub fn resolve_config(
    path: Option<&Path>,
    bind_override: Option<&str>,
) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(bind) = bind_override {
        config.listener.bind_address = bind.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
