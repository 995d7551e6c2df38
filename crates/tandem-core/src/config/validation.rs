//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");

    if config.jobs == 0 {
        return Err(invalid("jobs", "must be at least 1"));
    }

    if config.build_script.trim().is_empty() {
        return Err(invalid("build_script", "build script cannot be empty"));
    }

    if config.affected.base.trim().is_empty() {
        return Err(invalid("affected.base", "base revision cannot be empty"));
    }

    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: &str, message: &str) -> crate::error::TandemError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_build_script() {
        let mut config = Config::default();
        config.build_script = " ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_base() {
        let mut config = Config::default();
        config.affected.base.clear();
        assert!(validate_config(&config).is_err());
    }
}
