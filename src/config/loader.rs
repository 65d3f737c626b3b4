//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::HubConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SELLER_HUB_CONFIG";
/// Environment override for the LLM key.
pub const LLM_KEY_ENV: &str = "SELLER_HUB_LLM_API_KEY";
/// Environment override for the SERP key.
pub const SERP_KEY_ENV: &str = "SELLER_HUB_SERP_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<HubConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<HubConfig, ConfigError> {
    let mut config: HubConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Fill provider keys from the environment when the file leaves them unset.
pub fn apply_env_overrides(config: &mut HubConfig) {
    if config.providers.llm_api_key.is_none() {
        config.providers.llm_api_key = non_empty_env(LLM_KEY_ENV);
    }
    if config.providers.serp_api_key.is_none() {
        config.providers.serp_api_key = non_empty_env(SERP_KEY_ENV);
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackendMode;
    use std::io::Write;

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.rank.request_delay_ms, 1000);
        assert_eq!(config.backend.mode, BackendMode::Memory);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[listener]
bind_address = "127.0.0.1:9000"

[rank]
request_delay_ms = 250

[providers]
serp_api_key = "serp-test"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.rank.request_delay_ms, 250);
        assert_eq!(config.providers.serp_api_key.as_deref(), Some("serp-test"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = parse_config("[timeouts]\nrequest_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("timeouts.request_secs"));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
