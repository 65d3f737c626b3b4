//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, stub positions in 1..=50, addresses parse)
//! - Check that the hosted backend is fully described when selected
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{BackendMode, HubConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("backend.{0} is required when backend.mode = \"hosted\"")]
    HostedField(&'static str),

    #[error("backend.url '{0}' is not a valid URL")]
    BackendUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field} '{value}' is not a valid URL")]
    ProviderUrl { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Stub positions stay on the first five result pages.
const STUB_POSITION_RANGE: std::ops::RangeInclusive<u32> = 1..=50;

/// Validate a parsed configuration.
pub fn validate_config(config: &HubConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.backend.mode == BackendMode::Hosted {
        if config.backend.url.is_empty() {
            errors.push(ValidationError::HostedField("url"));
        } else if url::Url::parse(&config.backend.url).is_err() {
            errors.push(ValidationError::BackendUrl(config.backend.url.clone()));
        }
        if config.backend.anon_key.is_empty() {
            errors.push(ValidationError::HostedField("anon_key"));
        }
    }

    if url::Url::parse(&config.providers.llm_base_url).is_err() {
        errors.push(ValidationError::ProviderUrl {
            field: "providers.llm_base_url",
            value: config.providers.llm_base_url.clone(),
        });
    }
    if url::Url::parse(&config.providers.serp_base_url).is_err() {
        errors.push(ValidationError::ProviderUrl {
            field: "providers.serp_base_url",
            value: config.providers.serp_base_url.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.providers.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("providers.request_timeout_secs"));
    }
    if !STUB_POSITION_RANGE.contains(&config.rank.stub_max_position) {
        errors.push(ValidationError::OutOfRange {
            field: "rank.stub_max_position",
            value: config.rank.stub_max_position,
            min: *STUB_POSITION_RANGE.start(),
            max: *STUB_POSITION_RANGE.end(),
        });
    }
    if config.rate_limit.enabled && config.rate_limit.requests_per_second == 0 {
        errors.push(ValidationError::Zero("rate_limit.requests_per_second"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&HubConfig::default()).is_ok());
    }

    #[test]
    fn test_hosted_requires_url_and_key() {
        let mut config = HubConfig::default();
        config.backend.mode = BackendMode::Hosted;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::HostedField("url")));
        assert!(errors.contains(&ValidationError::HostedField("anon_key")));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = HubConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.rank.stub_max_position = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors[0].to_string(),
            "listener.bind_address 'not-an-address' is not a socket address"
        );
    }

    #[test]
    fn test_stub_positions_are_bounded() {
        let mut config = HubConfig::default();
        config.rank.stub_max_position = 10;
        assert!(validate_config(&config).is_ok());

        config.rank.stub_max_position = 51;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::OutOfRange {
                field: "rank.stub_max_position",
                value: 51,
                min: 1,
                max: 50,
            }]
        );
    }
}
