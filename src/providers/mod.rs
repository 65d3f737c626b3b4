//! Third-party providers and their deterministic stand-ins.
//!
//! # Data Flow
//! ```text
//! Handler
//!     → settings.rs (current keys; live or stub?)
//!         live → llm.rs / serp.rs (HTTP JSON APIs)
//!         stub → seo.rs / social.rs generators (hash.rs seeded)
//! ```
//!
//! A missing key is never an error: the stub answers. Once a key is set,
//! provider failures are reported to the caller.

pub mod hash;
pub mod llm;
pub mod serp;
pub mod seo;
pub mod settings;
pub mod social;

use thiserror::Error;

pub use settings::{Mode, ProviderModes, Providers, SettingsUpdate, SettingsView};

/// Errors from live provider calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(String),

    #[error("provider request timed out")]
    Timeout,

    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} reported an error: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
    },

    #[error("unexpected provider response: {0}")]
    Decode(String),

    #[error("invalid {field} '{value}': {reason}")]
    InvalidSetting {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Http(e.to_string())
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
