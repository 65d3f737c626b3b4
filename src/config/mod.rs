//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + SELLER_HUB_* env vars
//!     → loader.rs (parse, deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → HubConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → provider settings swapped atomically
//! ```
//!
//! All fields have defaults to allow minimal configs.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendConfig, BackendMode, HubConfig, ListenerConfig, ObservabilityConfig, ProviderConfig,
    RankConfig, RateLimitConfig, SecurityConfig, TimeoutConfig, TlsConfig,
};
