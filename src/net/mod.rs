//! Network layer.
//!
//! Plain TCP listeners come straight from tokio; TLS termination goes through
//! axum-server with a rustls config loaded here.

pub mod tls;

pub use tls::load_tls_config;
