//! Seller hub library.

// Domain
pub mod analytics;
pub mod exchange;
pub mod providers;
pub mod rank;
pub mod store;

// Surfaces
pub mod auth;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::schema::HubConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
