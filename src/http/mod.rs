//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum router, middleware stack)
//!     → request.rs (request id, trace span)
//!     → auth middleware (protected routes only)
//!     → handlers/* (page view models, JSON and CSV endpoints)
//!     → error.rs (ApiError → status + {"error": ...})
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;
pub mod websocket;

pub use error::{ApiError, ApiResult};
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
