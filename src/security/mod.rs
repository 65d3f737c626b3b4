//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → tower-http body limit (security.max_body_size)
//!     → rate_limit.rs (per-client token bucket, when enabled)
//!     → auth middleware (protected routes)
//! ```

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiterState};
