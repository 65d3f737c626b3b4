//! Keyword rank tracking.
//!
//! # Data Flow
//! ```text
//! POST /rank/refresh
//!     → refresh.rs (serial loop, delay between live requests)
//!     → resolver.rs (live SERP scan or deterministic stub)
//!     → Store::insert_rank
//!     → RefreshReport (per-keyword errors collected)
//! ```

pub mod refresh;
pub mod resolver;

pub use refresh::{latest_by_keyword, KeywordError, RankRefresher, RefreshReport};
pub use resolver::{find_position, normalize_url, stub_position, RankResolver};
