//! Request handlers, one module per hub area.
//!
//! Protected handlers take the [`UserContext`](crate::auth::UserContext)
//! that the session middleware attached and pass it to every store call.

pub mod analytics;
pub mod auth;
pub mod import;
pub mod pages;
pub mod products;
pub mod rank;
pub mod seo;
pub mod settings;
pub mod social;

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};

/// A CSV download with an attachment filename.
pub(crate) fn csv_response(body: String, filename: &str) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
