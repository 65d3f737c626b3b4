//! CSV upload and product export.

use axum::{extract::State, response::Response, Extension, Json};

use crate::auth::UserContext;
use crate::exchange::{export_products as write_products, parse_products, parse_sales, ImportReport};
use crate::http::error::ApiResult;
use crate::http::handlers::csv_response;
use crate::http::server::AppState;
use crate::store::Product;

pub async fn import_products(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    body: String,
) -> ApiResult<Json<ImportReport>> {
    let parsed = parse_products(&body)?;
    let products = parsed
        .records
        .into_iter()
        .map(|new| Product::create(user.user_id, new))
        .collect::<Vec<_>>();
    let imported = if products.is_empty() {
        0
    } else {
        state.store.insert_products(&user, products).await?.len()
    };
    tracing::info!(imported, skipped = parsed.errors.len(), "Imported products");
    Ok(Json(ImportReport {
        imported,
        errors: parsed.errors,
    }))
}

pub async fn import_sales(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    body: String,
) -> ApiResult<Json<ImportReport>> {
    let products = state.store.list_products(&user).await?;
    let parsed = parse_sales(&body, user.user_id, &products)?;
    let imported = if parsed.records.is_empty() {
        0
    } else {
        state.store.insert_sales(&user, parsed.records).await?.len()
    };
    tracing::info!(imported, skipped = parsed.errors.len(), "Imported sales");
    Ok(Json(ImportReport {
        imported,
        errors: parsed.errors,
    }))
}

pub async fn export_products(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Response> {
    let products = state.store.list_products(&user).await?;
    Ok(csv_response(write_products(&products)?, "products.csv"))
}
