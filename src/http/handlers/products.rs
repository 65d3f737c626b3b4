//! Product CRUD and the product detail view.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::analytics::{summarize, DateRange, Totals};
use crate::auth::UserContext;
use crate::http::error::{ApiError, ApiResult};
use crate::http::handlers::rank::KeywordView;
use crate::http::server::AppState;
use crate::providers::seo::{seo_report, SeoReport};
use crate::rank::latest_by_keyword;
use crate::routing::Page;
use crate::store::{NewProduct, Product, ProductPatch, SocialPost};

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub page: Page,
    pub product: Product,
    pub seo: SeoReport,
    pub keywords: Vec<KeywordView>,
    pub posts: Vec<SocialPost>,
    pub sales: Totals,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.store.list_products(&user).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".into()));
    }
    let product = Product::create(user.user_id, body);
    let mut stored = state.store.insert_products(&user, vec![product]).await?;
    let product = stored
        .pop()
        .ok_or_else(|| ApiError::Internal("store returned no product".into()))?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProductDetail>> {
    let product = state.store.get_product(&user, id).await?;

    let keywords: Vec<_> = state
        .store
        .list_keywords(&user)
        .await?
        .into_iter()
        .filter(|k| k.product_id == id)
        .collect();
    let keyword_ids: Vec<Uuid> = keywords.iter().map(|k| k.id).collect();
    let latest = latest_by_keyword(&state.store.ranks_for(&user, &keyword_ids).await?);
    let keywords = keywords
        .into_iter()
        .map(|keyword| KeywordView {
            latest: latest.get(&keyword.id).cloned(),
            product_title: product.title.clone(),
            keyword,
        })
        .collect();

    let posts = state
        .store
        .list_posts(&user)
        .await?
        .into_iter()
        .filter(|p| p.product_id == id)
        .collect();

    let sales: Vec<_> = state
        .store
        .list_sales(&user)
        .await?
        .into_iter()
        .filter(|s| s.product_id == id)
        .collect();
    let sales = summarize(&sales, std::slice::from_ref(&product), DateRange::default()).totals;

    Ok(Json(ProductDetail {
        page: Page::Product(id),
        seo: seo_report(&product),
        product,
        keywords,
        posts,
        sales,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<Json<Product>> {
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("title cannot be empty".into()));
    }
    Ok(Json(state.store.update_product(&user, id, patch).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete_product(&user, id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
