//! Keyword tracking and rank refresh.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::UserContext;
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::providers::Mode;
use crate::rank::{latest_by_keyword, RankRefresher, RankResolver, RefreshReport};
use crate::routing::Page;
use crate::store::{Keyword, NewKeyword, Rank};

/// A tracked keyword with its most recent rank.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordView {
    #[serde(flatten)]
    pub keyword: Keyword,
    pub product_title: String,
    pub latest: Option<Rank>,
}

#[derive(Debug, Serialize)]
pub struct RankPage {
    pub page: Page,
    pub mode: Mode,
    pub keywords: Vec<KeywordView>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    /// Only refresh keywords of this product.
    pub product_id: Option<Uuid>,
}

/// Tracked keywords joined with product titles and latest ranks, newest
/// keyword first.
pub(crate) async fn keyword_views(state: &AppState, user: &UserContext) -> ApiResult<Vec<KeywordView>> {
    let titles: HashMap<Uuid, String> = state
        .store
        .list_products(user)
        .await?
        .into_iter()
        .map(|p| (p.id, p.title))
        .collect();
    let keywords = state.store.list_keywords(user).await?;
    let ids: Vec<Uuid> = keywords.iter().map(|k| k.id).collect();
    let latest = latest_by_keyword(&state.store.ranks_for(user, &ids).await?);

    Ok(keywords
        .into_iter()
        .map(|keyword| KeywordView {
            product_title: titles.get(&keyword.product_id).cloned().unwrap_or_default(),
            latest: latest.get(&keyword.id).cloned(),
            keyword,
        })
        .collect())
}

pub async fn overview(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<RankPage>> {
    Ok(Json(RankPage {
        page: Page::Rank,
        mode: state.providers.modes().serp,
        keywords: keyword_views(&state, &user).await?,
    }))
}

pub async fn add_keyword(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewKeyword>,
) -> ApiResult<(StatusCode, Json<Keyword>)> {
    if body.phrase.trim().is_empty() {
        return Err(ApiError::BadRequest("phrase is required".into()));
    }
    let country = body.country.trim();
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::BadRequest(format!(
            "country must be a two-letter code, got '{}'",
            body.country
        )));
    }
    // Ownership check; the store only enforces that the product exists.
    state.store.get_product(&user, body.product_id).await?;

    let keyword = state
        .store
        .insert_keyword(&user, Keyword::create(user.user_id, body))
        .await?;
    tracing::info!(keyword_id = %keyword.id, phrase = %keyword.phrase, "Keyword tracked");
    Ok((StatusCode::CREATED, Json(keyword)))
}

pub async fn remove_keyword(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete_keyword(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn refresh(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<RefreshQuery>,
) -> ApiResult<Json<RefreshReport>> {
    let products = state.store.list_products(&user).await?;
    let keywords: Vec<Keyword> = state
        .store
        .list_keywords(&user)
        .await?
        .into_iter()
        .filter(|k| query.product_id.map_or(true, |id| k.product_id == id))
        .collect();

    let resolver = RankResolver::new(state.providers.serp(), state.rank.stub_max_position);
    let refresher = RankRefresher::new(
        &state.store,
        resolver,
        Duration::from_millis(state.rank.request_delay_ms),
    );
    Ok(Json(refresher.refresh(&user, &keywords, &products).await))
}
