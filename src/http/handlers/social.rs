//! Social post generation, listing and CSV export.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserContext;
use crate::exchange::export_social;
use crate::http::error::{ApiError, ApiResult};
use crate::http::handlers::csv_response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::providers::social::stub_posts;
use crate::providers::Mode;
use crate::routing::Page;
use crate::store::{Network, SocialPost};

#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    /// Comma-separated network names; all networks when absent.
    pub networks: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SocialPage {
    pub page: Page,
    pub mode: Mode,
    pub posts: Vec<SocialPost>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub mode: Mode,
    pub posts: Vec<SocialPost>,
}

fn parse_networks(raw: Option<&str>) -> Result<Vec<Network>, ApiError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(Network::ALL.to_vec());
    };
    let mut networks = Vec::new();
    for name in raw.split(',').filter(|n| !n.trim().is_empty()) {
        let network: Network = name.parse().map_err(ApiError::BadRequest)?;
        if !networks.contains(&network) {
            networks.push(network);
        }
    }
    Ok(networks)
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<PostsQuery>,
) -> ApiResult<Json<SocialPage>> {
    let posts = state
        .store
        .list_posts(&user)
        .await?
        .into_iter()
        .filter(|p| query.product_id.map_or(true, |id| p.product_id == id))
        .collect();
    Ok(Json(SocialPage {
        page: Page::Social,
        mode: state.providers.modes().llm,
        posts,
    }))
}

pub async fn generate(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<GenerateQuery>,
) -> ApiResult<Json<GenerateResponse>> {
    let networks = parse_networks(query.networks.as_deref())?;
    let product = state.store.get_product(&user, product_id).await?;

    let (mode, generated) = match state.providers.llm() {
        Some(llm) => (Mode::Live, llm.social_posts(&product, &networks).await?),
        None => {
            metrics::record_provider_call("llm", "stub");
            (Mode::Stub, stub_posts(&product, &networks))
        }
    };

    let records = generated
        .into_iter()
        .map(|post| post.into_record(&user, product_id))
        .collect();
    let posts = state.store.insert_posts(&user, records).await?;
    tracing::info!(product_id = %product_id, mode = mode.as_str(), count = posts.len(), "Generated social posts");

    Ok(Json(GenerateResponse { mode, posts }))
}

pub async fn export(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<PostsQuery>,
) -> ApiResult<Response> {
    let posts: Vec<SocialPost> = state
        .store
        .list_posts(&user)
        .await?
        .into_iter()
        .filter(|p| query.product_id.map_or(true, |id| p.product_id == id))
        .collect();
    Ok(csv_response(export_social(&posts)?, "social_posts.csv"))
}
