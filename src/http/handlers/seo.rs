//! SEO reports and copy variants.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::UserContext;
use crate::http::error::ApiResult;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::providers::seo::{seo_report, stub_variants, SeoReport, SeoVariant};
use crate::providers::Mode;
use crate::routing::Page;

#[derive(Debug, Serialize)]
pub struct SeoPage {
    pub page: Page,
    pub reports: Vec<SeoReport>,
}

#[derive(Debug, Serialize)]
pub struct VariantsResponse {
    pub product_id: Uuid,
    pub mode: Mode,
    pub variants: Vec<SeoVariant>,
}

pub async fn reports(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<SeoPage>> {
    let products = state.store.list_products(&user).await?;
    Ok(Json(SeoPage {
        page: Page::Seo,
        reports: products.iter().map(seo_report).collect(),
    }))
}

pub async fn variants(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<VariantsResponse>> {
    let product = state.store.get_product(&user, product_id).await?;

    let (mode, variants) = match state.providers.llm() {
        Some(llm) => (Mode::Live, llm.seo_variants(&product).await?),
        None => {
            metrics::record_provider_call("llm", "stub");
            (Mode::Stub, stub_variants(&product))
        }
    };
    tracing::info!(product_id = %product_id, mode = mode.as_str(), count = variants.len(), "Generated SEO variants");

    Ok(Json(VariantsResponse {
        product_id,
        mode,
        variants,
    }))
}
