//! Sales analytics and demo data.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analytics::{demo_sales, summarize, AnalyticsSummary, DateRange};
use crate::auth::UserContext;
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::routing::Page;

const DEFAULT_DEMO_DAYS: u32 = 30;
const MAX_DEMO_DAYS: u32 = 365;

#[derive(Debug, Serialize)]
pub struct AnalyticsPage {
    pub page: Page,
    #[serde(flatten)]
    pub summary: AnalyticsSummary,
}

#[derive(Debug, Default, Deserialize)]
pub struct DemoQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct DemoResponse {
    pub products: usize,
    pub days: u32,
    pub inserted: usize,
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(range): Query<DateRange>,
) -> ApiResult<Json<AnalyticsPage>> {
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(ApiError::BadRequest(format!("from ({}) is after to ({})", from, to)));
        }
    }
    let products = state.store.list_products(&user).await?;
    let sales = state.store.list_sales(&user).await?;
    Ok(Json(AnalyticsPage {
        page: Page::Analytics,
        summary: summarize(&sales, &products, range),
    }))
}

/// Seed deterministic sales for every product, ending today.
pub async fn seed_demo(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<DemoQuery>,
) -> ApiResult<Json<DemoResponse>> {
    let days = query.days.unwrap_or(DEFAULT_DEMO_DAYS);
    if days == 0 || days > MAX_DEMO_DAYS {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {}",
            MAX_DEMO_DAYS
        )));
    }

    let products = state.store.list_products(&user).await?;
    let today = Utc::now().date_naive();
    let sales: Vec<_> = products
        .iter()
        .flat_map(|p| demo_sales(p, days, today))
        .collect();
    let inserted = if sales.is_empty() {
        0
    } else {
        state.store.insert_sales(&user, sales).await?.len()
    };
    tracing::info!(products = products.len(), days, inserted, "Seeded demo sales");

    Ok(Json(DemoResponse {
        products: products.len(),
        days,
        inserted,
    }))
}
