//! Page view models: landing, import, dashboard, health.

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Serialize;

use crate::analytics::{summarize, DateRange, Totals};
use crate::auth::UserContext;
use crate::exchange::{PRODUCT_COLUMNS, SALES_COLUMNS, SOCIAL_COLUMNS};
use crate::http::error::ApiResult;
use crate::http::handlers::rank::{keyword_views, KeywordView};
use crate::http::server::AppState;
use crate::providers::seo::seo_report;
use crate::providers::ProviderModes;
use crate::routing::Page;

const DASHBOARD_DAYS: u32 = 30;

#[derive(Debug, Serialize)]
pub struct RouteEntry {
    pub path: String,
    pub title: &'static str,
    pub requires_session: bool,
}

#[derive(Debug, Serialize)]
pub struct Landing {
    pub name: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
    pub modes: ProviderModes,
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Serialize)]
pub struct ImportView {
    pub page: Page,
    pub product_columns: [&'static str; 5],
    pub sales_columns: [&'static str; 5],
    pub social_columns: [&'static str; 4],
    pub products: usize,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub page: Page,
    pub products: usize,
    pub keywords: usize,
    pub posts: usize,
    /// Mean overall SEO score; `None` with no products.
    pub average_seo_score: Option<u8>,
    pub latest_ranks: Vec<KeywordView>,
    pub last_30_days: Totals,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn landing(State(state): State<AppState>) -> Json<Landing> {
    Json(Landing {
        name: "seller-hub",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.store.mode(),
        modes: state.providers.modes(),
        routes: Page::NAV
            .iter()
            .map(|page| RouteEntry {
                path: page.path(),
                title: page.title(),
                requires_session: page.requires_session(),
            })
            .collect(),
    })
}

pub async fn import_view(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<ImportView>> {
    Ok(Json(ImportView {
        page: Page::Import,
        product_columns: PRODUCT_COLUMNS,
        sales_columns: SALES_COLUMNS,
        social_columns: SOCIAL_COLUMNS,
        products: state.store.list_products(&user).await?.len(),
    }))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<Dashboard>> {
    let products = state.store.list_products(&user).await?;
    let posts = state.store.list_posts(&user).await?.len();
    let sales = state.store.list_sales(&user).await?;

    let mut latest_ranks: Vec<KeywordView> = keyword_views(&state, &user).await?;
    let keywords = latest_ranks.len();
    latest_ranks.retain(|k| k.latest.is_some());
    latest_ranks.sort_by(|a, b| {
        let fetched = |k: &KeywordView| k.latest.as_ref().map(|r| r.fetched_at);
        fetched(b).cmp(&fetched(a))
    });
    latest_ranks.truncate(10);

    let average_seo_score = if products.is_empty() {
        None
    } else {
        let total: u32 = products.iter().map(|p| u32::from(seo_report(p).overall)).sum();
        Some((total / products.len() as u32) as u8)
    };

    let range = DateRange::last_days(Utc::now().date_naive(), DASHBOARD_DAYS);
    let last_30_days = summarize(&sales, &products, range).totals;

    Ok(Json(Dashboard {
        page: Page::Dashboard,
        products: products.len(),
        keywords,
        posts,
        average_seo_score,
        latest_ranks,
        last_30_days,
    }))
}
