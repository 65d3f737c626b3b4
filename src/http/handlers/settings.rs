//! Provider settings.

use axum::{extract::State, Json};

use crate::http::error::ApiResult;
use crate::http::server::AppState;
use crate::providers::{SettingsUpdate, SettingsView};

pub async fn show(State(state): State<AppState>) -> Json<SettingsView> {
    Json(state.providers.view())
}

pub async fn update(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<SettingsView>> {
    let view = state.providers.apply(update)?;
    Ok(Json(view))
}
