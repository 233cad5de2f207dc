//! Home page

use axum::extract::State;
use serde_json::json;

use super::Page;
use crate::{error::AppResult, AppState};

/// Record counts across the catalog
pub async fn index(State(state): State<AppState>) -> AppResult<Page> {
    let counts = state.services.catalog.counts().await?;
    Ok(Page::render(
        "index",
        json!({ "title": "Local Library Home", "data": counts }),
    ))
}
