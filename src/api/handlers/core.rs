use axum::{extract::State, Json};
use serde_json::json;

use crate::api::types::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "database": state.db.path().to_string_lossy()
    }))
}
