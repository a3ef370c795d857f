use axum::{extract::Extension, response::IntoResponse, Json};
use chrono::Utc;

use crate::context::OwnerContext;

pub async fn banner() -> &'static str {
    "Voltran Backend API is running"
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn whoami(Extension(owner): Extension<OwnerContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": owner.owner_id().to_string(),
        "username": owner.username(),
        "role": owner.role().as_str(),
    }))
}
