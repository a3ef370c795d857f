use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::OwnerContext;

pub async fn get_dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
) -> axum::response::Response {
    match services.dashboard(owner.owner_id()).await {
        Ok(dashboard) => (StatusCode::OK, Json(dto::dashboard_to_json(&dashboard))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
