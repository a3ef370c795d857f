use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use voltran_inventory::{MovementRequest, TransactionKind};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::OwnerContext;

pub fn router() -> Router {
    Router::new()
        .route("/inward", get(list_inward).post(record_inward))
        .route("/outward", get(list_outward).post(record_outward))
}

async fn list(services: &AppServices, owner: &OwnerContext, kind: TransactionKind) -> axum::response::Response {
    match services.ledger().list(owner.owner_id(), kind).await {
        Ok(items) => {
            let items = items.iter().map(dto::enriched_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

async fn record(
    services: &AppServices,
    owner: &OwnerContext,
    request: MovementRequest,
) -> axum::response::Response {
    match services.ledger().record(owner.owner_id(), request).await {
        Ok(enriched) => (StatusCode::CREATED, Json(dto::enriched_to_json(&enriched))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_inward(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
) -> axum::response::Response {
    list(&services, &owner, TransactionKind::Inward).await
}

pub async fn list_outward(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
) -> axum::response::Response {
    list(&services, &owner, TransactionKind::Outward).await
}

pub async fn record_inward(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    body: Result<Json<dto::InwardRequest>, JsonRejection>,
) -> axum::response::Response {
    let request = match body {
        Ok(Json(b)) => b.into_movement(),
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    match request {
        Ok(r) => record(&services, &owner, r).await,
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn record_outward(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    body: Result<Json<dto::OutwardRequest>, JsonRejection>,
) -> axum::response::Response {
    let request = match body {
        Ok(Json(b)) => b.into_movement(),
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    match request {
        Ok(r) => record(&services, &owner, r).await,
        Err(e) => errors::ledger_error_to_response(e),
    }
}
