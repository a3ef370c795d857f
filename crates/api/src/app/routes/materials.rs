use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use voltran_core::MaterialId;
use voltran_infra::LedgerError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::OwnerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_materials).post(create_material))
        .route(
            "/:id",
            get(get_material).put(update_material).delete(delete_material),
        )
        .route("/:id/transactions", get(material_history))
}

/// Ids that do not parse cannot name a material.
fn parse_id(raw: &str) -> Result<MaterialId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::ledger_error_to_response(LedgerError::NotFound))
}

pub async fn list_materials(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
) -> axum::response::Response {
    match services.ledger().materials().list(owner.owner_id()).await {
        Ok(items) => {
            let items = items.iter().map(dto::material_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger().materials().get(owner.owner_id(), id).await {
        Ok(m) => (StatusCode::OK, Json(dto::material_to_json(&m))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    body: Result<Json<dto::MaterialRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let draft = match body.into_draft() {
        Ok(d) => d,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services
        .ledger()
        .materials()
        .create(owner.owner_id(), draft, Utc::now())
        .await
    {
        Ok(m) => (StatusCode::CREATED, Json(dto::material_to_json(&m))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn update_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::MaterialRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let patch = match body.into_patch() {
        Ok(p) => p,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services
        .ledger()
        .materials()
        .update(owner.owner_id(), id, patch, Utc::now())
        .await
    {
        Ok(m) => (StatusCode::OK, Json(dto::material_to_json(&m))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger().materials().delete(owner.owner_id(), id).await {
        Ok(m) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Material deleted",
                "material": dto::material_to_json(&m),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn material_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger().history(owner.owner_id(), id).await {
        Ok(records) => {
            let items = records.iter().map(dto::enriched_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}
