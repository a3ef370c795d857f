use axum::{routing::get, Router};

pub mod dashboard;
pub mod materials;
pub mod system;
pub mod transactions;

/// Router for all authenticated (owner-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/api/whoami", get(system::whoami))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .nest("/api/materials", materials::router())
        .nest("/api/transactions", transactions::router())
}
