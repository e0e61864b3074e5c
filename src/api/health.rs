use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;
use tracing::warn;

use crate::store::Store;

#[get("/")]
pub async fn index() -> impl Responder {
    "Attendance desk is running"
}

/// Liveness plus a store round trip
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable", body = Object, example = json!({"status": "ok"})),
        (status = 503, description = "Store unreachable", body = Object, example = json!({"status": "unavailable"}))
    ),
    tag = "Health"
)]
#[get("/health")]
pub async fn health(store: web::Data<dyn Store>) -> impl Responder {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({"status": "ok"})),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(json!({"status": "unavailable"}))
        }
    }
}
