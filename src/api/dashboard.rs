use actix_web::{HttpResponse, Responder, web};
use chrono::Local;

use crate::{service::dashboard, store::Store};

/// Headcount, today's attendance split and per-department headcount
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = crate::model::dashboard::DashboardSummary)
    ),
    tag = "Dashboard"
)]
pub async fn summary(store: web::Data<dyn Store>) -> actix_web::Result<impl Responder> {
    let today = Local::now().date_naive();
    let summary = dashboard::summary(store.get_ref(), today).await?;
    Ok(HttpResponse::Ok().json(summary))
}
