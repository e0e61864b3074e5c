use crate::{
    model::attendance::{AttendanceFilter, AttendanceInput, AttendanceListResponse, AttendanceQuery},
    service::ledger,
    store::Store,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

/// List attendance with optional conjunctive filters
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Matching records, newest first", body = AttendanceListResponse),
        (status = 400, description = "Malformed filter value", body = crate::error::ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    store: web::Data<dyn Store>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let filter = AttendanceFilter::from(query.into_inner());
    let results = ledger::list(store.get_ref(), &filter).await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        count: results.len(),
        results,
    }))
}

/// Mark attendance
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceInput,
    responses(
        (status = 201, description = "Attendance recorded", body = crate::model::attendance::Attendance),
        (status = 400, description = "Validation failed, or already marked for this employee and date", body = crate::error::ErrorBody, example = json!({
            "errors": {"date": ["Attendance for this employee on 2024-01-01 already exists."]}
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee 1 not found"
        })),
        (status = 409, description = "Lost a concurrent write for the same employee and date", body = crate::error::ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn create_attendance(
    store: web::Data<dyn Store>,
    payload: web::Json<AttendanceInput>,
) -> actix_web::Result<impl Responder> {
    let record = ledger::create(store.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

/// Get one attendance record
#[utoipa::path(
    get,
    path = "/api/attendance/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Attendance found", body = crate::model::attendance::Attendance),
        (status = 404, description = "Attendance record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        }))
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let record = ledger::get(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Update attendance (partial)
#[utoipa::path(
    put,
    path = "/api/attendance/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "Attendance record ID")
    ),
    request_body = AttendanceInput,
    responses(
        (status = 200, description = "Attendance updated", body = crate::model::attendance::Attendance),
        (status = 400, description = "Validation failed, or already marked for this employee and date", body = crate::error::ErrorBody),
        (status = 404, description = "Attendance record or employee not found", body = Object),
        (status = 409, description = "Lost a concurrent write for the same employee and date", body = crate::error::ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn update_attendance(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<AttendanceInput>,
) -> actix_web::Result<impl Responder> {
    let record = ledger::update(store.get_ref(), path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Delete attendance
#[utoipa::path(
    delete,
    path = "/api/attendance/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Attendance deleted", body = Object, example = json!({
            "message": "Attendance record deleted."
        })),
        (status = 404, description = "Attendance record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        }))
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    ledger::delete(store.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance record deleted."
    })))
}
