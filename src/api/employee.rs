use crate::{
    model::{
        attendance::DateRangeQuery,
        employee::{EmployeeInput, EmployeeListResponse},
    },
    service::{ledger, registry},
    store::Store,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created successfully", body = crate::model::employee::Employee),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody, example = json!({
            "errors": {"email": ["An employee with this email already exists."]}
        })),
        (status = 409, description = "Lost a concurrent write on a unique field", body = crate::error::ErrorBody),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    store: web::Data<dyn Store>,
    payload: web::Json<EmployeeInput>,
) -> actix_web::Result<impl Responder> {
    let employee = registry::create(store.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(employee))
}

/// List Employees, ordered by full name
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Every employee with present-day totals", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(store: web::Data<dyn Store>) -> actix_web::Result<impl Responder> {
    let results = registry::list(store.get_ref()).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        count: results.len(),
        results,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = crate::model::employee::Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee = registry::get(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee (partial)
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated successfully", body = crate::model::employee::Employee),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<EmployeeInput>,
) -> actix_web::Result<impl Responder> {
    let employee =
        registry::update(store.get_ref(), path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee and all of its attendance
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Employee \"Ann Lee\" deleted successfully."
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let name = registry::delete(store.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Employee \"{name}\" deleted successfully.")
    })))
}

/// Attendance of one employee, with present/absent totals over the range
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/attendance",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Filtered attendance with totals", body = crate::model::attendance::EmployeeAttendanceResponse),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn employee_attendance(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    let DateRangeQuery {
        start_date,
        end_date,
    } = query.into_inner();

    let response =
        ledger::list_for_employee(store.get_ref(), path.into_inner(), start_date, end_date)
            .await?;
    Ok(HttpResponse::Ok().json(response))
}
