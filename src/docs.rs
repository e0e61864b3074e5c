use crate::error::ErrorBody;
use crate::model::attendance::{
    Attendance, AttendanceInput, AttendanceListResponse, AttendanceStatus,
    EmployeeAttendanceResponse,
};
use crate::model::dashboard::{DashboardSummary, DepartmentCount};
use crate::model::employee::{Employee, EmployeeInput, EmployeeListResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Desk API",
        version = "1.0.0",
        description = r#"
## Attendance Desk

A small HR back office: keep an employee registry, mark daily attendance and read a dashboard summary.

### Key Features
- **Employees**
  - Create, update, list, view and delete employees
  - Per-employee attendance history with present/absent totals
- **Attendance**
  - One Present/Absent mark per employee per calendar day
  - Filter by employee, exact date, date range and status
- **Dashboard**
  - Headcount, today's present/absent split, headcount per department

### Response Format
- JSON bodies
- Validation failures: `400 {"errors": {"field": ["message"]}}`
- Duplicate attendance: `400 {"errors": {"date": ["..."]}}`
- Lost concurrent write on a unique key: `409 {"errors": ...}`
- Missing records: `404 {"message": "..."}`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::employee_attendance,

        crate::api::attendance::list_attendance,
        crate::api::attendance::create_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::dashboard::summary
    ),
    components(
        schemas(
            ErrorBody,
            Employee,
            EmployeeInput,
            EmployeeListResponse,
            Attendance,
            AttendanceInput,
            AttendanceStatus,
            AttendanceListResponse,
            EmployeeAttendanceResponse,
            DashboardSummary,
            DepartmentCount
        )
    ),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Employee", description = "Employee registry APIs"),
        (name = "Attendance", description = "Attendance ledger APIs"),
        (name = "Dashboard", description = "Summary figures for the front page"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/health",
            "/api/employees",
            "/api/employees/{employee_id}",
            "/api/employees/{employee_id}/attendance",
            "/api/attendance",
            "/api/attendance/{attendance_id}",
            "/api/dashboard",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
