use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee as read back from the store, enriched with the number of days
/// the employee has been marked present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "full_name": "Ann Lee",
        "email": "ann@company.com",
        "department": "Engineering",
        "created_at": "2024-01-01T09:00:00Z",
        "updated_at": "2024-01-01T09:00:00Z",
        "total_present_days": 12
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "Ann Lee")]
    pub full_name: String,

    #[schema(example = "ann@company.com")]
    pub email: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "2024-01-01T09:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(example = "2024-01-01T09:00:00Z", value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,

    #[schema(example = 12)]
    pub total_present_days: i64,
}

/// Create/update payload. Every field is optional so that a create can report
/// all missing fields at once and an update can carry only what changes.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
pub struct EmployeeInput {
    #[schema(example = "EMP-001")]
    pub employee_code: Option<String>,
    #[schema(example = "Ann Lee")]
    pub full_name: Option<String>,
    #[schema(example = "Ann@Company.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

/// Cleaned column values, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub employee_code: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    #[schema(example = 1)]
    pub count: usize,
    pub results: Vec<Employee>,
}
