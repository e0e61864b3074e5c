use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::{IntoParams, ToSchema};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl TryFrom<String> for AttendanceStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Attendance row joined with the identity of the employee it belongs to.
/// The employee columns are read-only; they are never written with the row.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "employee": 1,
        "employee_name": "Ann Lee",
        "employee_code": "EMP-001",
        "department": "Engineering",
        "date": "2024-01-01",
        "status": "Present",
        "created_at": "2024-01-01T09:00:00Z"
    })
)]
pub struct Attendance {
    #[schema(example = 7)]
    pub id: u64,
    /// id of the owning employee
    #[schema(example = 1)]
    pub employee: u64,
    #[schema(example = "Ann Lee")]
    pub employee_name: String,
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: AttendanceStatus,
    #[schema(example = "2024-01-01T09:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Create/update payload. `date` and `status` stay textual so that bad values
/// come back as field errors instead of a body parse failure.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
pub struct AttendanceInput {
    #[schema(example = 1)]
    pub employee: Option<u64>,
    #[schema(example = "2024-01-01", format = "date")]
    pub date: Option<String>,
    #[schema(example = "Present")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Conjunctive filter over the ledger. `None` means "don't filter".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub employee_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

impl AttendanceFilter {
    pub fn matches(&self, employee_id: u64, date: NaiveDate, status: AttendanceStatus) -> bool {
        self.employee_id.is_none_or(|id| id == employee_id)
            && self.date.is_none_or(|d| d == date)
            && self.date_from.is_none_or(|from| date >= from)
            && self.date_to.is_none_or(|to| date <= to)
            && self.status.is_none_or(|s| s == status)
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Filter by employee id
    #[schema(example = 1)]
    pub employee_id: Option<u64>,
    /// Exact date
    #[schema(example = "2024-01-15", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    /// First day of the range, inclusive
    #[schema(example = "2024-01-01", value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    /// Last day of the range, inclusive
    #[schema(example = "2024-01-31", value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

impl From<AttendanceQuery> for AttendanceFilter {
    fn from(query: AttendanceQuery) -> Self {
        Self {
            employee_id: query.employee_id,
            date: query.date,
            date_from: query.start_date,
            date_to: query.end_date,
            status: query.status,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DateRangeQuery {
    #[schema(example = "2024-01-01", value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2024-01-31", value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceListResponse {
    #[schema(example = 1)]
    pub count: usize,
    pub results: Vec<Attendance>,
}

/// One employee's ledger over an optional date range, with totals computed
/// over the same filtered rows.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeAttendanceResponse {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "Ann Lee")]
    pub employee_name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 20)]
    pub total_present: usize,
    #[schema(example = 2)]
    pub total_absent: usize,
    #[schema(example = 22)]
    pub count: usize,
    pub results: Vec<Attendance>,
}
