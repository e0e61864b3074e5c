//! Persistence seam.
//!
//! Implementations answer primitive questions only (does this value exist,
//! write this row, count these rows). Every rule about what may be written
//! lives in `crate::service`.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::attendance::{Attendance, AttendanceFilter, AttendanceStatus, NewAttendance};
use crate::model::dashboard::DepartmentCount;
use crate::model::employee::{Employee, NewEmployee};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

pub const UQ_EMPLOYEE_CODE: &str = "uq_employees_code";
pub const UQ_EMPLOYEE_EMAIL: &str = "uq_employees_email";
pub const UQ_ATTENDANCE_EMPLOYEE_DATE: &str = "uq_attendance_employee_date";
pub const FK_ATTENDANCE_EMPLOYEE: &str = "fk_attendance_employee";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate value for unique key `{constraint}`")]
    Duplicate { constraint: String },

    #[error("referenced row missing for `{constraint}`")]
    MissingReference { constraint: String },

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("in-memory store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            let constraint = db_err
                .constraint()
                .map(str::to_owned)
                .or_else(|| key_name(db_err.message()).map(str::to_owned))
                .unwrap_or_default();

            if db_err.is_unique_violation() {
                return StoreError::Duplicate { constraint };
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::MissingReference { constraint };
            }
        }
        StoreError::Database(e)
    }
}

/// Pulls the key name out of a MySQL constraint message.
///
/// MySQL reports `Duplicate entry 'E1' for key 'employees.uq_employees_code'`
/// (8.0) or `... for key 'uq_employees_code'` (5.7), and foreign key failures
/// as `... CONSTRAINT `fk_attendance_employee` FOREIGN KEY ...`.
fn key_name(message: &str) -> Option<&str> {
    if let Some((_, rest)) = message.split_once("for key '") {
        let key = rest.split('\'').next()?;
        return key.rsplit('.').next();
    }
    if let Some((_, rest)) = message.split_once("CONSTRAINT `") {
        return rest.split('`').next();
    }
    None
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> StoreResult<()>;

    async fn employee_code_exists(&self, code: &str, exclude: Option<u64>) -> StoreResult<bool>;
    async fn employee_email_exists(&self, email: &str, exclude: Option<u64>) -> StoreResult<bool>;
    async fn insert_employee(&self, employee: &NewEmployee) -> StoreResult<Employee>;
    /// Overwrites every column and refreshes `updated_at`. `None` if the id is gone.
    async fn update_employee(&self, id: u64, employee: &NewEmployee) -> StoreResult<Option<Employee>>;
    /// Removes the employee and all of its attendance. Returns the number of
    /// attendance rows removed, `None` if the employee did not exist.
    async fn delete_employee(&self, id: u64) -> StoreResult<Option<u64>>;
    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>>;
    /// Ordered by `full_name` ascending.
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    async fn count_employees(&self) -> StoreResult<i64>;
    /// Grouped by department, ordered by department name ascending.
    async fn department_counts(&self) -> StoreResult<Vec<DepartmentCount>>;

    async fn attendance_exists(
        &self,
        employee_id: u64,
        date: NaiveDate,
        exclude: Option<u64>,
    ) -> StoreResult<bool>;
    async fn insert_attendance(&self, record: &NewAttendance) -> StoreResult<Attendance>;
    async fn update_attendance(&self, id: u64, record: &NewAttendance) -> StoreResult<Option<Attendance>>;
    async fn delete_attendance(&self, id: u64) -> StoreResult<bool>;
    async fn find_attendance(&self, id: u64) -> StoreResult<Option<Attendance>>;
    /// Ordered by `date` descending, then `id` descending.
    async fn list_attendance(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>>;
    async fn count_attendance(&self, date: NaiveDate, status: AttendanceStatus) -> StoreResult<i64>;
}
