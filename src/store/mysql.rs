use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::{debug, error};

use super::{Store, StoreError, StoreResult};
use crate::model::attendance::{Attendance, AttendanceFilter, AttendanceStatus, NewAttendance};
use crate::model::dashboard::DepartmentCount;
use crate::model::employee::{Employee, NewEmployee};
use crate::utils::db_utils::{attendance_where, bind_all};

const EMPLOYEE_SELECT_SQL: &str = r#"
    SELECT
        e.id,
        e.employee_code,
        e.full_name,
        e.email,
        e.department,
        e.created_at,
        e.updated_at,
        (
            SELECT COUNT(*)
            FROM attendance a
            WHERE a.employee_id = e.id AND a.status = 'Present'
        ) AS total_present_days
    FROM employees e
"#;

const ATTENDANCE_SELECT_SQL: &str = r#"
    SELECT
        a.id,
        a.employee_id AS employee,
        e.full_name AS employee_name,
        e.employee_code,
        e.department,
        a.date,
        a.status,
        a.created_at
    FROM attendance a
    INNER JOIN employees e ON e.id = a.employee_id
"#;

/// MySQL-backed store. Unique keys and the attendance foreign key are declared
/// in `migrations/`; violations come back as [`StoreError::Duplicate`] and
/// [`StoreError::MissingReference`].
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn fetch_employee(&self, id: u64) -> Result<Option<Employee>, sqlx::Error> {
        let sql = format!("{EMPLOYEE_SELECT_SQL} WHERE e.id = ?");
        sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn fetch_attendance(&self, id: u64) -> Result<Option<Attendance>, sqlx::Error> {
        let sql = format!("{ATTENDANCE_SELECT_SQL} WHERE a.id = ?");
        sqlx::query_as::<_, Attendance>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}

fn logged(op: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        let err = StoreError::from(e);
        match &err {
            StoreError::Database(inner) => error!(error = %inner, op, "Store query failed"),
            other => debug!(error = %other, op, "Store constraint rejected write"),
        }
        err
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(logged("ping"))?;
        Ok(())
    }

    async fn employee_code_exists(&self, code: &str, exclude: Option<u64>) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE employee_code = ? AND (? IS NULL OR id <> ?))",
        )
        .bind(code)
        .bind(exclude)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(logged("employee_code_exists"))
    }

    async fn employee_email_exists(&self, email: &str, exclude: Option<u64>) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE email = ? AND (? IS NULL OR id <> ?))",
        )
        .bind(email)
        .bind(exclude)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(logged("employee_email_exists"))
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> StoreResult<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees (employee_code, full_name, email, department)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&employee.employee_code)
        .bind(&employee.full_name)
        .bind(&employee.email)
        .bind(&employee.department)
        .execute(&self.pool)
        .await
        .map_err(logged("insert_employee"))?;

        let id = result.last_insert_id();
        self.fetch_employee(id)
            .await
            .map_err(logged("insert_employee"))?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_employee(&self, id: u64, employee: &NewEmployee) -> StoreResult<Option<Employee>> {
        // updated_at is set explicitly: MySQL skips ON UPDATE when no column changes.
        sqlx::query(
            r#"
            UPDATE employees
            SET employee_code = ?, full_name = ?, email = ?, department = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&employee.employee_code)
        .bind(&employee.full_name)
        .bind(&employee.email)
        .bind(&employee.department)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(logged("update_employee"))?;

        // affected-row counts are not reliable for unchanged rows; re-read instead
        self.fetch_employee(id).await.map_err(logged("update_employee"))
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<Option<u64>> {
        let mut tx = self.pool.begin().await.map_err(logged("delete_employee"))?;

        let removed = sqlx::query("DELETE FROM attendance WHERE employee_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(logged("delete_employee"))?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(logged("delete_employee"))?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await.map_err(logged("delete_employee"))?;
            return Ok(None);
        }

        tx.commit().await.map_err(logged("delete_employee"))?;
        Ok(Some(removed))
    }

    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        self.fetch_employee(id).await.map_err(logged("find_employee"))
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let sql = format!("{EMPLOYEE_SELECT_SQL} ORDER BY e.full_name ASC, e.id ASC");
        sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(logged("list_employees"))
    }

    async fn count_employees(&self) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await
            .map_err(logged("count_employees"))
    }

    async fn department_counts(&self) -> StoreResult<Vec<DepartmentCount>> {
        sqlx::query_as::<_, DepartmentCount>(
            r#"
            SELECT department, COUNT(*) AS count
            FROM employees
            GROUP BY department
            ORDER BY department ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(logged("department_counts"))
    }

    async fn attendance_exists(
        &self,
        employee_id: u64,
        date: NaiveDate,
        exclude: Option<u64>,
    ) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM attendance
                WHERE employee_id = ? AND date = ? AND (? IS NULL OR id <> ?)
            )
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(exclude)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(logged("attendance_exists"))
    }

    async fn insert_attendance(&self, record: &NewAttendance) -> StoreResult<Attendance> {
        let result = sqlx::query("INSERT INTO attendance (employee_id, date, status) VALUES (?, ?, ?)")
            .bind(record.employee_id)
            .bind(record.date)
            .bind(record.status.as_ref())
            .execute(&self.pool)
            .await
            .map_err(logged("insert_attendance"))?;

        let id = result.last_insert_id();
        self.fetch_attendance(id)
            .await
            .map_err(logged("insert_attendance"))?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_attendance(&self, id: u64, record: &NewAttendance) -> StoreResult<Option<Attendance>> {
        sqlx::query(
            "UPDATE attendance SET employee_id = ?, date = ?, status = ? WHERE id = ?",
        )
        .bind(record.employee_id)
        .bind(record.date)
        .bind(record.status.as_ref())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(logged("update_attendance"))?;

        self.fetch_attendance(id).await.map_err(logged("update_attendance"))
    }

    async fn delete_attendance(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(logged("delete_attendance"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_attendance(&self, id: u64) -> StoreResult<Option<Attendance>> {
        self.fetch_attendance(id).await.map_err(logged("find_attendance"))
    }

    async fn list_attendance(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>> {
        let clause = attendance_where(filter);
        let sql = format!(
            "{ATTENDANCE_SELECT_SQL} {} ORDER BY a.date DESC, a.id DESC",
            clause.sql()
        );
        debug!(sql = %sql, bindings = ?clause.values, "Fetching attendance");

        bind_all(sqlx::query_as::<_, Attendance>(&sql), clause.values)
            .fetch_all(&self.pool)
            .await
            .map_err(logged("list_attendance"))
    }

    async fn count_attendance(&self, date: NaiveDate, status: AttendanceStatus) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE date = ? AND status = ?")
            .bind(date)
            .bind(status.as_ref())
            .fetch_one(&self.pool)
            .await
            .map_err(logged("count_attendance"))
    }
}
