//! Attendance ledger.
//!
//! # Invariants
//! - At most one record per (employee, date).
//! - `status` is one of the two `AttendanceStatus` values.
//! - Every record references an existing employee.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::validation::{REQUIRED, parse_date, parse_status};
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::model::attendance::{
    Attendance, AttendanceFilter, AttendanceInput, AttendanceStatus, EmployeeAttendanceResponse,
    NewAttendance,
};
use crate::service::registry;
use crate::store::{Store, StoreError, UQ_ATTENDANCE_EMPLOYEE_DATE};

pub const NOT_FOUND: &str = "Attendance record not found";

pub fn duplicate_message(date: NaiveDate) -> String {
    format!("Attendance for this employee on {date} already exists.")
}

pub async fn create(store: &dyn Store, input: AttendanceInput) -> ApiResult<Attendance> {
    let mut errors = FieldErrors::new();

    let employee_id = input.employee;
    if employee_id.is_none() {
        errors.add("employee", REQUIRED);
    }
    let date = field(&mut errors, "date", input.date.as_deref(), parse_date);
    let status = field(&mut errors, "status", input.status.as_deref(), parse_status);

    let record = match (employee_id, date, status) {
        (Some(employee_id), Some(date), Some(status)) if errors.is_empty() => NewAttendance {
            employee_id,
            date,
            status,
        },
        _ => return Err(rejected(errors)),
    };

    ensure_employee(store, record.employee_id).await?;
    ensure_free(store, &record, None).await?;

    let attendance = store
        .insert_attendance(&record)
        .await
        .map_err(|e| write_conflict(e, &record))?;

    info!(
        attendance_id = attendance.id,
        employee_id = record.employee_id,
        date = %record.date,
        status = %record.status,
        "Attendance recorded"
    );
    Ok(attendance)
}

/// Partial update. Supplied fields are re-validated; the (employee, date)
/// pair is re-checked with this record excluded. A new `employee` must exist.
/// An empty payload rewrites the record unchanged.
pub async fn update(store: &dyn Store, id: u64, input: AttendanceInput) -> ApiResult<Attendance> {
    let current = store
        .find_attendance(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    let mut errors = FieldErrors::new();
    let date = match input.date.as_deref() {
        Some(raw) => field(&mut errors, "date", Some(raw), parse_date),
        None => Some(current.date),
    };
    let status = match input.status.as_deref() {
        Some(raw) => field(&mut errors, "status", Some(raw), parse_status),
        None => Some(current.status),
    };

    let record = match (date, status) {
        (Some(date), Some(status)) if errors.is_empty() => NewAttendance {
            employee_id: input.employee.unwrap_or(current.employee),
            date,
            status,
        },
        _ => return Err(rejected(errors)),
    };

    if record.employee_id != current.employee {
        ensure_employee(store, record.employee_id).await?;
    }
    ensure_free(store, &record, Some(id)).await?;

    let attendance = store
        .update_attendance(id, &record)
        .await
        .map_err(|e| write_conflict(e, &record))?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    info!(attendance_id = id, status = %attendance.status, "Attendance updated");
    Ok(attendance)
}

pub async fn delete(store: &dyn Store, id: u64) -> ApiResult<()> {
    if !store.delete_attendance(id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    info!(attendance_id = id, "Attendance deleted");
    Ok(())
}

pub async fn get(store: &dyn Store, id: u64) -> ApiResult<Attendance> {
    store
        .find_attendance(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

pub async fn list(store: &dyn Store, filter: &AttendanceFilter) -> ApiResult<Vec<Attendance>> {
    debug!(filter = ?filter, "Listing attendance");
    Ok(store.list_attendance(filter).await?)
}

/// One employee's records in the optional range. Totals are taken over the
/// returned rows, not over the employee's whole history.
pub async fn list_for_employee(
    store: &dyn Store,
    employee_id: u64,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> ApiResult<EmployeeAttendanceResponse> {
    let employee = registry::get(store, employee_id).await?;

    let filter = AttendanceFilter {
        employee_id: Some(employee_id),
        date_from,
        date_to,
        ..Default::default()
    };
    let results = store.list_attendance(&filter).await?;

    let total_present = results
        .iter()
        .filter(|a| a.status == AttendanceStatus::Present)
        .count();
    let total_absent = results
        .iter()
        .filter(|a| a.status == AttendanceStatus::Absent)
        .count();

    Ok(EmployeeAttendanceResponse {
        employee_id: employee.id,
        employee_code: employee.employee_code,
        employee_name: employee.full_name,
        department: employee.department,
        total_present,
        total_absent,
        count: results.len(),
        results,
    })
}

fn field<T>(
    errors: &mut FieldErrors,
    name: &'static str,
    raw: Option<&str>,
    parse: fn(&str) -> Result<T, &'static str>,
) -> Option<T> {
    let Some(raw) = raw else {
        errors.add(name, REQUIRED);
        return None;
    };
    match parse(raw) {
        Ok(value) => Some(value),
        Err(message) => {
            errors.add(name, message);
            None
        }
    }
}

fn rejected(errors: FieldErrors) -> ApiError {
    debug!(errors = %errors, "Attendance payload rejected");
    ApiError::Validation(errors)
}

async fn ensure_employee(store: &dyn Store, employee_id: u64) -> ApiResult<()> {
    if store.find_employee(employee_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Employee {employee_id} not found")));
    }
    Ok(())
}

async fn ensure_free(store: &dyn Store, record: &NewAttendance, exclude: Option<u64>) -> ApiResult<()> {
    if store
        .attendance_exists(record.employee_id, record.date, exclude)
        .await?
    {
        return Err(ApiError::Validation(FieldErrors::single(
            "date",
            duplicate_message(record.date),
        )));
    }
    Ok(())
}

fn write_conflict(err: StoreError, record: &NewAttendance) -> ApiError {
    match err {
        StoreError::Duplicate { constraint } if constraint == UQ_ATTENDANCE_EMPLOYEE_DATE => {
            ApiError::Conflict(FieldErrors::single("date", duplicate_message(record.date)))
        }
        StoreError::MissingReference { .. } => {
            ApiError::NotFound(format!("Employee {} not found", record.employee_id))
        }
        other => ApiError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeInput;
    use crate::store::MemoryStore;

    async fn employee(store: &MemoryStore, code: &str) -> u64 {
        registry::create(
            store,
            EmployeeInput {
                employee_code: Some(code.into()),
                full_name: Some(format!("Person {code}")),
                email: Some(format!("{code}@x.com")),
                department: Some("Eng".into()),
            },
        )
        .await
        .unwrap()
        .id
    }

    fn mark(employee: u64, date: &str, status: &str) -> AttendanceInput {
        AttendanceInput {
            employee: Some(employee),
            date: Some(date.into()),
            status: Some(status.into()),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[actix_web::test]
    async fn create_returns_denormalized_employee_fields() {
        let store = MemoryStore::new();
        let e1 = employee(&store, "E1").await;

        let record = create(&store, mark(e1, "2024-01-01", "Present")).await.unwrap();
        assert_eq!(record.employee, e1);
        assert_eq!(record.employee_name, "Person E1");
        assert_eq!(record.employee_code, "E1");
        assert_eq!(record.department, "Eng");
        assert_eq!(record.date, day(1));
        assert_eq!(record.status, AttendanceStatus::Present);
    }

    #[actix_web::test]
    async fn same_employee_and_date_conflicts_regardless_of_status() {
        let store = MemoryStore::new();
        let e1 = employee(&store, "E1").await;
        create(&store, mark(e1, "2024-01-01", "Present")).await.unwrap();

        for status in ["Present", "Absent"] {
            let err = create(&store, mark(e1, "2024-01-01", status)).await.unwrap_err();
            match err {
                ApiError::Validation(errors) => assert_eq!(
                    errors.get("date").unwrap(),
                    ["Attendance for this employee on 2024-01-01 already exists."]
                ),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[actix_web::test]
    async fn unknown_status_is_rejected_on_create_and_update() {
        let store = MemoryStore::new();
        let e1 = employee(&store, "E1").await;

        let err = create(&store, mark(e1, "2024-01-01", "Late")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref e) if e.get("status").is_some()));

        let record = create(&store, mark(e1, "2024-01-01", "Absent")).await.unwrap();
        let err = update(
            &store,
            record.id,
            AttendanceInput {
                status: Some("present".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref e) if e.get("status").is_some()));
    }

    #[actix_web::test]
    async fn create_collects_missing_fields() {
        let store = MemoryStore::new();
        let err = create(&store, AttendanceInput::default()).await.unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(
                errors.fields().collect::<Vec<_>>(),
                ["date", "employee", "status"]
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn create_for_unknown_employee_is_not_found() {
        let store = MemoryStore::new();
        let err = create(&store, mark(77, "2024-01-01", "Present")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn update_keeps_own_slot_but_not_anothers() {
        let store = MemoryStore::new();
        let e1 = employee(&store, "E1").await;
        let first = create(&store, mark(e1, "2024-01-01", "Present")).await.unwrap();
        create(&store, mark(e1, "2024-01-02", "Present")).await.unwrap();

        let same_slot = update(
            &store,
            first.id,
            AttendanceInput {
                status: Some("Absent".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(same_slot.status, AttendanceStatus::Absent);

        let err = update(
            &store,
            first.id,
            AttendanceInput {
                date: Some("2024-01-02".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref e) if e.get("date").is_some()));
    }

    #[actix_web::test]
    async fn update_to_unknown_employee_is_not_found() {
        let store = MemoryStore::new();
        let e1 = employee(&store, "E1").await;
        let record = create(&store, mark(e1, "2024-01-01", "Present")).await.unwrap();

        let err = update(
            &store,
            record.id,
            AttendanceInput {
                employee: Some(999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn update_and_delete_missing_record_are_not_found() {
        let store = MemoryStore::new();
        let err = update(&store, 5, AttendanceInput::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(matches!(delete(&store, 5).await.unwrap_err(), ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn list_applies_filters_conjunctively() {
        let store = MemoryStore::new();
        let e1 = employee(&store, "E1").await;
        let e2 = employee(&store, "E2").await;
        create(&store, mark(e1, "2024-01-01", "Present")).await.unwrap();
        create(&store, mark(e1, "2024-01-15", "Absent")).await.unwrap();
        create(&store, mark(e1, "2024-02-01", "Present")).await.unwrap();
        create(&store, mark(e2, "2024-01-20", "Present")).await.unwrap();

        let january_present = AttendanceFilter {
            date_from: Some(day(1)),
            date_to: Some(day(31)),
            status: Some(AttendanceStatus::Present),
            ..Default::default()
        };
        let rows = list(&store, &january_present).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status == AttendanceStatus::Present));
        assert!(rows.iter().all(|r| r.date >= day(1) && r.date <= day(31)));

        let e1_on_15th = AttendanceFilter {
            employee_id: Some(e1),
            date: Some(day(15)),
            ..Default::default()
        };
        let rows = list(&store, &e1_on_15th).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, AttendanceStatus::Absent);
    }

    #[actix_web::test]
    async fn employee_totals_match_filtered_rows_for_any_range() {
        let store = MemoryStore::new();
        let e1 = employee(&store, "E1").await;
        for d in 1..=10u32 {
            let status = if d % 3 == 0 { "Absent" } else { "Present" };
            create(&store, mark(e1, &format!("2024-01-{d:02}"), status)).await.unwrap();
        }

        let bounds = [None, Some(day(1)), Some(day(4)), Some(day(10)), Some(day(12))];
        for from in bounds {
            for to in bounds {
                let summary = list_for_employee(&store, e1, from, to).await.unwrap();
                assert_eq!(summary.total_present + summary.total_absent, summary.count);
                assert_eq!(summary.count, summary.results.len());
            }
        }

        let first_week = list_for_employee(&store, e1, Some(day(1)), Some(day(7))).await.unwrap();
        assert_eq!(first_week.count, 7);
        assert_eq!(first_week.total_absent, 2);
        assert_eq!(first_week.total_present, 5);
        assert_eq!(first_week.employee_code, "E1");
    }

    #[actix_web::test]
    async fn employee_listing_for_unknown_employee_is_not_found() {
        let store = MemoryStore::new();
        let err = list_for_employee(&store, 3, None, None).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn empty_update_returns_record_unchanged() {
        let store = MemoryStore::new();
        let e1 = employee(&store, "E1").await;
        let record = create(&store, mark(e1, "2024-01-01", "Present")).await.unwrap();

        let same = update(&store, record.id, AttendanceInput::default()).await.unwrap();
        assert_eq!(same, record);
    }

    #[actix_web::test]
    async fn status_with_surrounding_whitespace_is_accepted() {
        let store = MemoryStore::new();
        let e1 = employee(&store, "E1").await;
        let record = create(&store, mark(e1, "2024-01-01", " Absent ")).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Absent);
    }
}
