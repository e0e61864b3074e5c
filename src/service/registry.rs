//! Employee registry.
//!
//! # Invariants
//! - `employee_code` and `email` are unique; `email` is stored lowercased.
//! - Text columns are stored trimmed and never empty.
//! - Deleting an employee removes its attendance in the same write.

use tracing::{debug, info};

use super::validation::{DEPARTMENT, EMAIL, EMPLOYEE_CODE, FULL_NAME, INVALID_EMAIL, is_valid_email};
use crate::error::{ApiError, ApiResult, FieldErrors, NON_FIELD_ERRORS};
use crate::model::employee::{Employee, EmployeeInput, NewEmployee};
use crate::store::{Store, StoreError, UQ_EMPLOYEE_CODE, UQ_EMPLOYEE_EMAIL};

pub const DUPLICATE_CODE: &str = "An employee with this code already exists.";
pub const DUPLICATE_EMAIL: &str = "An employee with this email already exists.";
pub const NOT_FOUND: &str = "Employee not found";

pub async fn create(store: &dyn Store, input: EmployeeInput) -> ApiResult<Employee> {
    let cleaned = clean(store, &input, None).await?;

    let employee = store
        .insert_employee(&cleaned)
        .await
        .map_err(write_conflict)?;

    info!(employee_id = employee.id, employee_code = %employee.employee_code, "Employee created");
    Ok(employee)
}

pub async fn update(store: &dyn Store, id: u64, input: EmployeeInput) -> ApiResult<Employee> {
    let current = store
        .find_employee(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    let cleaned = clean(store, &input, Some(&current)).await?;

    let employee = store
        .update_employee(id, &cleaned)
        .await
        .map_err(write_conflict)?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    info!(employee_id = id, "Employee updated");
    Ok(employee)
}

/// Returns the deleted employee's full name.
pub async fn delete(store: &dyn Store, id: u64) -> ApiResult<String> {
    let employee = store
        .find_employee(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    let removed = store
        .delete_employee(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    info!(employee_id = id, attendance_removed = removed, "Employee deleted");
    Ok(employee.full_name)
}

pub async fn get(store: &dyn Store, id: u64) -> ApiResult<Employee> {
    store
        .find_employee(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

pub async fn list(store: &dyn Store) -> ApiResult<Vec<Employee>> {
    Ok(store.list_employees().await?)
}

/// Runs every field rule, then the uniqueness scans for the fields the caller
/// supplied, and reports all violations together.
async fn clean(
    store: &dyn Store,
    input: &EmployeeInput,
    current: Option<&Employee>,
) -> ApiResult<NewEmployee> {
    let mut errors = FieldErrors::new();
    let exclude = current.map(|e| e.id);

    let employee_code = EMPLOYEE_CODE.resolve(
        &mut errors,
        input.employee_code.as_deref(),
        current.map(|e| e.employee_code.as_str()),
    );
    let full_name = FULL_NAME.resolve(
        &mut errors,
        input.full_name.as_deref(),
        current.map(|e| e.full_name.as_str()),
    );
    let mut email = EMAIL.resolve(
        &mut errors,
        input.email.as_deref(),
        current.map(|e| e.email.as_str()),
    );
    let department = DEPARTMENT.resolve(
        &mut errors,
        input.department.as_deref(),
        current.map(|e| e.department.as_str()),
    );

    // Values not supplied come from the stored row and were checked when written.
    if input.email.is_some() {
        if email.as_deref().is_some_and(|value| !is_valid_email(value)) {
            errors.add(EMAIL.field, INVALID_EMAIL);
            email = None;
        }
        if let Some(value) = email.as_deref() {
            if store.employee_email_exists(value, exclude).await? {
                errors.add(EMAIL.field, DUPLICATE_EMAIL);
            }
        }
    }

    if input.employee_code.is_some() {
        if let Some(code) = employee_code.as_deref() {
            if store.employee_code_exists(code, exclude).await? {
                errors.add(EMPLOYEE_CODE.field, DUPLICATE_CODE);
            }
        }
    }

    match (employee_code, full_name, email, department) {
        (Some(employee_code), Some(full_name), Some(email), Some(department)) if errors.is_empty() => {
            Ok(NewEmployee {
                employee_code,
                full_name,
                email,
                department,
            })
        }
        _ => {
            debug!(errors = %errors, "Employee payload rejected");
            Err(ApiError::Validation(errors))
        }
    }
}

/// A unique key hit at write time means another writer won the race between
/// our scan and the insert.
fn write_conflict(err: StoreError) -> ApiError {
    match err {
        StoreError::Duplicate { constraint } if constraint == UQ_EMPLOYEE_CODE => {
            ApiError::Conflict(FieldErrors::single(EMPLOYEE_CODE.field, DUPLICATE_CODE))
        }
        StoreError::Duplicate { constraint } if constraint == UQ_EMPLOYEE_EMAIL => {
            ApiError::Conflict(FieldErrors::single(EMAIL.field, DUPLICATE_EMAIL))
        }
        StoreError::Duplicate { constraint } => ApiError::Conflict(FieldErrors::single(
            NON_FIELD_ERRORS,
            format!("Duplicate value for {constraint}."),
        )),
        other => ApiError::Store(other),
    }
}
