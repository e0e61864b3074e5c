use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{
    FK_ATTENDANCE_EMPLOYEE, Store, StoreError, StoreResult, UQ_ATTENDANCE_EMPLOYEE_DATE,
    UQ_EMPLOYEE_CODE, UQ_EMPLOYEE_EMAIL,
};
use crate::model::attendance::{Attendance, AttendanceFilter, AttendanceStatus, NewAttendance};
use crate::model::dashboard::DepartmentCount;
use crate::model::employee::{Employee, NewEmployee};

#[derive(Debug, Clone)]
struct EmployeeRow {
    employee_code: String,
    full_name: String,
    email: String,
    department: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct AttendanceRow {
    employee_id: u64,
    date: NaiveDate,
    status: AttendanceStatus,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    employees: BTreeMap<u64, EmployeeRow>,
    attendance: BTreeMap<u64, AttendanceRow>,
    next_employee_id: u64,
    next_attendance_id: u64,
}

impl Tables {
    fn check_employee_keys(&self, employee: &NewEmployee, exclude: Option<u64>) -> StoreResult<()> {
        for (id, row) in &self.employees {
            if Some(*id) == exclude {
                continue;
            }
            if same_text(&row.employee_code, &employee.employee_code) {
                return Err(duplicate(UQ_EMPLOYEE_CODE));
            }
            if row.email == employee.email {
                return Err(duplicate(UQ_EMPLOYEE_EMAIL));
            }
        }
        Ok(())
    }

    fn check_attendance_keys(&self, record: &NewAttendance, exclude: Option<u64>) -> StoreResult<()> {
        if !self.employees.contains_key(&record.employee_id) {
            return Err(StoreError::MissingReference {
                constraint: FK_ATTENDANCE_EMPLOYEE.to_string(),
            });
        }
        let taken = self.attendance.iter().any(|(id, row)| {
            Some(*id) != exclude && row.employee_id == record.employee_id && row.date == record.date
        });
        if taken {
            return Err(duplicate(UQ_ATTENDANCE_EMPLOYEE_DATE));
        }
        Ok(())
    }

    fn present_days(&self, employee_id: u64) -> i64 {
        self.attendance
            .values()
            .filter(|a| a.employee_id == employee_id && a.status == AttendanceStatus::Present)
            .count() as i64
    }

    fn employee(&self, id: u64) -> Option<Employee> {
        self.employees.get(&id).map(|row| Employee {
            id,
            employee_code: row.employee_code.clone(),
            full_name: row.full_name.clone(),
            email: row.email.clone(),
            department: row.department.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            total_present_days: self.present_days(id),
        })
    }

    fn attendance(&self, id: u64) -> Option<Attendance> {
        let row = self.attendance.get(&id)?;
        let owner = self.employees.get(&row.employee_id)?;
        Some(Attendance {
            id,
            employee: row.employee_id,
            employee_name: owner.full_name.clone(),
            employee_code: owner.employee_code.clone(),
            department: owner.department.clone(),
            date: row.date,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

/// Text keys compare case-insensitively, like MySQL's default `_ci` collation.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

fn same_text(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

fn duplicate(constraint: &str) -> StoreError {
    StoreError::Duplicate {
        constraint: constraint.to_string(),
    }
}

/// In-process store with the same keys and cascade as the MySQL schema.
/// Selected with `DATABASE_URL=memory://`; the test suite runs on it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }

    async fn employee_code_exists(&self, code: &str, exclude: Option<u64>) -> StoreResult<bool> {
        let tables = self.read()?;
        Ok(tables
            .employees
            .iter()
            .any(|(id, row)| Some(*id) != exclude && same_text(&row.employee_code, code)))
    }

    async fn employee_email_exists(&self, email: &str, exclude: Option<u64>) -> StoreResult<bool> {
        let tables = self.read()?;
        Ok(tables
            .employees
            .iter()
            .any(|(id, row)| Some(*id) != exclude && row.email == email))
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> StoreResult<Employee> {
        let mut tables = self.write()?;
        tables.check_employee_keys(employee, None)?;

        tables.next_employee_id += 1;
        let id = tables.next_employee_id;
        let now = Utc::now();
        tables.employees.insert(
            id,
            EmployeeRow {
                employee_code: employee.employee_code.clone(),
                full_name: employee.full_name.clone(),
                email: employee.email.clone(),
                department: employee.department.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        tables
            .employee(id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_employee(&self, id: u64, employee: &NewEmployee) -> StoreResult<Option<Employee>> {
        let mut tables = self.write()?;
        if !tables.employees.contains_key(&id) {
            return Ok(None);
        }
        tables.check_employee_keys(employee, Some(id))?;

        if let Some(row) = tables.employees.get_mut(&id) {
            row.employee_code = employee.employee_code.clone();
            row.full_name = employee.full_name.clone();
            row.email = employee.email.clone();
            row.department = employee.department.clone();
            row.updated_at = Utc::now();
        }
        Ok(tables.employee(id))
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<Option<u64>> {
        let mut tables = self.write()?;
        if tables.employees.remove(&id).is_none() {
            return Ok(None);
        }
        let before = tables.attendance.len();
        tables.attendance.retain(|_, row| row.employee_id != id);
        Ok(Some((before - tables.attendance.len()) as u64))
    }

    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        Ok(self.read()?.employee(id))
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let tables = self.read()?;
        let mut employees: Vec<Employee> = tables
            .employees
            .keys()
            .filter_map(|id| tables.employee(*id))
            .collect();
        employees.sort_by(|a, b| {
            fold(&a.full_name)
                .cmp(&fold(&b.full_name))
                .then(a.id.cmp(&b.id))
        });
        Ok(employees)
    }

    async fn count_employees(&self) -> StoreResult<i64> {
        Ok(self.read()?.employees.len() as i64)
    }

    async fn department_counts(&self) -> StoreResult<Vec<DepartmentCount>> {
        let tables = self.read()?;
        // Grouped by folded name; the oldest employee's spelling is reported.
        let mut counts: BTreeMap<String, (&str, i64)> = BTreeMap::new();
        for row in tables.employees.values() {
            counts
                .entry(fold(&row.department))
                .or_insert((row.department.as_str(), 0))
                .1 += 1;
        }
        Ok(counts
            .into_values()
            .map(|(department, count)| DepartmentCount {
                department: department.to_string(),
                count,
            })
            .collect())
    }

    async fn attendance_exists(
        &self,
        employee_id: u64,
        date: NaiveDate,
        exclude: Option<u64>,
    ) -> StoreResult<bool> {
        let tables = self.read()?;
        Ok(tables.attendance.iter().any(|(id, row)| {
            Some(*id) != exclude && row.employee_id == employee_id && row.date == date
        }))
    }

    async fn insert_attendance(&self, record: &NewAttendance) -> StoreResult<Attendance> {
        let mut tables = self.write()?;
        tables.check_attendance_keys(record, None)?;

        tables.next_attendance_id += 1;
        let id = tables.next_attendance_id;
        tables.attendance.insert(
            id,
            AttendanceRow {
                employee_id: record.employee_id,
                date: record.date,
                status: record.status,
                created_at: Utc::now(),
            },
        );
        tables
            .attendance(id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_attendance(&self, id: u64, record: &NewAttendance) -> StoreResult<Option<Attendance>> {
        let mut tables = self.write()?;
        if !tables.attendance.contains_key(&id) {
            return Ok(None);
        }
        tables.check_attendance_keys(record, Some(id))?;

        if let Some(row) = tables.attendance.get_mut(&id) {
            row.employee_id = record.employee_id;
            row.date = record.date;
            row.status = record.status;
        }
        Ok(tables.attendance(id))
    }

    async fn delete_attendance(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write()?.attendance.remove(&id).is_some())
    }

    async fn find_attendance(&self, id: u64) -> StoreResult<Option<Attendance>> {
        Ok(self.read()?.attendance(id))
    }

    async fn list_attendance(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>> {
        let tables = self.read()?;
        let mut records: Vec<Attendance> = tables
            .attendance
            .iter()
            .filter(|(_, row)| filter.matches(row.employee_id, row.date, row.status))
            .filter_map(|(id, _)| tables.attendance(*id))
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn count_attendance(&self, date: NaiveDate, status: AttendanceStatus) -> StoreResult<i64> {
        let tables = self.read()?;
        Ok(tables
            .attendance
            .values()
            .filter(|row| row.date == date && row.status == status)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> NewEmployee {
        NewEmployee {
            employee_code: "E1".into(),
            full_name: "Ann Lee".into(),
            email: "ann@x.com".into(),
            department: "Eng".into(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[actix_web::test]
    async fn unique_keys_are_enforced_on_write() {
        let store = MemoryStore::new();
        store.insert_employee(&ann()).await.unwrap();

        let same_email = NewEmployee {
            employee_code: "E2".into(),
            ..ann()
        };
        let err = store.insert_employee(&same_email).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref constraint } if constraint == UQ_EMPLOYEE_EMAIL));

        let same_code = NewEmployee {
            email: "other@x.com".into(),
            ..ann()
        };
        let err = store.insert_employee(&same_code).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref constraint } if constraint == UQ_EMPLOYEE_CODE));
    }

    #[actix_web::test]
    async fn attendance_needs_an_existing_employee() {
        let store = MemoryStore::new();
        let record = NewAttendance {
            employee_id: 42,
            date: day(1),
            status: AttendanceStatus::Present,
        };
        let err = store.insert_attendance(&record).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { .. }));
    }

    #[actix_web::test]
    async fn deleting_an_employee_cascades() {
        let store = MemoryStore::new();
        let employee = store.insert_employee(&ann()).await.unwrap();
        for d in 1..=3 {
            store
                .insert_attendance(&NewAttendance {
                    employee_id: employee.id,
                    date: day(d),
                    status: AttendanceStatus::Present,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.delete_employee(employee.id).await.unwrap(), Some(3));
        assert!(store.list_attendance(&AttendanceFilter::default()).await.unwrap().is_empty());
        assert_eq!(store.delete_employee(employee.id).await.unwrap(), None);
    }

    #[actix_web::test]
    async fn present_days_follow_attendance_rows() {
        let store = MemoryStore::new();
        let employee = store.insert_employee(&ann()).await.unwrap();
        assert_eq!(employee.total_present_days, 0);

        for (d, status) in [(1, AttendanceStatus::Present), (2, AttendanceStatus::Absent), (3, AttendanceStatus::Present)] {
            store
                .insert_attendance(&NewAttendance {
                    employee_id: employee.id,
                    date: day(d),
                    status,
                })
                .await
                .unwrap();
        }

        let reloaded = store.find_employee(employee.id).await.unwrap().unwrap();
        assert_eq!(reloaded.total_present_days, 2);
    }

    #[actix_web::test]
    async fn attendance_listing_is_newest_first() {
        let store = MemoryStore::new();
        let employee = store.insert_employee(&ann()).await.unwrap();
        for d in [5, 1, 9] {
            store
                .insert_attendance(&NewAttendance {
                    employee_id: employee.id,
                    date: day(d),
                    status: AttendanceStatus::Absent,
                })
                .await
                .unwrap();
        }

        let dates: Vec<NaiveDate> = store
            .list_attendance(&AttendanceFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.date)
            .collect();
        assert_eq!(dates, vec![day(9), day(5), day(1)]);
    }

    #[actix_web::test]
    async fn text_keys_ignore_case_like_mysql() {
        let store = MemoryStore::new();
        store.insert_employee(&ann()).await.unwrap();
        store
            .insert_employee(&NewEmployee {
                employee_code: "E2".into(),
                full_name: "adam ray".into(),
                email: "bob@x.com".into(),
                department: "eng".into(),
            })
            .await
            .unwrap();

        assert!(store.employee_code_exists("e1", None).await.unwrap());
        let err = store
            .insert_employee(&NewEmployee {
                employee_code: "e1".into(),
                email: "other@x.com".into(),
                ..ann()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref constraint } if constraint == UQ_EMPLOYEE_CODE));

        assert_eq!(
            store.department_counts().await.unwrap(),
            vec![DepartmentCount { department: "Eng".into(), count: 2 }]
        );

        let names: Vec<String> = store
            .list_employees()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.full_name)
            .collect();
        assert_eq!(names, ["adam ray", "Ann Lee"]);
    }
}
