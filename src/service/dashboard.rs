use chrono::NaiveDate;

use crate::error::ApiResult;
use crate::model::attendance::AttendanceStatus;
use crate::model::dashboard::DashboardSummary;
use crate::store::Store;

/// Read-only roll-up of both stores for `today`.
pub async fn summary(store: &dyn Store, today: NaiveDate) -> ApiResult<DashboardSummary> {
    Ok(DashboardSummary {
        total_employees: store.count_employees().await?,
        total_present_today: store.count_attendance(today, AttendanceStatus::Present).await?,
        total_absent_today: store.count_attendance(today, AttendanceStatus::Absent).await?,
        departments: store.department_counts().await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceInput;
    use crate::model::dashboard::DepartmentCount;
    use crate::model::employee::EmployeeInput;
    use crate::service::{ledger, registry};
    use crate::store::MemoryStore;

    async fn hire(store: &MemoryStore, code: &str, dept: &str) -> u64 {
        registry::create(
            store,
            EmployeeInput {
                employee_code: Some(code.into()),
                full_name: Some(format!("Person {code}")),
                email: Some(format!("{code}@x.com")),
                department: Some(dept.into()),
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn mark(store: &MemoryStore, employee: u64, date: &str, status: &str) {
        ledger::create(
            store,
            AttendanceInput {
                employee: Some(employee),
                date: Some(date.into()),
                status: Some(status.into()),
            },
        )
        .await
        .unwrap();
    }

    #[actix_web::test]
    async fn empty_store_summary_is_all_zero() {
        let store = MemoryStore::new();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let summary = summary(&store, today).await.unwrap();
        assert_eq!(
            summary,
            DashboardSummary {
                total_employees: 0,
                total_present_today: 0,
                total_absent_today: 0,
                departments: vec![],
            }
        );
    }

    #[actix_web::test]
    async fn summary_counts_only_todays_attendance() {
        let store = MemoryStore::new();
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        let a = hire(&store, "E1", "Eng").await;
        let b = hire(&store, "E2", "Finance").await;
        let c = hire(&store, "E3", "Eng").await;

        mark(&store, a, "2024-03-05", "Present").await;
        mark(&store, b, "2024-03-05", "Absent").await;
        mark(&store, c, "2024-03-04", "Present").await;

        let summary = summary(&store, today).await.unwrap();
        assert_eq!(summary.total_employees, 3);
        assert_eq!(summary.total_present_today, 1);
        assert_eq!(summary.total_absent_today, 1);
        assert_eq!(
            summary.departments,
            vec![
                DepartmentCount { department: "Eng".into(), count: 2 },
                DepartmentCount { department: "Finance".into(), count: 1 },
            ]
        );
    }
}
