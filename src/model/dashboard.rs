use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentCount {
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 4)]
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "total_employees": 6,
    "total_present_today": 4,
    "total_absent_today": 1,
    "departments": [
        { "department": "Engineering", "count": 4 },
        { "department": "Finance", "count": 2 }
    ]
}))]
pub struct DashboardSummary {
    pub total_employees: i64,
    pub total_present_today: i64,
    pub total_absent_today: i64,
    pub departments: Vec<DepartmentCount>,
}
