use chrono::NaiveDate;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::QueryAs;

use crate::model::attendance::AttendanceFilter;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    U64(u64),
    Str(String),
    Date(NaiveDate),
}

/// ===============================
/// Conjunctive WHERE clause container
/// ===============================
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<&'static str>,
    pub values: Vec<SqlValue>,
}

impl WhereClause {
    pub fn push(&mut self, condition: &'static str, value: SqlValue) {
        self.conditions.push(condition);
        self.values.push(value);
    }

    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// Translates an attendance filter into conditions on the `a` (attendance)
/// alias. Range bounds are inclusive.
pub fn attendance_where(filter: &AttendanceFilter) -> WhereClause {
    let mut clause = WhereClause::default();

    if let Some(employee_id) = filter.employee_id {
        clause.push("a.employee_id = ?", SqlValue::U64(employee_id));
    }
    if let Some(date) = filter.date {
        clause.push("a.date = ?", SqlValue::Date(date));
    }
    if let Some(from) = filter.date_from {
        clause.push("a.date >= ?", SqlValue::Date(from));
    }
    if let Some(to) = filter.date_to {
        clause.push("a.date <= ?", SqlValue::Date(to));
    }
    if let Some(status) = filter.status {
        clause.push("a.status = ?", SqlValue::Str(status.to_string()));
    }

    clause
}

/// ===============================
/// Bind values in clause order
/// ===============================
pub fn bind_all<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: Vec<SqlValue>,
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Str(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
    }
    query
}
