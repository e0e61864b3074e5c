use chrono::NaiveDate;

use crate::error::FieldErrors;
use crate::model::attendance::AttendanceStatus;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
pub const INVALID_STATUS: &str = "Status must be 'Present' or 'Absent'.";

/// Rule for a free-text column: trimmed, non-empty, bounded, optionally
/// lowercased.
#[derive(Debug)]
pub struct TextRule {
    pub field: &'static str,
    pub empty_message: &'static str,
    pub max_chars: usize,
    pub lowercase: bool,
}

impl TextRule {
    pub fn clean(&self, raw: &str) -> Result<String, String> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(self.empty_message.to_string());
        }
        let count = value.chars().count();
        if count > self.max_chars {
            return Err(format!(
                "Ensure this field has no more than {} characters.",
                self.max_chars
            ));
        }
        Ok(if self.lowercase {
            value.to_lowercase()
        } else {
            value.to_string()
        })
    }

    /// Cleans `supplied` if present, else falls back to `current`. Errors are
    /// recorded against the rule's field and `None` is returned, so every rule
    /// runs even after an earlier one failed.
    pub fn resolve(
        &self,
        errors: &mut FieldErrors,
        supplied: Option<&str>,
        current: Option<&str>,
    ) -> Option<String> {
        match (supplied, current) {
            (Some(raw), _) => match self.clean(raw) {
                Ok(value) => Some(value),
                Err(message) => {
                    errors.add(self.field, message);
                    None
                }
            },
            (None, Some(existing)) => Some(existing.to_string()),
            (None, None) => {
                errors.add(self.field, REQUIRED);
                None
            }
        }
    }
}

pub const EMPLOYEE_CODE: TextRule = TextRule {
    field: "employee_code",
    empty_message: "Employee code cannot be empty.",
    max_chars: 20,
    lowercase: false,
};

pub const FULL_NAME: TextRule = TextRule {
    field: "full_name",
    empty_message: "Full name cannot be empty.",
    max_chars: 200,
    lowercase: false,
};

pub const EMAIL: TextRule = TextRule {
    field: "email",
    empty_message: "This field may not be blank.",
    max_chars: 254,
    lowercase: true,
};

pub const DEPARTMENT: TextRule = TextRule {
    field: "department",
    empty_message: "Department cannot be empty.",
    max_chars: 100,
    lowercase: false,
};

/// Shape check only; deliverability is not our concern.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| INVALID_DATE)
}

/// Case-sensitive match on the two statuses, surrounding whitespace ignored.
pub fn parse_status(raw: &str) -> Result<AttendanceStatus, &'static str> {
    raw.trim().parse().map_err(|_| INVALID_STATUS)
}
