use std::collections::BTreeMap;
use std::fmt;

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::store::StoreError;

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field name -> every message collected for it, keyed in name order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Body of every 400/409 answer.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(value_type = Object, example = json!({"email": ["An employee with this email already exists."]}))]
    pub errors: FieldErrors,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) | ApiError::Conflict(errors) => {
                HttpResponse::build(self.status_code()).json(ErrorBody {
                    errors: errors.clone(),
                })
            }
            ApiError::NotFound(message) => HttpResponse::NotFound().json(json!({
                "message": message
            })),
            ApiError::Store(e) => {
                error!(error = %e, "Store failure surfaced to client");
                HttpResponse::InternalServerError().json(json!({
                    "message": "Something went wrong, Contact with system admin"
                }))
            }
        }
    }
}

fn bad_request<E>(err: E, message: String) -> actix_web::Error
where
    E: fmt::Debug + fmt::Display + 'static,
{
    let body = ErrorBody {
        errors: FieldErrors::single(NON_FIELD_ERRORS, message),
    };
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Extractor configs that answer malformed input in the same `{errors}` shape
/// as validation failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        bad_request(err, message)
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        bad_request(err, message)
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        bad_request(err, message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn field_errors_keep_every_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("email", "first");
        errors.add("email", "second");
        errors.add("department", "third");

        assert_eq!(errors.get("email").unwrap(), ["first", "second"]);
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["department", "email"]);
        assert_eq!(
            errors.to_string(),
            "department: third; email: first; email: second"
        );
    }

    #[test]
    fn status_codes_follow_error_class() {
        let validation = ApiError::Validation(FieldErrors::single("status", "bad"));
        let conflict = ApiError::Conflict(FieldErrors::single("date", "taken"));
        let missing = ApiError::NotFound("Employee not found".into());
        let store = ApiError::Store(StoreError::Poisoned);

        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn validation_body_lists_errors_by_field() {
        let err = ApiError::Validation(FieldErrors::single("email", "Enter a valid email address."));
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(
            value,
            json!({"errors": {"email": ["Enter a valid email address."]}})
        );
    }

    #[actix_web::test]
    async fn store_failure_hides_internal_detail() {
        let err = ApiError::Store(StoreError::Poisoned);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert!(!text.contains("poisoned"));
        assert!(text.contains("Something went wrong"));
    }
}
