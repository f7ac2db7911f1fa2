use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::errors::{DomainError, FieldError};

/// JSON body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{message}")]
    BadRequest {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            fields: vec![],
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(fields) => AppError::BadRequest {
                message: "Invalid order data".to_string(),
                fields,
            },
            DomainError::UnknownMenuItem(id) => AppError::BadRequest {
                message: format!("Menu item {} not found", id),
                fields: vec![FieldError::new("items", format!("unknown menu item {}", id))],
            },
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(ErrorResponse {
                error: self.to_string(),
                fields: vec![],
            }),
            AppError::BadRequest { message, fields } => {
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: message.clone(),
                    fields: fields.clone(),
                })
            }
            AppError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Internal server error".to_string(),
                    fields: vec![],
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order").error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_request_returns_400() {
        let resp = AppError::bad_request("nope").error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_display() {
        assert_eq!(AppError::NotFound("Order").to_string(), "Order not found");
    }

    #[test]
    fn domain_validation_maps_to_bad_request_with_fields() {
        let app_err: AppError =
            DomainError::Validation(vec![FieldError::new("customer_name", "is required")]).into();
        match app_err {
            AppError::BadRequest { fields, .. } => assert_eq!(fields[0].field, "customer_name"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn domain_unknown_menu_item_names_the_id() {
        let app_err: AppError = DomainError::UnknownMenuItem(42).into();
        assert_eq!(app_err.to_string(), "Menu item 42 not found");
    }

    #[test]
    fn domain_internal_maps_to_app_internal() {
        let app_err: AppError = DomainError::Internal("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
