use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A single rejected request field, e.g. `items[0].quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid order data")]
    Validation(Vec<FieldError>),
    #[error("Menu item {0} not found")]
    UnknownMenuItem(i32),
    #[error("Internal error: {0}")]
    Internal(String),
}
