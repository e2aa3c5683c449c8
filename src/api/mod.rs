//! REST API module.
//!
//! Contains all routes and handlers. Every handler resolves its caller
//! through the [`Principal`](crate::auth::Principal) extractor and checks
//! the caller's role before touching the store.

mod academics;
mod admin;
mod auth;
mod notifications;
mod student;
mod teacher;
mod users;

pub use academics::*;
pub use admin::*;
pub use auth::*;
pub use notifications::*;
pub use student::*;
pub use teacher::*;
pub use users::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a successful API response carrying a confirmation message.
pub fn done<T: Serialize>(data: T, message: &str) -> ApiResult<T> {
    Ok(ApiResponse::new(data).with_message(message))
}

/// Fail with a validation error unless every field is non-blank.
fn require_fields<S: AsRef<str>>(fields: &[S], message: &str) -> Result<(), AppError> {
    if fields.iter().any(|f| f.as_ref().trim().is_empty()) {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(())
}
