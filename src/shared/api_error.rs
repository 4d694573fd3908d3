use std::fmt::Display;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use super::http_error::HttpError;
use super::repository_error::RepositoryError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{message}")]
  Validation {
    message: String,
    errors: Vec<String>,
  },
  #[error("{0}")]
  BadRequest(String),
  #[error("{0}")]
  NotFound(String),
  #[error("{0}")]
  Unauthorized(String),
  #[error("{0}")]
  Forbidden(String),
  #[error("{0}")]
  Conflict(String),
  #[error("{0}")]
  UnsupportedMediaType(String),
  #[error("{0}")]
  PayloadTooLarge(String),
  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  pub fn validation(errors: Vec<String>) -> Self {
    Self::Validation {
      message: String::from("Validation error"),
      errors,
    }
  }

  /// Logs the underlying failure and hides it behind `message`.
  pub fn internal(message: &str, error: impl Display) -> Self {
    tracing::error!(%error, "{}", message);
    Self::Internal(message.to_string())
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      // Upload rejections and duplicate keys are reported as 400.
      ApiError::Validation { .. }
      | ApiError::BadRequest(_)
      | ApiError::Conflict(_)
      | ApiError::UnsupportedMediaType(_)
      | ApiError::PayloadTooLarge(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let body = match self {
      ApiError::Validation { message, errors } => HttpError {
        message: message.clone(),
        errors: errors.clone(),
      },
      other => HttpError::from(other.to_string()),
    };
    HttpResponse::build(self.status_code())
      .content_type("application/json")
      .json(body)
  }
}

impl From<RepositoryError> for ApiError {
  fn from(error: RepositoryError) -> Self {
    match error {
      RepositoryError::Duplicate { field } => {
        ApiError::Conflict(format!("A record with this {} already exists", field))
      }
      RepositoryError::Validation(errors) => ApiError::from(errors),
      other => ApiError::internal("Database operation failed", other),
    }
  }
}
