// app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::store::StoreError;
use orderflow::FlowError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Storage Error: {0}")]
  Store(#[from] StoreError),

  #[error("Checkout Failed: {0}")]
  Checkout(#[from] CheckoutError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  /// A pipeline stopped cleanly where the caller needed it to complete.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => match err.downcast::<StoreError>() {
        Ok(store_err) => AppError::Store(store_err),
        Err(err) => AppError::Internal(err.to_string()),
      },
    }
  }
}

impl AppError {
  /// Message safe to show a client. Server-side failures never expose storage detail.
  fn public_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::Conflict(m) => m.clone(),
      AppError::Checkout(e) => match e {
        CheckoutError::InvalidInput(_) | CheckoutError::ProductUnavailable(_) | CheckoutError::InsufficientStock { .. } => {
          e.to_string()
        }
        CheckoutError::LookupFailure(_) | CheckoutError::PersistenceFailure(_) => {
          "The order could not be processed, please try again.".to_string()
        }
      },
      AppError::Store(StoreError::Conflict(m)) => m.clone(),
      AppError::Config(_) => "Configuration issue".to_string(),
      AppError::Store(_) => "Database operation failed".to_string(),
      AppError::Workflow { .. } => "Workflow processing error".to_string(),
      AppError::Internal(_) => "An internal error occurred".to_string(),
      AppError::PipelineHaltedByHandler => "Process halted by business logic.".to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) | AppError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
      AppError::Checkout(CheckoutError::InvalidInput(_) | CheckoutError::ProductUnavailable(_)) => {
        StatusCode::BAD_REQUEST
      }
      AppError::Checkout(CheckoutError::InsufficientStock { .. }) => StatusCode::CONFLICT,
      AppError::Checkout(_)
      | AppError::Store(_)
      | AppError::Config(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_)
      | AppError::PipelineHaltedByHandler => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    HttpResponse::build(status).json(json!({ "error": self.public_message() }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
