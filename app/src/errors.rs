// app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use tani::MarketError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Auth(String),

  #[error("{0}")]
  Market(#[from] MarketError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Shipping Provider Error: {0}")]
  Shipping(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Market(err) => match err {
        MarketError::Validation(_) => StatusCode::BAD_REQUEST,
        MarketError::Rejected { reason, .. } if reason.is_quantity_bound() => StatusCode::BAD_REQUEST,
        MarketError::NotFound(_) => StatusCode::NOT_FOUND,
        MarketError::Forbidden(_) => StatusCode::FORBIDDEN,
        MarketError::Rejected { .. } | MarketError::InsufficientStock { .. } | MarketError::Conflict(_) => {
          StatusCode::CONFLICT
        }
        MarketError::Database(_) | MarketError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Shipping(_) => StatusCode::BAD_GATEWAY,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Rejecting request");
    }

    let body = match self {
      AppError::Market(MarketError::Rejected { product_id, reason }) => {
        json!({"error": reason.to_string(), "productId": product_id})
      }
      AppError::Market(err @ MarketError::InsufficientStock { product_id }) => {
        json!({"error": err.to_string(), "productId": product_id})
      }
      AppError::Market(MarketError::Database(_) | MarketError::Storage(_)) | AppError::Sqlx(_) => {
        json!({"error": "Database operation failed"})
      }
      AppError::Config(_) => json!({"error": "Configuration issue"}),
      AppError::Internal(_) => json!({"error": "An internal error occurred"}),
      AppError::Shipping(m) => json!({"error": "Shipping provider error", "detail": m}),
      other => json!({"error": other.to_string()}),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
