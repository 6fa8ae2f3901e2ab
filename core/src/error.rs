// core/src/error.rs
use thiserror::Error;
use uuid::Uuid;

use crate::availability::Rejection;

#[derive(Debug, Error)]
pub enum MarketError {
  /// Malformed or out-of-range input.
  #[error("{0}")]
  Validation(String),

  /// The referenced entity does not exist or is not owned by the caller.
  #[error("{0}")]
  NotFound(String),

  /// The availability rules refused the requested quantity.
  #[error("{reason}")]
  Rejected { product_id: Uuid, reason: Rejection },

  /// Checkout found less stock than a cart line asks for.
  #[error("stock for product {product_id} is insufficient")]
  InsufficientStock { product_id: Uuid },

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("Database Error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Storage Error: {0}")]
  Storage(String),
}

impl MarketError {
  pub fn validation(message: impl Into<String>) -> Self {
    MarketError::Validation(message.into())
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    MarketError::NotFound(message.into())
  }

  pub fn conflict(message: impl Into<String>) -> Self {
    MarketError::Conflict(message.into())
  }

  pub fn forbidden(message: impl Into<String>) -> Self {
    MarketError::Forbidden(message.into())
  }

  /// Client-fault errors are never retried; infrastructure errors may be.
  pub fn is_client_fault(&self) -> bool {
    !matches!(self, MarketError::Database(_) | MarketError::Storage(_))
  }
}

pub type MarketResult<T, E = MarketError> = std::result::Result<T, E>;
