// core/src/availability.rs

//! The availability rules every cart write path and checkout goes through.
//!
//! Rules, first match wins:
//! 1. `deleted` is refused.
//! 2. `sold_out` is refused.
//! 3. `pre_order` accepts any total at or above `min_order`, regardless of stock.
//! 4. `ready_stock` accepts a total within `min_order..=stock`.
//! 5. Anything else (`inactive`) is refused as unavailable.
//!
//! "Total" is the quantity already in the cart plus the requested quantity, so an
//! incremental add can never push a line past the available stock.

use thiserror::Error;
use uuid::Uuid;

use crate::error::{MarketError, MarketResult};
use crate::model::{CartProduct, Product, ProductStatus};

/// The product fields the rules look at, as read at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockPosition {
  pub status: ProductStatus,
  pub stock: i32,
  pub min_order: i32,
}

impl From<&Product> for StockPosition {
  fn from(product: &Product) -> Self {
    Self {
      status: product.status,
      stock: product.stock,
      min_order: product.min_order,
    }
  }
}

impl From<&CartProduct> for StockPosition {
  fn from(product: &CartProduct) -> Self {
    Self {
      status: product.status,
      stock: product.stock,
      min_order: product.min_order,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("product not found or deleted")]
  Deleted,

  #[error("product is sold out")]
  SoldOut,

  #[error("quantity must be at least {min_order} for pre-order")]
  BelowPreOrderMinimum { min_order: i32 },

  #[error("quantity must be at least {min_order}")]
  BelowMinimum { min_order: i32 },

  #[error("insufficient stock, available: {available}")]
  InsufficientStock { available: i32 },

  #[error("product is currently unavailable")]
  Unavailable,
}

impl Rejection {
  /// The product is fine but the quantity is out of bounds, as opposed to the
  /// product itself being unavailable.
  pub fn is_quantity_bound(&self) -> bool {
    matches!(
      self,
      Rejection::BelowPreOrderMinimum { .. } | Rejection::BelowMinimum { .. } | Rejection::InsufficientStock { .. }
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Accept,
  Reject(Rejection),
}

impl Decision {
  pub fn is_accepted(&self) -> bool {
    matches!(self, Decision::Accept)
  }

  pub fn into_result(self, product_id: Uuid) -> MarketResult<()> {
    match self {
      Decision::Accept => Ok(()),
      Decision::Reject(reason) => Err(MarketError::Rejected { product_id, reason }),
    }
  }
}

/// Decides whether `requested` more units may join the `existing` ones in a cart line.
/// A pre-order minimum applies to each request on its own; ready-stock bounds apply
/// to the cumulative line quantity.
pub fn evaluate(position: StockPosition, requested: i32, existing: i32) -> Decision {
  let total = existing.saturating_add(requested);
  match position.status {
    ProductStatus::Deleted => Decision::Reject(Rejection::Deleted),
    ProductStatus::SoldOut => Decision::Reject(Rejection::SoldOut),
    ProductStatus::PreOrder => {
      if requested < position.min_order {
        Decision::Reject(Rejection::BelowPreOrderMinimum {
          min_order: position.min_order,
        })
      } else {
        Decision::Accept
      }
    }
    ProductStatus::ReadyStock => {
      if total < position.min_order {
        Decision::Reject(Rejection::BelowMinimum {
          min_order: position.min_order,
        })
      } else if total > position.stock {
        Decision::Reject(Rejection::InsufficientStock {
          available: position.stock,
        })
      } else {
        Decision::Accept
      }
    }
    ProductStatus::Inactive => Decision::Reject(Rejection::Unavailable),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn position(status: ProductStatus, stock: i32, min_order: i32) -> StockPosition {
    StockPosition {
      status,
      stock,
      min_order,
    }
  }

  #[test]
  fn ready_stock_accepts_exactly_the_min_to_stock_window() {
    let p = position(ProductStatus::ReadyStock, 5, 2);
    for q in 0..=8 {
      let expected = (2..=5).contains(&q);
      assert_eq!(evaluate(p, q, 0).is_accepted(), expected, "q = {q}");
    }
  }

  #[test]
  fn pre_order_ignores_stock() {
    let p = position(ProductStatus::PreOrder, 0, 3);
    assert_eq!(
      evaluate(p, 2, 0),
      Decision::Reject(Rejection::BelowPreOrderMinimum { min_order: 3 })
    );
    assert_eq!(evaluate(p, 3, 0), Decision::Accept);
    assert_eq!(evaluate(p, 500, 0), Decision::Accept);
  }

  #[test]
  fn pre_order_minimum_applies_to_each_request() {
    let p = position(ProductStatus::PreOrder, 0, 5);
    assert_eq!(
      evaluate(p, 1, 5),
      Decision::Reject(Rejection::BelowPreOrderMinimum { min_order: 5 })
    );
    assert_eq!(evaluate(p, 5, 5), Decision::Accept);
  }

  #[test]
  fn existing_quantity_counts_against_stock() {
    let p = position(ProductStatus::ReadyStock, 5, 2);
    assert_eq!(evaluate(p, 3, 0), Decision::Accept);
    assert_eq!(
      evaluate(p, 3, 3),
      Decision::Reject(Rejection::InsufficientStock { available: 5 })
    );
    assert_eq!(evaluate(p, 2, 3), Decision::Accept);
  }

  #[test]
  fn status_rules_win_over_quantity_rules() {
    assert_eq!(
      evaluate(position(ProductStatus::Deleted, 10, 1), 1, 0),
      Decision::Reject(Rejection::Deleted)
    );
    assert_eq!(
      evaluate(position(ProductStatus::SoldOut, 10, 1), 1, 0),
      Decision::Reject(Rejection::SoldOut)
    );
    assert_eq!(
      evaluate(position(ProductStatus::Inactive, 10, 1), 1, 0),
      Decision::Reject(Rejection::Unavailable)
    );
  }

  #[test]
  fn below_minimum_is_reported_before_stock() {
    let p = position(ProductStatus::ReadyStock, 0, 2);
    assert_eq!(
      evaluate(p, 1, 0),
      Decision::Reject(Rejection::BelowMinimum { min_order: 2 })
    );
  }

  #[test]
  fn rejection_messages_carry_the_bound() {
    assert_eq!(
      Rejection::InsufficientStock { available: 5 }.to_string(),
      "insufficient stock, available: 5"
    );
    assert_eq!(
      Rejection::BelowPreOrderMinimum { min_order: 4 }.to_string(),
      "quantity must be at least 4 for pre-order"
    );
  }
}
