// core/src/model/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type as SqlxType;
use std::fmt;
use uuid::Uuid;

use super::address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Paid,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Paid => "paid",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  fn progress(self) -> Option<u8> {
    match self {
      OrderStatus::Pending => Some(0),
      OrderStatus::Paid => Some(1),
      OrderStatus::Shipped => Some(2),
      OrderStatus::Delivered => Some(3),
      OrderStatus::Cancelled => None,
    }
  }

  /// Fulfilment only moves forward (pending -> paid -> shipped -> delivered,
  /// skipping allowed); cancellation is reachable from `Pending` alone.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    match (self, next) {
      (OrderStatus::Pending, OrderStatus::Cancelled) => true,
      _ => match (self.progress(), next.progress()) {
        (Some(current), Some(target)) => target > current,
        _ => false,
      },
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub address_id: Uuid,
  pub status: OrderStatus,
  pub payment_method: String,
  pub total_product_price: i64,
  pub shipping_cost: i64,
  pub grand_total: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Order row to be written by checkout; the store assigns id, status and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub address_id: Uuid,
  pub payment_method: String,
  pub total_product_price: i64,
  pub shipping_cost: i64,
  pub grand_total: i64,
}

/// Immutable once written; `price_at_order` is the product price at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_at_order: i64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub product_name: String,
  pub product_image: Option<String>,
  pub quantity: i32,
  pub price_at_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
  #[serde(flatten)]
  pub order: Order,
  pub address: Address,
  pub lines: Vec<OrderLineView>,
}

#[cfg(test)]
mod tests {
  use super::OrderStatus::*;

  #[test]
  fn fulfilment_only_moves_forward() {
    assert!(Pending.can_transition_to(Paid));
    assert!(Paid.can_transition_to(Shipped));
    assert!(Pending.can_transition_to(Delivered));
    assert!(!Shipped.can_transition_to(Paid));
    assert!(!Delivered.can_transition_to(Delivered));
  }

  #[test]
  fn cancellation_only_from_pending() {
    assert!(Pending.can_transition_to(Cancelled));
    assert!(!Paid.can_transition_to(Cancelled));
    assert!(!Cancelled.can_transition_to(Pending));
    assert!(!Cancelled.can_transition_to(Cancelled));
  }
}
