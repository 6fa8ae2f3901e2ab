// core/src/model/cart.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::product::ProductStatus;

/// One (user, product) pairing awaiting checkout. A stored line always has
/// `quantity >= 1`; a line that would drop to zero is deleted instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// How a caller identifies a cart line: by product or by the line's own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartLineRef {
  Product(Uuid),
  Line(Uuid),
}

/// Product fields as they are at the time the cart is read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
  pub id: Uuid,
  pub name: String,
  pub price: i64,
  pub image: Option<String>,
  pub unit: String,
  pub stock: i32,
  pub min_order: i32,
  pub status: ProductStatus,
  pub weight: i32,
  pub origin_village_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub product: CartProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartListing {
  pub lines: Vec<CartLineView>,
  /// Sum of `quantity * product.weight`, in grams.
  pub total_weight: i64,
}

impl CartListing {
  pub fn new(lines: Vec<CartLineView>) -> Self {
    let total_weight = lines
      .iter()
      .map(|line| i64::from(line.quantity) * i64::from(line.product.weight))
      .sum();
    Self { lines, total_weight }
  }
}

/// Outcome of a quantity change on an existing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
  Updated(CartLine),
  Removed,
}

impl CartChange {
  pub fn quantity(&self) -> i32 {
    match self {
      CartChange::Updated(line) => line.quantity,
      CartChange::Removed => 0,
    }
  }
}
