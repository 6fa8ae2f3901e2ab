// core/src/checkout.rs

//! Turns a user's cart into an order inside one [`CheckoutTx`]. Either every
//! write lands (order, order lines, stock decrements, cart clearing) or none does.

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::availability::evaluate;
use crate::error::{MarketError, MarketResult};
use crate::model::{NewOrder, Order, OrderLine};
use crate::store::{CheckoutLine, CheckoutTx, MarketStore};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
  pub address_id: Uuid,
  /// Cost of the shipping option the buyer picked, in rupiah.
  pub shipping_cost: i64,
  pub payment_method: String,
  /// The amount the buyer expects to pay. Must equal products + shipping.
  pub total_amount: i64,
}

impl CheckoutRequest {
  pub fn validate(&self) -> MarketResult<()> {
    if self.shipping_cost < 0 {
      return Err(MarketError::validation("shipping cost cannot be negative"));
    }
    if self.payment_method.trim().is_empty() {
      return Err(MarketError::validation("payment method is required"));
    }
    if self.total_amount <= 0 {
      return Err(MarketError::validation("total amount must be greater than 0"));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
  pub order: Order,
  pub lines: Vec<OrderLine>,
}

impl CheckoutReceipt {
  pub fn order_id(&self) -> Uuid {
    self.order.id
  }
}

/// Places an order from the user's whole cart.
#[instrument(
  name = "checkout::checkout",
  skip(store, request),
  fields(user_id = %user_id, address_id = %request.address_id),
  err(Display)
)]
pub async fn checkout(store: &dyn MarketStore, user_id: Uuid, request: &CheckoutRequest) -> MarketResult<CheckoutReceipt> {
  request.validate()?;

  let mut tx = store.begin_checkout().await?;
  match place_order(tx.as_mut(), user_id, request).await {
    Ok(receipt) => {
      tx.commit().await?;
      info!(
        "Checkout (User {}): Order {} committed with {} line(s), grand total {}.",
        user_id,
        receipt.order.id,
        receipt.lines.len(),
        receipt.order.grand_total
      );
      Ok(receipt)
    }
    Err(err) => {
      if let Err(rollback_err) = tx.rollback().await {
        error!(error = %rollback_err, "Checkout (User {}): rollback failed.", user_id);
      }
      warn!("Checkout (User {}): rolled back: {}", user_id, err);
      Err(err)
    }
  }
}

async fn place_order(tx: &mut dyn CheckoutTx, user_id: Uuid, request: &CheckoutRequest) -> MarketResult<CheckoutReceipt> {
  // Step: verify_address
  if !tx.address_belongs_to(user_id, request.address_id).await? {
    return Err(MarketError::not_found("address not found"));
  }

  // Step: load_cart
  let lines = tx.lock_cart(user_id).await?;
  if lines.is_empty() {
    return Err(MarketError::validation("cart is empty"));
  }
  info!("Checkout (User {}): {} cart line(s) locked.", user_id, lines.len());

  // Step: validate_lines
  for line in &lines {
    if line.stock < line.quantity {
      return Err(MarketError::InsufficientStock {
        product_id: line.product_id,
      });
    }
    evaluate(line.position(), line.quantity, 0).into_result(line.product_id)?;
  }

  // Step: price_order
  let total_product_price = subtotal(&lines)?;
  let grand_total = total_product_price
    .checked_add(request.shipping_cost)
    .ok_or_else(|| MarketError::validation("order total is too large"))?;
  if grand_total != request.total_amount {
    return Err(MarketError::validation(format!(
      "total amount {} does not match the order total {}",
      request.total_amount, grand_total
    )));
  }

  // Step: create_order
  let order = tx
    .insert_order(&NewOrder {
      user_id,
      address_id: request.address_id,
      payment_method: request.payment_method.trim().to_string(),
      total_product_price,
      shipping_cost: request.shipping_cost,
      grand_total,
    })
    .await?;

  // Step: decrement_stock
  let mut order_lines = Vec::with_capacity(lines.len());
  for line in &lines {
    if !tx.decrement_stock(line.product_id, line.quantity).await? {
      return Err(MarketError::InsufficientStock {
        product_id: line.product_id,
      });
    }
    order_lines.push(tx.insert_order_line(order.id, line).await?);
  }

  // Step: clear_cart
  let cleared = tx.clear_cart(user_id).await?;
  info!("Checkout (User {}): {} cart line(s) consumed by order {}.", user_id, cleared, order.id);

  Ok(CheckoutReceipt {
    order,
    lines: order_lines,
  })
}

fn subtotal(lines: &[CheckoutLine]) -> MarketResult<i64> {
  lines.iter().try_fold(0i64, |sum, line| {
    line
      .price
      .checked_mul(i64::from(line.quantity))
      .and_then(|amount| sum.checked_add(amount))
      .ok_or_else(|| MarketError::validation("order total is too large"))
  })
}
