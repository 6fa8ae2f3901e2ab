// core/src/orders.rs

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{MarketError, MarketResult};
use crate::model::{Actor, Order, OrderDetail, OrderStatus};
use crate::store::MarketStore;

const NOT_FOUND: &str = "order not found";

/// Orders of a user, newest first, each with its address and lines.
#[instrument(name = "orders::list", skip(store), err(Display))]
pub async fn list_orders(store: &dyn MarketStore, user_id: Uuid) -> MarketResult<Vec<OrderDetail>> {
  let orders = store.list_orders(user_id).await?;
  let mut details = Vec::with_capacity(orders.len());
  for order in orders {
    details.push(detail(store, order).await?);
  }
  Ok(details)
}

#[instrument(name = "orders::get", skip(store), err(Display))]
pub async fn get_order(store: &dyn MarketStore, user_id: Uuid, order_id: Uuid) -> MarketResult<OrderDetail> {
  let order = owned_order(store, user_id, order_id).await?;
  detail(store, order).await
}

/// Cancels a pending order. The row stays with status `cancelled`.
#[instrument(name = "orders::cancel", skip(store), err(Display))]
pub async fn cancel_order(store: &dyn MarketStore, user_id: Uuid, order_id: Uuid) -> MarketResult<Order> {
  let order = owned_order(store, user_id, order_id).await?;
  transition(store, order, OrderStatus::Cancelled).await
}

/// Moves an order along its lifecycle. Admins only.
#[instrument(
  name = "orders::advance",
  skip(store),
  fields(actor = %actor.user_id),
  err(Display)
)]
pub async fn advance_order(
  store: &dyn MarketStore,
  actor: Actor,
  order_id: Uuid,
  next: OrderStatus,
) -> MarketResult<Order> {
  if !actor.is_admin() {
    return Err(MarketError::forbidden("only admins can change order status"));
  }
  let order = store
    .find_order(order_id)
    .await?
    .ok_or_else(|| MarketError::not_found(NOT_FOUND))?;
  transition(store, order, next).await
}

async fn owned_order(store: &dyn MarketStore, user_id: Uuid, order_id: Uuid) -> MarketResult<Order> {
  store
    .find_order(order_id)
    .await?
    .filter(|o| o.user_id == user_id)
    .ok_or_else(|| MarketError::not_found(NOT_FOUND))
}

async fn transition(store: &dyn MarketStore, order: Order, next: OrderStatus) -> MarketResult<Order> {
  if !order.status.can_transition_to(next) {
    return Err(MarketError::conflict(format!(
      "order cannot move from {} to {}",
      order.status, next
    )));
  }
  // Conditional on the status we just read; a concurrent change makes this a no-op.
  let updated = store
    .transition_order(order.id, order.status, next)
    .await?
    .ok_or_else(|| MarketError::conflict("order status changed concurrently, please retry"))?;
  info!(order_id = %updated.id, from = %order.status, to = %next, "Order status changed.");
  Ok(updated)
}

async fn detail(store: &dyn MarketStore, order: Order) -> MarketResult<OrderDetail> {
  let address = store
    .find_address(order.user_id, order.address_id)
    .await?
    .ok_or_else(|| MarketError::Storage(format!("order {} points at a missing address", order.id)))?;
  let lines = store.order_lines(order.id).await?;
  Ok(OrderDetail { order, address, lines })
}
