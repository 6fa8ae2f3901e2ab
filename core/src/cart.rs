// core/src/cart.rs

//! Cart line operations. Every write that leaves a positive quantity goes through
//! [`evaluate`]; a line that would reach zero is deleted instead.

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::availability::{evaluate, StockPosition};
use crate::error::{MarketError, MarketResult};
use crate::model::{CartChange, CartLine, CartLineRef, CartListing, Product, ProductStatus};
use crate::store::MarketStore;

const NOT_IN_CART: &str = "product not found in cart";

async fn live_product(store: &dyn MarketStore, product_id: Uuid) -> MarketResult<Option<Product>> {
  Ok(
    store
      .find_product(product_id)
      .await?
      .filter(|p| p.status != ProductStatus::Deleted),
  )
}

/// Adds `quantity` units of a product, merging into the existing line if there is one.
#[instrument(name = "cart::add_or_increment", skip(store), err(Display))]
pub async fn add_or_increment(
  store: &dyn MarketStore,
  user_id: Uuid,
  product_id: Uuid,
  quantity: i32,
) -> MarketResult<CartLine> {
  if quantity <= 0 {
    return Err(MarketError::validation("quantity must be greater than 0"));
  }

  let product = live_product(store, product_id)
    .await?
    .ok_or_else(|| MarketError::not_found("product not found or deleted"))?;
  let existing = store.find_cart_line(user_id, CartLineRef::Product(product_id)).await?;
  let existing_quantity = existing.as_ref().map_or(0, |line| line.quantity);

  evaluate(StockPosition::from(&product), quantity, existing_quantity).into_result(product_id)?;

  let line = match existing {
    Some(line) => {
      let total = line
        .quantity
        .checked_add(quantity)
        .ok_or_else(|| MarketError::validation("quantity is too large"))?;
      store
        .update_cart_quantity(user_id, line.id, total)
        .await?
        .ok_or_else(|| MarketError::conflict("cart was modified concurrently, please retry"))?
    }
    None => store.insert_cart_line(user_id, product_id, quantity).await?,
  };
  info!(line_id = %line.id, quantity = line.quantity, "Cart line stored.");
  Ok(line)
}

/// Sets the absolute quantity of an existing line. Zero removes it.
#[instrument(name = "cart::set_quantity", skip(store), err(Display))]
pub async fn set_quantity(
  store: &dyn MarketStore,
  user_id: Uuid,
  line: CartLineRef,
  quantity: i32,
) -> MarketResult<CartChange> {
  if quantity < 0 {
    return Err(MarketError::validation("quantity cannot be negative"));
  }
  if quantity == 0 {
    return remove(store, user_id, line).await.map(|()| CartChange::Removed);
  }

  let existing = store
    .find_cart_line(user_id, line)
    .await?
    .ok_or_else(|| MarketError::not_found(NOT_IN_CART))?;
  let product = live_product(store, existing.product_id)
    .await?
    .ok_or_else(|| MarketError::not_found("product not found or deleted"))?;
  evaluate(StockPosition::from(&product), quantity, 0).into_result(product.id)?;
  update(store, user_id, existing.id, quantity).await
}

/// Moves a line's quantity by `delta`. Reaching zero or below removes the line; a line
/// whose product has disappeared is removed and reported.
#[instrument(name = "cart::apply_delta", skip(store), err(Display))]
pub async fn apply_delta(
  store: &dyn MarketStore,
  user_id: Uuid,
  product_id: Uuid,
  delta: i32,
) -> MarketResult<CartChange> {
  let line_ref = CartLineRef::Product(product_id);
  let existing = store
    .find_cart_line(user_id, line_ref)
    .await?
    .ok_or_else(|| MarketError::not_found(NOT_IN_CART))?;

  let target = i64::from(existing.quantity) + i64::from(delta);
  if target <= 0 {
    store.delete_cart_line(user_id, line_ref).await?;
    debug!("Delta emptied the line; removed.");
    return Ok(CartChange::Removed);
  }
  let target = i32::try_from(target).map_err(|_| MarketError::validation("quantity is too large"))?;

  let Some(product) = live_product(store, product_id).await? else {
    store.delete_cart_line(user_id, line_ref).await?;
    warn!("Product vanished from the catalog; stale cart line removed.");
    return Err(MarketError::not_found("product is no longer available"));
  };

  evaluate(StockPosition::from(&product), target, 0).into_result(product_id)?;
  update(store, user_id, existing.id, target).await
}

/// Deletes a line.
#[instrument(name = "cart::remove", skip(store), err(Display))]
pub async fn remove(store: &dyn MarketStore, user_id: Uuid, line: CartLineRef) -> MarketResult<()> {
  if store.delete_cart_line(user_id, line).await? {
    Ok(())
  } else {
    Err(MarketError::not_found(NOT_IN_CART))
  }
}

/// Point-in-time view of the cart joined with current product data.
#[instrument(name = "cart::list", skip(store), err(Display))]
pub async fn list(store: &dyn MarketStore, user_id: Uuid) -> MarketResult<CartListing> {
  let lines = store.cart_view(user_id).await?;
  Ok(CartListing::new(lines))
}

async fn update(store: &dyn MarketStore, user_id: Uuid, line_id: Uuid, quantity: i32) -> MarketResult<CartChange> {
  store
    .update_cart_quantity(user_id, line_id, quantity)
    .await?
    .map(CartChange::Updated)
    .ok_or_else(|| MarketError::not_found(NOT_IN_CART))
}
