// core/src/catalog.rs

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{MarketError, MarketResult};
use crate::model::{Actor, NewProduct, Product, ProductPatch, ProductQuery, ProductStatus, Role};
use crate::store::MarketStore;

const NOT_FOUND: &str = "product not found";

#[instrument(name = "catalog::list_products", skip(store), err(Display))]
pub async fn list_products(store: &dyn MarketStore, query: &ProductQuery) -> MarketResult<Vec<Product>> {
  query.validate()?;
  store.list_products(query).await
}

/// A deleted product reads as not found.
#[instrument(name = "catalog::get_product", skip(store), err(Display))]
pub async fn get_product(store: &dyn MarketStore, product_id: Uuid) -> MarketResult<Product> {
  store
    .find_product(product_id)
    .await?
    .filter(|p| p.status != ProductStatus::Deleted)
    .ok_or_else(|| MarketError::not_found(NOT_FOUND))
}

#[instrument(
  name = "catalog::create_product",
  skip(store, product),
  fields(actor = %actor.user_id, role = %actor.role),
  err(Display)
)]
pub async fn create_product(store: &dyn MarketStore, actor: Actor, product: &NewProduct) -> MarketResult<Product> {
  let seller_id = match actor.role {
    Role::Buyer => return Err(MarketError::forbidden("only sellers and admins can list products")),
    Role::Seller => match product.seller_id {
      Some(other) if other != actor.user_id => {
        return Err(MarketError::forbidden("sellers can only list their own products"));
      }
      _ => actor.user_id,
    },
    Role::Admin => product.seller_id.unwrap_or(actor.user_id),
  };
  product.validate()?;

  let created = store.insert_product(seller_id, product).await?;
  info!(product_id = %created.id, status = %created.status, "Product listed.");
  Ok(created)
}

#[instrument(
  name = "catalog::update_product",
  skip(store, patch),
  fields(actor = %actor.user_id, role = %actor.role),
  err(Display)
)]
pub async fn update_product(
  store: &dyn MarketStore,
  actor: Actor,
  product_id: Uuid,
  patch: &ProductPatch,
) -> MarketResult<Product> {
  if patch.is_empty() {
    return Err(MarketError::validation("no fields to update"));
  }
  patch.validate()?;

  let current = get_product(store, product_id).await?;
  authorize(actor, &current)?;
  if let Some(next) = patch.status {
    if !current.status.can_transition_to(next) {
      return Err(MarketError::conflict(format!(
        "product status cannot change from {} to {}",
        current.status, next
      )));
    }
  }

  store
    .update_product(product_id, patch)
    .await?
    .ok_or_else(|| MarketError::not_found(NOT_FOUND))
}

/// Soft delete: the row stays, with status `deleted`.
#[instrument(
  name = "catalog::delete_product",
  skip(store),
  fields(actor = %actor.user_id, role = %actor.role),
  err(Display)
)]
pub async fn delete_product(store: &dyn MarketStore, actor: Actor, product_id: Uuid) -> MarketResult<Product> {
  let current = store
    .find_product(product_id)
    .await?
    .ok_or_else(|| MarketError::not_found(NOT_FOUND))?;
  authorize(actor, &current)?;
  if !current.status.can_transition_to(ProductStatus::Deleted) {
    return Err(MarketError::conflict("product is already deleted"));
  }

  let deleted = store
    .update_product(product_id, &ProductPatch::status_only(ProductStatus::Deleted))
    .await?
    .ok_or_else(|| MarketError::conflict("product is already deleted"))?;
  info!("Product soft-deleted.");
  Ok(deleted)
}

fn authorize(actor: Actor, product: &Product) -> MarketResult<()> {
  match actor.role {
    Role::Admin => Ok(()),
    Role::Seller if product.seller_id == actor.user_id => Ok(()),
    Role::Seller => Err(MarketError::forbidden("sellers can only manage their own products")),
    Role::Buyer => Err(MarketError::forbidden("only sellers and admins can manage products")),
  }
}
