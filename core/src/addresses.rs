// core/src/addresses.rs

//! Shipping addresses, scoped to their owner. An address some order points at is
//! frozen: it can be neither changed nor removed.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{MarketError, MarketResult};
use crate::model::{Address, AddressPatch, NewAddress};
use crate::store::MarketStore;

const NOT_FOUND: &str = "address not found";

#[instrument(name = "addresses::list", skip(store), err(Display))]
pub async fn list_addresses(store: &dyn MarketStore, user_id: Uuid) -> MarketResult<Vec<Address>> {
  store.list_addresses(user_id).await
}

#[instrument(name = "addresses::create", skip(store, address), err(Display))]
pub async fn create_address(store: &dyn MarketStore, user_id: Uuid, address: &NewAddress) -> MarketResult<Address> {
  address.validate()?;
  let created = store.insert_address(user_id, address).await?;
  info!(address_id = %created.id, "Address created.");
  Ok(created)
}

/// Full replacement of every field.
#[instrument(name = "addresses::replace", skip(store, address), err(Display))]
pub async fn replace_address(
  store: &dyn MarketStore,
  user_id: Uuid,
  address_id: Uuid,
  address: &NewAddress,
) -> MarketResult<Address> {
  address.validate()?;
  patch_address(store, user_id, address_id, &AddressPatch::from(address.clone())).await
}

#[instrument(name = "addresses::patch", skip(store, patch), err(Display))]
pub async fn patch_address(
  store: &dyn MarketStore,
  user_id: Uuid,
  address_id: Uuid,
  patch: &AddressPatch,
) -> MarketResult<Address> {
  patch.validate()?;
  ensure_mutable(store, user_id, address_id).await?;
  store
    .update_address(user_id, address_id, patch)
    .await?
    .ok_or_else(|| MarketError::not_found(NOT_FOUND))
}

#[instrument(name = "addresses::delete", skip(store), err(Display))]
pub async fn delete_address(store: &dyn MarketStore, user_id: Uuid, address_id: Uuid) -> MarketResult<()> {
  ensure_mutable(store, user_id, address_id).await?;
  if !store.delete_address(user_id, address_id).await? {
    return Err(MarketError::not_found(NOT_FOUND));
  }
  info!("Address deleted.");
  Ok(())
}

async fn ensure_mutable(store: &dyn MarketStore, user_id: Uuid, address_id: Uuid) -> MarketResult<()> {
  if store.find_address(user_id, address_id).await?.is_none() {
    return Err(MarketError::not_found(NOT_FOUND));
  }
  if store.address_has_orders(address_id).await? {
    return Err(MarketError::conflict("address is used by an order and can no longer change"));
  }
  Ok(())
}
