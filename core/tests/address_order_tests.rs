// tests/address_order_tests.rs
mod common;
use common::*;
use serial_test::serial;
use tani::checkout::checkout;
use tani::model::{Actor, AddressPatch, NewAddress, OrderStatus, ProductStatus, Role};
use tani::{addresses, cart, orders};
use tani::{CheckoutRequest, MarketError, MemoryMarketStore};
use uuid::Uuid;

fn new_address(detail: &str) -> NewAddress {
  NewAddress {
    detail: detail.to_string(),
    province: "Jawa Tengah".to_string(),
    city_id: "3301".to_string(),
    district_id: "330101".to_string(),
    village_code: "3301012003".to_string(),
    zip_code: "53211".to_string(),
  }
}

/// Places a one-line order for `buyer` shipped to `address_id`.
async fn place_order(store: &MemoryMarketStore, buyer: Uuid, address_id: Uuid) -> Uuid {
  let product = seed_product(store, ProductStatus::ReadyStock, 10, 1, 3_000);
  cart::add_or_increment(store, buyer, product.id, 2).await.unwrap();
  let request = CheckoutRequest {
    address_id,
    shipping_cost: 1_000,
    payment_method: "cod".to_string(),
    total_amount: 7_000,
  };
  checkout(store, buyer, &request).await.unwrap().order_id()
}

#[tokio::test]
#[serial]
async fn test_address_crud_is_scoped_to_owner() {
  let store = setup();
  let owner = Uuid::new_v4();
  let stranger = Uuid::new_v4();

  let created = addresses::create_address(&store, owner, &new_address("Jl. Merdeka 1"))
    .await
    .unwrap();
  assert_eq!(addresses::list_addresses(&store, owner).await.unwrap().len(), 1);
  assert!(addresses::list_addresses(&store, stranger).await.unwrap().is_empty());

  let patch = AddressPatch {
    zip_code: Some("53212".into()),
    ..AddressPatch::default()
  };
  let patched = addresses::patch_address(&store, owner, created.id, &patch).await.unwrap();
  assert_eq!(patched.zip_code, "53212");
  assert_eq!(patched.detail, "Jl. Merdeka 1");

  let replaced = addresses::replace_address(&store, owner, created.id, &new_address("Jl. Pemuda 9"))
    .await
    .unwrap();
  assert_eq!(replaced.detail, "Jl. Pemuda 9");
  assert_eq!(replaced.zip_code, "53211");

  let err = addresses::patch_address(&store, stranger, created.id, &patch).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));
  let err = addresses::delete_address(&store, stranger, created.id).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));

  addresses::delete_address(&store, owner, created.id).await.unwrap();
  assert!(addresses::list_addresses(&store, owner).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_address_validation() {
  let store = setup();
  let owner = Uuid::new_v4();

  let err = addresses::create_address(&store, owner, &new_address("  ")).await.unwrap_err();
  assert!(matches!(err, MarketError::Validation(_)));

  let created = addresses::create_address(&store, owner, &new_address("Jl. Kenanga"))
    .await
    .unwrap();
  let err = addresses::patch_address(&store, owner, created.id, &AddressPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, MarketError::Validation(_)));
}

#[tokio::test]
#[serial]
async fn test_address_used_by_an_order_is_frozen() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let address = addresses::create_address(&store, buyer, &new_address("Jl. Melati 3"))
    .await
    .unwrap();
  place_order(&store, buyer, address.id).await;

  let patch = AddressPatch {
    detail: Some("Jl. Mawar 4".into()),
    ..AddressPatch::default()
  };
  let err = addresses::patch_address(&store, buyer, address.id, &patch).await.unwrap_err();
  assert!(matches!(err, MarketError::Conflict(_)));
  let err = addresses::delete_address(&store, buyer, address.id).await.unwrap_err();
  assert!(matches!(err, MarketError::Conflict(_)));
}

#[tokio::test]
#[serial]
async fn test_order_detail_carries_address_and_lines() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let address = seed_address(&store, buyer);
  let first = place_order(&store, buyer, address.id).await;
  let second = place_order(&store, buyer, address.id).await;

  let listed = orders::list_orders(&store, buyer).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert!(listed.iter().any(|d| d.order.id == first));
  assert!(listed.iter().any(|d| d.order.id == second));

  let detail = orders::get_order(&store, buyer, first).await.unwrap();
  assert_eq!(detail.address.id, address.id);
  assert_eq!(detail.lines.len(), 1);
  assert_eq!(detail.lines[0].quantity, 2);
  assert_eq!(detail.lines[0].price_at_order, 3_000);
  assert!(detail.lines[0].product_name.starts_with("Gabah"));

  let err = orders::get_order(&store, Uuid::new_v4(), first).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn test_cancellation_only_from_pending() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let address = seed_address(&store, buyer);
  let order_id = place_order(&store, buyer, address.id).await;

  let cancelled = orders::cancel_order(&store, buyer, order_id).await.unwrap();
  assert_eq!(cancelled.status, OrderStatus::Cancelled);
  assert_eq!(store.orders().len(), 1, "cancellation keeps the row");

  let err = orders::cancel_order(&store, buyer, order_id).await.unwrap_err();
  assert!(matches!(err, MarketError::Conflict(_)));

  let other = place_order(&store, buyer, address.id).await;
  let admin = Actor::new(Uuid::new_v4(), Role::Admin);
  orders::advance_order(&store, admin, other, OrderStatus::Paid).await.unwrap();
  let err = orders::cancel_order(&store, buyer, other).await.unwrap_err();
  assert!(matches!(err, MarketError::Conflict(_)));
}

#[tokio::test]
#[serial]
async fn test_fulfilment_moves_forward_for_admins_only() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let address = seed_address(&store, buyer);
  let order_id = place_order(&store, buyer, address.id).await;
  let admin = Actor::new(Uuid::new_v4(), Role::Admin);

  let err = orders::advance_order(&store, Actor::new(buyer, Role::Buyer), order_id, OrderStatus::Paid)
    .await
    .unwrap_err();
  assert!(matches!(err, MarketError::Forbidden(_)));

  let paid = orders::advance_order(&store, admin, order_id, OrderStatus::Paid).await.unwrap();
  assert_eq!(paid.status, OrderStatus::Paid);
  let shipped = orders::advance_order(&store, admin, order_id, OrderStatus::Shipped).await.unwrap();
  assert_eq!(shipped.status, OrderStatus::Shipped);

  let err = orders::advance_order(&store, admin, order_id, OrderStatus::Paid).await.unwrap_err();
  assert!(matches!(err, MarketError::Conflict(_)));

  let err = orders::advance_order(&store, admin, Uuid::new_v4(), OrderStatus::Paid).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));
}
