// tests/cart_tests.rs
mod common;
use common::*;
use serial_test::serial;
use tani::cart;
use tani::model::{CartChange, CartLineRef, ProductStatus};
use tani::{MarketError, Rejection};
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_cumulative_add_respects_stock_and_minimum() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&store, ProductStatus::ReadyStock, 5, 2, 1000);

  let line = cart::add_or_increment(&store, buyer, p1.id, 3).await.unwrap();
  assert_eq!(line.quantity, 3);

  let err = cart::add_or_increment(&store, buyer, p1.id, 3).await.unwrap_err();
  match &err {
    MarketError::Rejected { product_id, reason } => {
      assert_eq!(*product_id, p1.id);
      assert_eq!(*reason, Rejection::InsufficientStock { available: 5 });
    }
    other => panic!("Expected a stock rejection, got {:?}", other),
  }
  assert_eq!(err.to_string(), "insufficient stock, available: 5");
  assert_eq!(store.cart_lines(buyer)[0].quantity, 3, "rejected add must not touch the line");

  let err = cart::set_quantity(&store, buyer, CartLineRef::Product(p1.id), 1)
    .await
    .unwrap_err();
  assert_eq!(err.to_string(), "quantity must be at least 2");

  let change = cart::set_quantity(&store, buyer, CartLineRef::Product(p1.id), 0)
    .await
    .unwrap();
  assert_eq!(change, CartChange::Removed);
  assert!(store.cart_lines(buyer).is_empty());
}

#[tokio::test]
#[serial]
async fn test_pre_order_ignores_stock_but_enforces_minimum() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let rice = seed_product(&store, ProductStatus::PreOrder, 0, 10, 12_000);

  let err = cart::add_or_increment(&store, buyer, rice.id, 9).await.unwrap_err();
  assert_eq!(err.to_string(), "quantity must be at least 10 for pre-order");

  let line = cart::add_or_increment(&store, buyer, rice.id, 50).await.unwrap();
  assert_eq!(line.quantity, 50);
}

#[tokio::test]
#[serial]
async fn test_pre_order_increment_must_meet_minimum_on_its_own() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let durian = seed_product(&store, ProductStatus::PreOrder, 0, 5, 80_000);

  let line = cart::add_or_increment(&store, buyer, durian.id, 5).await.unwrap();
  assert_eq!(line.quantity, 5);

  let err = cart::add_or_increment(&store, buyer, durian.id, 1).await.unwrap_err();
  match &err {
    MarketError::Rejected { product_id, reason } => {
      assert_eq!(*product_id, durian.id);
      assert_eq!(*reason, Rejection::BelowPreOrderMinimum { min_order: 5 });
    }
    other => panic!("Expected a pre-order minimum rejection, got {:?}", other),
  }
  assert_eq!(err.to_string(), "quantity must be at least 5 for pre-order");
  assert_eq!(store.cart_lines(buyer)[0].quantity, 5);

  let line = cart::add_or_increment(&store, buyer, durian.id, 5).await.unwrap();
  assert_eq!(line.quantity, 10);
}

#[tokio::test]
#[serial]
async fn test_unavailable_products_are_refused() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let sold_out = seed_product(&store, ProductStatus::SoldOut, 10, 1, 1000);
  let inactive = seed_product(&store, ProductStatus::Inactive, 10, 1, 1000);
  let deleted = seed_product(&store, ProductStatus::Deleted, 10, 1, 1000);

  let err = cart::add_or_increment(&store, buyer, sold_out.id, 1).await.unwrap_err();
  assert_eq!(err.to_string(), "product is sold out");

  let err = cart::add_or_increment(&store, buyer, inactive.id, 1).await.unwrap_err();
  assert_eq!(err.to_string(), "product is currently unavailable");

  let err = cart::add_or_increment(&store, buyer, deleted.id, 1).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(ref m) if m == "product not found or deleted"));

  let err = cart::add_or_increment(&store, buyer, Uuid::new_v4(), 1).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));

  assert!(store.cart_lines(buyer).is_empty());
}

#[tokio::test]
#[serial]
async fn test_add_requires_positive_quantity() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let corn = seed_product(&store, ProductStatus::ReadyStock, 10, 1, 1000);

  for quantity in [0, -3] {
    let err = cart::add_or_increment(&store, buyer, corn.id, quantity).await.unwrap_err();
    assert!(matches!(err, MarketError::Validation(_)), "quantity {quantity}");
  }
}

#[tokio::test]
#[serial]
async fn test_set_quantity_uses_absolute_value_and_line_ids() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let chili = seed_product(&store, ProductStatus::ReadyStock, 5, 1, 30_000);
  let line = cart::add_or_increment(&store, buyer, chili.id, 4).await.unwrap();

  // Absolute, not cumulative: 5 fits although 4 + 5 would not.
  let change = cart::set_quantity(&store, buyer, CartLineRef::Line(line.id), 5).await.unwrap();
  assert_eq!(change.quantity(), 5);

  let err = cart::set_quantity(&store, buyer, CartLineRef::Line(line.id), 6).await.unwrap_err();
  assert_eq!(err.to_string(), "insufficient stock, available: 5");

  let err = cart::set_quantity(&store, buyer, CartLineRef::Line(line.id), -1).await.unwrap_err();
  assert!(matches!(err, MarketError::Validation(_)));
}

#[tokio::test]
#[serial]
async fn test_set_and_remove_on_missing_line_report_not_in_cart() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let onion = seed_product(&store, ProductStatus::ReadyStock, 5, 1, 8_000);

  for quantity in [0, 2] {
    let err = cart::set_quantity(&store, buyer, CartLineRef::Product(onion.id), quantity)
      .await
      .unwrap_err();
    assert!(matches!(err, MarketError::NotFound(ref m) if m == "product not found in cart"));
  }

  let err = cart::remove(&store, buyer, CartLineRef::Product(onion.id)).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn test_lines_of_other_users_are_invisible() {
  let store = setup();
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();
  let melon = seed_product(&store, ProductStatus::ReadyStock, 5, 1, 20_000);
  let line = cart::add_or_increment(&store, alice, melon.id, 1).await.unwrap();

  let err = cart::remove(&store, bob, CartLineRef::Line(line.id)).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));
  assert_eq!(store.cart_lines(alice).len(), 1);
}

#[tokio::test]
#[serial]
async fn test_delta_removes_line_instead_of_reaching_zero() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let garlic = seed_product(&store, ProductStatus::ReadyStock, 10, 1, 5_000);
  cart::add_or_increment(&store, buyer, garlic.id, 3).await.unwrap();

  let change = cart::apply_delta(&store, buyer, garlic.id, -1).await.unwrap();
  assert_eq!(change.quantity(), 2);

  let change = cart::apply_delta(&store, buyer, garlic.id, -10).await.unwrap();
  assert_eq!(change, CartChange::Removed);
  assert!(store.cart_lines(buyer).is_empty());

  let err = cart::apply_delta(&store, buyer, garlic.id, 1).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn test_delta_is_associative() {
  let store = setup();
  let stepwise = Uuid::new_v4();
  let at_once = Uuid::new_v4();
  let potato = seed_product(&store, ProductStatus::ReadyStock, 20, 2, 9_000);
  cart::add_or_increment(&store, stepwise, potato.id, 2).await.unwrap();
  cart::add_or_increment(&store, at_once, potato.id, 2).await.unwrap();

  for delta in [3, -1, 4, 2] {
    cart::apply_delta(&store, stepwise, potato.id, delta).await.unwrap();
  }
  let single = cart::apply_delta(&store, at_once, potato.id, 8).await.unwrap();

  assert_eq!(single.quantity(), 10);
  assert_eq!(store.cart_lines(stepwise)[0].quantity, 10);
}

#[tokio::test]
#[serial]
async fn test_delta_validates_the_resulting_quantity() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let carrot = seed_product(&store, ProductStatus::ReadyStock, 6, 3, 4_000);
  cart::add_or_increment(&store, buyer, carrot.id, 4).await.unwrap();

  let err = cart::apply_delta(&store, buyer, carrot.id, 3).await.unwrap_err();
  assert_eq!(err.to_string(), "insufficient stock, available: 6");

  let err = cart::apply_delta(&store, buyer, carrot.id, -2).await.unwrap_err();
  assert_eq!(err.to_string(), "quantity must be at least 3");
  assert_eq!(store.cart_lines(buyer)[0].quantity, 4);
}

#[tokio::test]
#[serial]
async fn test_delta_drops_line_of_deleted_product() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let cabbage = seed_product(&store, ProductStatus::ReadyStock, 6, 1, 4_000);
  cart::add_or_increment(&store, buyer, cabbage.id, 2).await.unwrap();
  set_status(&store, cabbage.id, ProductStatus::Deleted);

  let err = cart::apply_delta(&store, buyer, cabbage.id, 1).await.unwrap_err();
  assert!(matches!(err, MarketError::NotFound(ref m) if m == "product is no longer available"));
  assert!(store.cart_lines(buyer).is_empty(), "stale line must be removed");
}

#[tokio::test]
#[serial]
async fn test_list_reports_current_products_and_total_weight() {
  let store = setup();
  let buyer = Uuid::new_v4();
  let beans = seed_product(&store, ProductStatus::ReadyStock, 10, 1, 7_000);
  let peas = seed_product(&store, ProductStatus::ReadyStock, 10, 1, 6_000);
  cart::add_or_increment(&store, buyer, beans.id, 2).await.unwrap();
  cart::add_or_increment(&store, buyer, peas.id, 3).await.unwrap();
  set_status(&store, peas.id, ProductStatus::SoldOut);

  let listing = cart::list(&store, buyer).await.unwrap();
  assert_eq!(listing.lines.len(), 2);
  assert_eq!(listing.total_weight, i64::from(5 * UNIT_WEIGHT));

  let peas_line = listing.lines.iter().find(|l| l.product_id == peas.id).unwrap();
  assert_eq!(peas_line.product.status, ProductStatus::SoldOut);
  assert_eq!(peas_line.product.price, 6_000);

  let empty = cart::list(&store, Uuid::new_v4()).await.unwrap();
  assert!(empty.lines.is_empty());
  assert_eq!(empty.total_weight, 0);
}
