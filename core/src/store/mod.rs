// core/src/store/mod.rs

//! The storage seam. Services depend on [`MarketStore`] only; each implementation
//! maps its raw rows into the typed entities of [`crate::model`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::availability::StockPosition;
use crate::error::MarketResult;
use crate::model::{
  Address, AddressPatch, CartLine, CartLineRef, CartLineView, NewAddress, NewOrder, NewProduct, Order, OrderLine,
  OrderLineView, OrderStatus, Product, ProductPatch, ProductQuery, ProductStatus,
};

#[async_trait]
pub trait MarketStore: Send + Sync {
  // --- catalog ---

  /// Looks a product up regardless of status, `deleted` included.
  async fn find_product(&self, product_id: Uuid) -> MarketResult<Option<Product>>;

  /// Non-deleted products, newest first.
  async fn list_products(&self, query: &ProductQuery) -> MarketResult<Vec<Product>>;

  async fn insert_product(&self, seller_id: Uuid, product: &NewProduct) -> MarketResult<Product>;

  /// Applies `patch` to a non-deleted product. `None` when there is no such product.
  async fn update_product(&self, product_id: Uuid, patch: &ProductPatch) -> MarketResult<Option<Product>>;

  // --- cart ---

  async fn find_cart_line(&self, user_id: Uuid, line: CartLineRef) -> MarketResult<Option<CartLine>>;

  /// Inserts a new line. Fails with a conflict if the (user, product) pair already exists.
  async fn insert_cart_line(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> MarketResult<CartLine>;

  async fn update_cart_quantity(&self, user_id: Uuid, line_id: Uuid, quantity: i32) -> MarketResult<Option<CartLine>>;

  /// Returns whether a line was deleted.
  async fn delete_cart_line(&self, user_id: Uuid, line: CartLineRef) -> MarketResult<bool>;

  /// Every line of the user joined with the product as it is now.
  async fn cart_view(&self, user_id: Uuid) -> MarketResult<Vec<CartLineView>>;

  // --- addresses ---

  async fn list_addresses(&self, user_id: Uuid) -> MarketResult<Vec<Address>>;

  async fn find_address(&self, user_id: Uuid, address_id: Uuid) -> MarketResult<Option<Address>>;

  async fn insert_address(&self, user_id: Uuid, address: &NewAddress) -> MarketResult<Address>;

  async fn update_address(&self, user_id: Uuid, address_id: Uuid, patch: &AddressPatch)
    -> MarketResult<Option<Address>>;

  async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> MarketResult<bool>;

  async fn address_has_orders(&self, address_id: Uuid) -> MarketResult<bool>;

  // --- orders ---

  /// Orders of a user, newest first.
  async fn list_orders(&self, user_id: Uuid) -> MarketResult<Vec<Order>>;

  async fn find_order(&self, order_id: Uuid) -> MarketResult<Option<Order>>;

  async fn order_lines(&self, order_id: Uuid) -> MarketResult<Vec<OrderLineView>>;

  /// Moves an order from `from` to `to` only if it is still in `from`.
  async fn transition_order(&self, order_id: Uuid, from: OrderStatus, to: OrderStatus)
    -> MarketResult<Option<Order>>;

  // --- checkout ---

  /// Opens the unit of work checkout runs in. The returned handle owns its
  /// connection until it is committed, rolled back, or dropped (which rolls back).
  async fn begin_checkout(&self) -> MarketResult<Box<dyn CheckoutTx>>;
}

/// A cart line as read under the checkout transaction, with its product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
  pub line_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price: i64,
  pub stock: i32,
  pub min_order: i32,
  pub status: ProductStatus,
}

impl CheckoutLine {
  pub fn position(&self) -> StockPosition {
    StockPosition {
      status: self.status,
      stock: self.stock,
      min_order: self.min_order,
    }
  }
}

#[async_trait]
pub trait CheckoutTx: Send {
  async fn address_belongs_to(&mut self, user_id: Uuid, address_id: Uuid) -> MarketResult<bool>;

  /// Reads the user's cart joined with its products, locking the product rows
  /// until the transaction ends.
  async fn lock_cart(&mut self, user_id: Uuid) -> MarketResult<Vec<CheckoutLine>>;

  async fn insert_order(&mut self, order: &NewOrder) -> MarketResult<Order>;

  /// Decrements stock only if at least `quantity` remains. Returns whether it did.
  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> MarketResult<bool>;

  async fn insert_order_line(&mut self, order_id: Uuid, line: &CheckoutLine) -> MarketResult<OrderLine>;

  /// Deletes every cart line of the user, returning how many went.
  async fn clear_cart(&mut self, user_id: Uuid) -> MarketResult<u64>;

  async fn commit(self: Box<Self>) -> MarketResult<()>;

  async fn rollback(self: Box<Self>) -> MarketResult<()>;
}
