// core/src/store/memory.rs

//! An in-process [`MarketStore`]. Checkouts are serialized through a gate and
//! their writes are staged until commit, so a failed checkout leaves no trace.

use std::collections::HashMap;
#[cfg(feature = "testing")]
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use super::{CheckoutLine, CheckoutTx, MarketStore};
use crate::error::{MarketError, MarketResult};
use crate::model::{
  Address, AddressPatch, CartLine, CartLineRef, CartLineView, CartProduct, NewAddress, NewOrder, NewProduct, Order,
  OrderLine, OrderLineView, OrderStatus, Product, ProductPatch, ProductQuery, ProductStatus,
};

/// A write that fails once, the next time checkout reaches it.
#[cfg(feature = "testing")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
  OrderInsert,
  OrderLineInsert,
  StockDecrement,
  CartClear,
  Commit,
}

#[derive(Default)]
struct MemoryState {
  products: Vec<Product>,
  cart: Vec<CartLine>,
  addresses: Vec<Address>,
  orders: Vec<Order>,
  order_lines: Vec<OrderLine>,
}

impl MemoryState {
  fn product(&self, product_id: Uuid) -> Option<&Product> {
    self.products.iter().find(|p| p.id == product_id)
  }

  fn product_mut(&mut self, product_id: Uuid) -> Option<&mut Product> {
    self.products.iter_mut().find(|p| p.id == product_id)
  }

  fn cart_position(&self, user_id: Uuid, line: CartLineRef) -> Option<usize> {
    self.cart.iter().position(|l| {
      l.user_id == user_id
        && match line {
          CartLineRef::Product(product_id) => l.product_id == product_id,
          CartLineRef::Line(line_id) => l.id == line_id,
        }
    })
  }
}

fn cart_product(product: &Product) -> CartProduct {
  CartProduct {
    id: product.id,
    name: product.name.clone(),
    price: product.price,
    image: product.image_path.clone(),
    unit: product.unit.clone(),
    stock: product.stock,
    min_order: product.min_order,
    status: product.status,
    weight: product.weight,
    origin_village_code: product.origin_village_code.clone(),
  }
}

#[derive(Clone, Default)]
pub struct MemoryMarketStore {
  state: Arc<Mutex<MemoryState>>,
  checkout_gate: Arc<AsyncMutex<()>>,
  #[cfg(feature = "testing")]
  faults: Arc<Mutex<HashSet<Fault>>>,
}

impl MemoryMarketStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts or replaces a product as given.
  pub fn put_product(&self, product: Product) {
    let mut state = self.state.lock();
    state.products.retain(|p| p.id != product.id);
    state.products.push(product);
  }

  /// Inserts or replaces an address as given.
  pub fn put_address(&self, address: Address) {
    let mut state = self.state.lock();
    state.addresses.retain(|a| a.id != address.id);
    state.addresses.push(address);
  }

  pub fn product(&self, product_id: Uuid) -> Option<Product> {
    self.state.lock().product(product_id).cloned()
  }

  pub fn cart_lines(&self, user_id: Uuid) -> Vec<CartLine> {
    self.state.lock().cart.iter().filter(|l| l.user_id == user_id).cloned().collect()
  }

  pub fn orders(&self) -> Vec<Order> {
    self.state.lock().orders.clone()
  }

  pub fn order_line_rows(&self) -> Vec<OrderLine> {
    self.state.lock().order_lines.clone()
  }

  /// Arms `fault`; the next checkout write of that kind fails with a storage error.
  #[cfg(feature = "testing")]
  pub fn inject(&self, fault: Fault) {
    self.faults.lock().insert(fault);
  }

  #[cfg(feature = "testing")]
  fn trip(&self, fault: Fault) -> MarketResult<()> {
    if self.faults.lock().remove(&fault) {
      tracing::warn!(?fault, "Injected storage fault tripped.");
      return Err(MarketError::Storage(format!("injected fault at {fault:?}")));
    }
    Ok(())
  }
}

#[async_trait]
impl MarketStore for MemoryMarketStore {
  async fn find_product(&self, product_id: Uuid) -> MarketResult<Option<Product>> {
    Ok(self.product(product_id))
  }

  async fn list_products(&self, query: &ProductQuery) -> MarketResult<Vec<Product>> {
    let state = self.state.lock();
    let mut products: Vec<Product> = state
      .products
      .iter()
      .rev()
      .filter(|p| p.status != ProductStatus::Deleted)
      .filter(|p| match &query.category {
        Some(category) => p.category.as_deref() == Some(category.as_str()),
        None => true,
      })
      .cloned()
      .collect();
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let offset = query.offset.unwrap_or(0).max(0) as usize;
    let limit = query.limit.map_or(usize::MAX, |l| l.max(0) as usize);
    Ok(products.into_iter().skip(offset).take(limit).collect())
  }

  async fn insert_product(&self, seller_id: Uuid, product: &NewProduct) -> MarketResult<Product> {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      seller_id,
      name: product.name.clone(),
      description: product.description.clone(),
      price: product.price,
      unit: product.unit.clone(),
      stock: product.stock,
      min_order: product.min_order,
      weight: product.weight,
      origin_village_code: product.origin_village_code.clone(),
      image_path: product.image_path.clone(),
      category: product.category.clone(),
      harvest_date: product.harvest_date,
      status: product.initial_status(),
      created_at: now,
      updated_at: now,
    };
    self.state.lock().products.push(product.clone());
    Ok(product)
  }

  async fn update_product(&self, product_id: Uuid, patch: &ProductPatch) -> MarketResult<Option<Product>> {
    let mut state = self.state.lock();
    let Some(product) = state
      .product_mut(product_id)
      .filter(|p| p.status != ProductStatus::Deleted)
    else {
      return Ok(None);
    };
    patch.apply_to(product);
    product.updated_at = Utc::now();
    Ok(Some(product.clone()))
  }

  async fn find_cart_line(&self, user_id: Uuid, line: CartLineRef) -> MarketResult<Option<CartLine>> {
    let state = self.state.lock();
    Ok(state.cart_position(user_id, line).map(|i| state.cart[i].clone()))
  }

  async fn insert_cart_line(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> MarketResult<CartLine> {
    let mut state = self.state.lock();
    if state.cart_position(user_id, CartLineRef::Product(product_id)).is_some() {
      return Err(MarketError::conflict("cart was modified concurrently, please retry"));
    }
    let now = Utc::now();
    let line = CartLine {
      id: Uuid::new_v4(),
      user_id,
      product_id,
      quantity,
      created_at: now,
      updated_at: now,
    };
    state.cart.push(line.clone());
    Ok(line)
  }

  async fn update_cart_quantity(&self, user_id: Uuid, line_id: Uuid, quantity: i32) -> MarketResult<Option<CartLine>> {
    let mut state = self.state.lock();
    let Some(index) = state.cart_position(user_id, CartLineRef::Line(line_id)) else {
      return Ok(None);
    };
    let line = &mut state.cart[index];
    line.quantity = quantity;
    line.updated_at = Utc::now();
    Ok(Some(line.clone()))
  }

  async fn delete_cart_line(&self, user_id: Uuid, line: CartLineRef) -> MarketResult<bool> {
    let mut state = self.state.lock();
    match state.cart_position(user_id, line) {
      Some(index) => {
        state.cart.remove(index);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn cart_view(&self, user_id: Uuid) -> MarketResult<Vec<CartLineView>> {
    let state = self.state.lock();
    let lines = state
      .cart
      .iter()
      .filter(|l| l.user_id == user_id)
      .filter_map(|l| {
        state.product(l.product_id).map(|p| CartLineView {
          id: l.id,
          user_id: l.user_id,
          product_id: l.product_id,
          quantity: l.quantity,
          created_at: l.created_at,
          updated_at: l.updated_at,
          product: cart_product(p),
        })
      })
      .collect();
    Ok(lines)
  }

  async fn list_addresses(&self, user_id: Uuid) -> MarketResult<Vec<Address>> {
    let state = self.state.lock();
    Ok(state.addresses.iter().filter(|a| a.user_id == user_id).cloned().collect())
  }

  async fn find_address(&self, user_id: Uuid, address_id: Uuid) -> MarketResult<Option<Address>> {
    let state = self.state.lock();
    Ok(
      state
        .addresses
        .iter()
        .find(|a| a.id == address_id && a.user_id == user_id)
        .cloned(),
    )
  }

  async fn insert_address(&self, user_id: Uuid, address: &NewAddress) -> MarketResult<Address> {
    let now = Utc::now();
    let address = Address {
      id: Uuid::new_v4(),
      user_id,
      detail: address.detail.clone(),
      province: address.province.clone(),
      city_id: address.city_id.clone(),
      district_id: address.district_id.clone(),
      village_code: address.village_code.clone(),
      zip_code: address.zip_code.clone(),
      created_at: now,
      updated_at: now,
    };
    self.state.lock().addresses.push(address.clone());
    Ok(address)
  }

  async fn update_address(
    &self,
    user_id: Uuid,
    address_id: Uuid,
    patch: &AddressPatch,
  ) -> MarketResult<Option<Address>> {
    let mut state = self.state.lock();
    let Some(address) = state
      .addresses
      .iter_mut()
      .find(|a| a.id == address_id && a.user_id == user_id)
    else {
      return Ok(None);
    };
    patch.apply_to(address);
    address.updated_at = Utc::now();
    Ok(Some(address.clone()))
  }

  async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> MarketResult<bool> {
    let mut state = self.state.lock();
    let before = state.addresses.len();
    state.addresses.retain(|a| !(a.id == address_id && a.user_id == user_id));
    Ok(state.addresses.len() < before)
  }

  async fn address_has_orders(&self, address_id: Uuid) -> MarketResult<bool> {
    Ok(self.state.lock().orders.iter().any(|o| o.address_id == address_id))
  }

  async fn list_orders(&self, user_id: Uuid) -> MarketResult<Vec<Order>> {
    let state = self.state.lock();
    let mut orders: Vec<Order> = state.orders.iter().rev().filter(|o| o.user_id == user_id).cloned().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }

  async fn find_order(&self, order_id: Uuid) -> MarketResult<Option<Order>> {
    Ok(self.state.lock().orders.iter().find(|o| o.id == order_id).cloned())
  }

  async fn order_lines(&self, order_id: Uuid) -> MarketResult<Vec<OrderLineView>> {
    let state = self.state.lock();
    let lines = state
      .order_lines
      .iter()
      .filter(|l| l.order_id == order_id)
      .map(|l| {
        let product = state.product(l.product_id);
        OrderLineView {
          id: l.id,
          order_id: l.order_id,
          product_id: l.product_id,
          product_name: product.map(|p| p.name.clone()).unwrap_or_default(),
          product_image: product.and_then(|p| p.image_path.clone()),
          quantity: l.quantity,
          price_at_order: l.price_at_order,
        }
      })
      .collect();
    Ok(lines)
  }

  async fn transition_order(&self, order_id: Uuid, from: OrderStatus, to: OrderStatus) -> MarketResult<Option<Order>> {
    let mut state = self.state.lock();
    let Some(order) = state.orders.iter_mut().find(|o| o.id == order_id && o.status == from) else {
      return Ok(None);
    };
    order.status = to;
    order.updated_at = Utc::now();
    Ok(Some(order.clone()))
  }

  async fn begin_checkout(&self) -> MarketResult<Box<dyn CheckoutTx>> {
    let gate = self.checkout_gate.clone().lock_owned().await;
    Ok(Box::new(MemoryCheckoutTx {
      store: self.clone(),
      staged: Vec::new(),
      _gate: gate,
    }))
  }
}

enum Staged {
  Order(Order),
  Line(OrderLine),
  Decrement { product_id: Uuid, quantity: i32 },
  ClearCart(Uuid),
}

/// Holds the checkout gate for its whole life. Writes only reach the shared
/// state in `commit`; dropping the handle discards them.
pub struct MemoryCheckoutTx {
  store: MemoryMarketStore,
  staged: Vec<Staged>,
  _gate: OwnedMutexGuard<()>,
}

impl MemoryCheckoutTx {
  fn staged_decrements(&self, product_id: Uuid) -> i32 {
    self
      .staged
      .iter()
      .map(|s| match s {
        Staged::Decrement { product_id: id, quantity } if *id == product_id => *quantity,
        _ => 0,
      })
      .sum()
  }
}

#[async_trait]
impl CheckoutTx for MemoryCheckoutTx {
  async fn address_belongs_to(&mut self, user_id: Uuid, address_id: Uuid) -> MarketResult<bool> {
    let state = self.store.state.lock();
    Ok(state.addresses.iter().any(|a| a.id == address_id && a.user_id == user_id))
  }

  async fn lock_cart(&mut self, user_id: Uuid) -> MarketResult<Vec<CheckoutLine>> {
    let state = self.store.state.lock();
    let mut lines: Vec<CheckoutLine> = state
      .cart
      .iter()
      .filter(|l| l.user_id == user_id)
      .filter_map(|l| {
        state.product(l.product_id).map(|p| CheckoutLine {
          line_id: l.id,
          product_id: p.id,
          quantity: l.quantity,
          price: p.price,
          stock: p.stock,
          min_order: p.min_order,
          status: p.status,
        })
      })
      .collect();
    lines.sort_by_key(|l| l.product_id);
    Ok(lines)
  }

  async fn insert_order(&mut self, order: &NewOrder) -> MarketResult<Order> {
    #[cfg(feature = "testing")]
    self.store.trip(Fault::OrderInsert)?;
    let now = Utc::now();
    let order = Order {
      id: Uuid::new_v4(),
      user_id: order.user_id,
      address_id: order.address_id,
      status: OrderStatus::Pending,
      payment_method: order.payment_method.clone(),
      total_product_price: order.total_product_price,
      shipping_cost: order.shipping_cost,
      grand_total: order.grand_total,
      created_at: now,
      updated_at: now,
    };
    self.staged.push(Staged::Order(order.clone()));
    Ok(order)
  }

  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> MarketResult<bool> {
    #[cfg(feature = "testing")]
    self.store.trip(Fault::StockDecrement)?;
    let stock = match self.store.state.lock().product(product_id) {
      Some(product) => product.stock,
      None => return Ok(false),
    };
    if stock - self.staged_decrements(product_id) < quantity {
      return Ok(false);
    }
    self.staged.push(Staged::Decrement { product_id, quantity });
    Ok(true)
  }

  async fn insert_order_line(&mut self, order_id: Uuid, line: &CheckoutLine) -> MarketResult<OrderLine> {
    #[cfg(feature = "testing")]
    self.store.trip(Fault::OrderLineInsert)?;
    let order_line = OrderLine {
      id: Uuid::new_v4(),
      order_id,
      product_id: line.product_id,
      quantity: line.quantity,
      price_at_order: line.price,
      created_at: Utc::now(),
    };
    self.staged.push(Staged::Line(order_line.clone()));
    Ok(order_line)
  }

  async fn clear_cart(&mut self, user_id: Uuid) -> MarketResult<u64> {
    #[cfg(feature = "testing")]
    self.store.trip(Fault::CartClear)?;
    let count = self.store.state.lock().cart.iter().filter(|l| l.user_id == user_id).count();
    self.staged.push(Staged::ClearCart(user_id));
    Ok(count as u64)
  }

  async fn commit(self: Box<Self>) -> MarketResult<()> {
    #[cfg(feature = "testing")]
    self.store.trip(Fault::Commit)?;
    let this = *self;
    let mut state = this.store.state.lock();

    let mut totals: HashMap<Uuid, i32> = HashMap::new();
    for staged in &this.staged {
      if let Staged::Decrement { product_id, quantity } = staged {
        *totals.entry(*product_id).or_default() += *quantity;
      }
    }
    for (product_id, quantity) in &totals {
      let available = state.product(*product_id).map_or(0, |p| p.stock);
      if available < *quantity {
        return Err(MarketError::InsufficientStock {
          product_id: *product_id,
        });
      }
    }

    let now = Utc::now();
    for staged in this.staged {
      match staged {
        Staged::Order(order) => state.orders.push(order),
        Staged::Line(line) => state.order_lines.push(line),
        Staged::Decrement { product_id, quantity } => {
          if let Some(product) = state.product_mut(product_id) {
            product.stock -= quantity;
            product.updated_at = now;
          }
        }
        Staged::ClearCart(user_id) => state.cart.retain(|l| l.user_id != user_id),
      }
    }
    debug!("Memory checkout committed.");
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> MarketResult<()> {
    debug!(discarded = self.staged.len(), "Memory checkout rolled back.");
    Ok(())
  }
}
