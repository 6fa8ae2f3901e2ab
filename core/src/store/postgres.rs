// core/src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::migrate::Migrator;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{CheckoutLine, CheckoutTx, MarketStore};
use crate::error::{MarketError, MarketResult};
use crate::model::{
  Address, AddressPatch, CartLine, CartLineRef, CartLineView, CartProduct, NewAddress, NewOrder, NewProduct, Order,
  OrderLine, OrderLineView, OrderStatus, Product, ProductPatch, ProductQuery, ProductStatus,
};

/// Schema migrations under `core/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

macro_rules! product_columns {
  () => {
    "id, seller_id, name, description, price, unit, stock, min_order, weight, origin_village_code, \
     image_path, category, harvest_date, status, created_at, updated_at"
  };
}

macro_rules! cart_columns {
  () => {
    "id, user_id, product_id, quantity, created_at, updated_at"
  };
}

macro_rules! address_columns {
  () => {
    "id, user_id, detail, province, city_id, district_id, village_code, zip_code, created_at, updated_at"
  };
}

macro_rules! order_columns {
  () => {
    "id, user_id, address_id, status, payment_method, total_product_price, shipping_cost, grand_total, \
     created_at, updated_at"
  };
}

// --- Row types, mapped into domain entities below ---

#[derive(FromRow)]
struct ProductRow {
  id: Uuid,
  seller_id: Uuid,
  name: String,
  description: Option<String>,
  price: i64,
  unit: String,
  stock: i32,
  min_order: i32,
  weight: i32,
  origin_village_code: Option<String>,
  image_path: Option<String>,
  category: Option<String>,
  harvest_date: Option<NaiveDate>,
  status: ProductStatus,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      seller_id: row.seller_id,
      name: row.name,
      description: row.description,
      price: row.price,
      unit: row.unit,
      stock: row.stock,
      min_order: row.min_order,
      weight: row.weight,
      origin_village_code: row.origin_village_code,
      image_path: row.image_path,
      category: row.category,
      harvest_date: row.harvest_date,
      status: row.status,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(FromRow)]
struct CartRow {
  id: Uuid,
  user_id: Uuid,
  product_id: Uuid,
  quantity: i32,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<CartRow> for CartLine {
  fn from(row: CartRow) -> Self {
    CartLine {
      id: row.id,
      user_id: row.user_id,
      product_id: row.product_id,
      quantity: row.quantity,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(FromRow)]
struct CartViewRow {
  cart_id: Uuid,
  user_id: Uuid,
  product_id: Uuid,
  quantity: i32,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  product_name: String,
  product_price: i64,
  product_image: Option<String>,
  product_unit: String,
  product_stock: i32,
  product_min_order: i32,
  product_status: ProductStatus,
  product_weight: i32,
  product_origin_village_code: Option<String>,
}

impl From<CartViewRow> for CartLineView {
  fn from(row: CartViewRow) -> Self {
    CartLineView {
      id: row.cart_id,
      user_id: row.user_id,
      product_id: row.product_id,
      quantity: row.quantity,
      created_at: row.created_at,
      updated_at: row.updated_at,
      product: CartProduct {
        id: row.product_id,
        name: row.product_name,
        price: row.product_price,
        image: row.product_image,
        unit: row.product_unit,
        stock: row.product_stock,
        min_order: row.product_min_order,
        status: row.product_status,
        weight: row.product_weight,
        origin_village_code: row.product_origin_village_code,
      },
    }
  }
}

#[derive(FromRow)]
struct AddressRow {
  id: Uuid,
  user_id: Uuid,
  detail: String,
  province: String,
  city_id: String,
  district_id: String,
  village_code: String,
  zip_code: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
  fn from(row: AddressRow) -> Self {
    Address {
      id: row.id,
      user_id: row.user_id,
      detail: row.detail,
      province: row.province,
      city_id: row.city_id,
      district_id: row.district_id,
      village_code: row.village_code,
      zip_code: row.zip_code,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  address_id: Uuid,
  status: OrderStatus,
  payment_method: String,
  total_product_price: i64,
  shipping_cost: i64,
  grand_total: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
  fn from(row: OrderRow) -> Self {
    Order {
      id: row.id,
      user_id: row.user_id,
      address_id: row.address_id,
      status: row.status,
      payment_method: row.payment_method,
      total_product_price: row.total_product_price,
      shipping_cost: row.shipping_cost,
      grand_total: row.grand_total,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(FromRow)]
struct OrderLineRow {
  id: Uuid,
  order_id: Uuid,
  product_id: Uuid,
  quantity: i32,
  price_at_order: i64,
  created_at: DateTime<Utc>,
}

impl From<OrderLineRow> for OrderLine {
  fn from(row: OrderLineRow) -> Self {
    OrderLine {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      quantity: row.quantity,
      price_at_order: row.price_at_order,
      created_at: row.created_at,
    }
  }
}

#[derive(FromRow)]
struct OrderLineViewRow {
  id: Uuid,
  order_id: Uuid,
  product_id: Uuid,
  product_name: String,
  product_image: Option<String>,
  quantity: i32,
  price_at_order: i64,
}

impl From<OrderLineViewRow> for OrderLineView {
  fn from(row: OrderLineViewRow) -> Self {
    OrderLineView {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      product_name: row.product_name,
      product_image: row.product_image,
      quantity: row.quantity,
      price_at_order: row.price_at_order,
    }
  }
}

#[derive(FromRow)]
struct CheckoutRow {
  line_id: Uuid,
  product_id: Uuid,
  quantity: i32,
  price: i64,
  stock: i32,
  min_order: i32,
  status: ProductStatus,
}

impl From<CheckoutRow> for CheckoutLine {
  fn from(row: CheckoutRow) -> Self {
    CheckoutLine {
      line_id: row.line_id,
      product_id: row.product_id,
      quantity: row.quantity,
      price: row.price,
      stock: row.stock,
      min_order: row.min_order,
      status: row.status,
    }
  }
}

/// Splits a tri-state patch field into "was it present" and "what value".
fn tri<T: Clone>(field: &Option<Option<T>>) -> (bool, Option<T>) {
  (field.is_some(), field.clone().flatten())
}

#[derive(Clone)]
pub struct PgMarketStore {
  pool: PgPool,
}

impl PgMarketStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl MarketStore for PgMarketStore {
  #[instrument(name = "pg::find_product", skip(self))]
  async fn find_product(&self, product_id: Uuid) -> MarketResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(concat!("SELECT ", product_columns!(), " FROM products WHERE id = $1"))
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Product::from))
  }

  #[instrument(name = "pg::list_products", skip(self))]
  async fn list_products(&self, query: &ProductQuery) -> MarketResult<Vec<Product>> {
    // LIMIT NULL / OFFSET NULL behave as "no limit" / "no offset".
    let rows = sqlx::query_as::<_, ProductRow>(concat!(
      "SELECT ",
      product_columns!(),
      " FROM products WHERE status <> $1 AND ($2::TEXT IS NULL OR category = $2) \
       ORDER BY created_at DESC, id LIMIT $3 OFFSET $4"
    ))
    .bind(ProductStatus::Deleted)
    .bind(query.category.as_deref())
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(&self.pool)
    .await?;
    debug!("Fetched {} products.", rows.len());
    Ok(rows.into_iter().map(Product::from).collect())
  }

  #[instrument(name = "pg::insert_product", skip(self, product), fields(seller_id = %seller_id))]
  async fn insert_product(&self, seller_id: Uuid, product: &NewProduct) -> MarketResult<Product> {
    let row = sqlx::query_as::<_, ProductRow>(concat!(
      "INSERT INTO products (id, seller_id, name, description, price, unit, stock, min_order, weight, \
       origin_village_code, image_path, category, harvest_date, status, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW(), NOW()) RETURNING ",
      product_columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(seller_id)
    .bind(&product.name)
    .bind(product.description.as_deref())
    .bind(product.price)
    .bind(&product.unit)
    .bind(product.stock)
    .bind(product.min_order)
    .bind(product.weight)
    .bind(product.origin_village_code.as_deref())
    .bind(product.image_path.as_deref())
    .bind(product.category.as_deref())
    .bind(product.harvest_date)
    .bind(product.initial_status())
    .fetch_one(&self.pool)
    .await?;
    Ok(row.into())
  }

  #[instrument(name = "pg::update_product", skip(self, patch))]
  async fn update_product(&self, product_id: Uuid, patch: &ProductPatch) -> MarketResult<Option<Product>> {
    let (set_description, description) = tri(&patch.description);
    let (set_origin, origin) = tri(&patch.origin_village_code);
    let (set_image, image) = tri(&patch.image_path);
    let (set_category, category) = tri(&patch.category);
    let (set_harvest, harvest) = tri(&patch.harvest_date);

    let row = sqlx::query_as::<_, ProductRow>(concat!(
      "UPDATE products SET \
         name = COALESCE($2, name), \
         description = CASE WHEN $3 THEN $4 ELSE description END, \
         price = COALESCE($5, price), \
         unit = COALESCE($6, unit), \
         stock = COALESCE($7, stock), \
         min_order = COALESCE($8, min_order), \
         weight = COALESCE($9, weight), \
         origin_village_code = CASE WHEN $10 THEN $11 ELSE origin_village_code END, \
         image_path = CASE WHEN $12 THEN $13 ELSE image_path END, \
         category = CASE WHEN $14 THEN $15 ELSE category END, \
         harvest_date = CASE WHEN $16 THEN $17 ELSE harvest_date END, \
         status = COALESCE($18, status), \
         updated_at = NOW() \
       WHERE id = $1 AND status <> $19 RETURNING ",
      product_columns!()
    ))
    .bind(product_id)
    .bind(patch.name.as_deref())
    .bind(set_description)
    .bind(description)
    .bind(patch.price)
    .bind(patch.unit.as_deref())
    .bind(patch.stock)
    .bind(patch.min_order)
    .bind(patch.weight)
    .bind(set_origin)
    .bind(origin)
    .bind(set_image)
    .bind(image)
    .bind(set_category)
    .bind(category)
    .bind(set_harvest)
    .bind(harvest)
    .bind(patch.status)
    .bind(ProductStatus::Deleted)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(Product::from))
  }

  #[instrument(name = "pg::find_cart_line", skip(self))]
  async fn find_cart_line(&self, user_id: Uuid, line: CartLineRef) -> MarketResult<Option<CartLine>> {
    let query = match line {
      CartLineRef::Product(product_id) => sqlx::query_as::<_, CartRow>(concat!(
        "SELECT ",
        cart_columns!(),
        " FROM cart_items WHERE user_id = $1 AND product_id = $2"
      ))
      .bind(user_id)
      .bind(product_id),
      CartLineRef::Line(line_id) => sqlx::query_as::<_, CartRow>(concat!(
        "SELECT ",
        cart_columns!(),
        " FROM cart_items WHERE user_id = $1 AND id = $2"
      ))
      .bind(user_id)
      .bind(line_id),
    };
    let row = query.fetch_optional(&self.pool).await?;
    Ok(row.map(CartLine::from))
  }

  #[instrument(name = "pg::insert_cart_line", skip(self))]
  async fn insert_cart_line(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> MarketResult<CartLine> {
    let row = sqlx::query_as::<_, CartRow>(concat!(
      "INSERT INTO cart_items (id, user_id, product_id, quantity, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, NOW(), NOW()) \
       ON CONFLICT (user_id, product_id) DO NOTHING RETURNING ",
      cart_columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await?;
    row
      .map(CartLine::from)
      .ok_or_else(|| MarketError::conflict("cart was modified concurrently, please retry"))
  }

  #[instrument(name = "pg::update_cart_quantity", skip(self))]
  async fn update_cart_quantity(&self, user_id: Uuid, line_id: Uuid, quantity: i32) -> MarketResult<Option<CartLine>> {
    let row = sqlx::query_as::<_, CartRow>(concat!(
      "UPDATE cart_items SET quantity = $3, updated_at = NOW() WHERE user_id = $1 AND id = $2 RETURNING ",
      cart_columns!()
    ))
    .bind(user_id)
    .bind(line_id)
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(CartLine::from))
  }

  #[instrument(name = "pg::delete_cart_line", skip(self))]
  async fn delete_cart_line(&self, user_id: Uuid, line: CartLineRef) -> MarketResult<bool> {
    let result = match line {
      CartLineRef::Product(product_id) => {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
          .bind(user_id)
          .bind(product_id)
          .execute(&self.pool)
          .await?
      }
      CartLineRef::Line(line_id) => {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = $2")
          .bind(user_id)
          .bind(line_id)
          .execute(&self.pool)
          .await?
      }
    };
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "pg::cart_view", skip(self))]
  async fn cart_view(&self, user_id: Uuid) -> MarketResult<Vec<CartLineView>> {
    let rows = sqlx::query_as::<_, CartViewRow>(
      "SELECT ci.id AS cart_id, ci.user_id, ci.product_id, ci.quantity, ci.created_at, ci.updated_at, \
         p.name AS product_name, p.price AS product_price, p.image_path AS product_image, \
         p.unit AS product_unit, p.stock AS product_stock, p.min_order AS product_min_order, \
         p.status AS product_status, p.weight AS product_weight, \
         p.origin_village_code AS product_origin_village_code \
       FROM cart_items ci JOIN products p ON p.id = ci.product_id \
       WHERE ci.user_id = $1 ORDER BY ci.created_at, ci.id",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(CartLineView::from).collect())
  }

  #[instrument(name = "pg::list_addresses", skip(self))]
  async fn list_addresses(&self, user_id: Uuid) -> MarketResult<Vec<Address>> {
    let rows = sqlx::query_as::<_, AddressRow>(concat!(
      "SELECT ",
      address_columns!(),
      " FROM addresses WHERE user_id = $1 ORDER BY created_at, id"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Address::from).collect())
  }

  #[instrument(name = "pg::find_address", skip(self))]
  async fn find_address(&self, user_id: Uuid, address_id: Uuid) -> MarketResult<Option<Address>> {
    let row = sqlx::query_as::<_, AddressRow>(concat!(
      "SELECT ",
      address_columns!(),
      " FROM addresses WHERE id = $1 AND user_id = $2"
    ))
    .bind(address_id)
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(Address::from))
  }

  #[instrument(name = "pg::insert_address", skip(self, address))]
  async fn insert_address(&self, user_id: Uuid, address: &NewAddress) -> MarketResult<Address> {
    let row = sqlx::query_as::<_, AddressRow>(concat!(
      "INSERT INTO addresses (id, user_id, detail, province, city_id, district_id, village_code, zip_code, \
       created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) RETURNING ",
      address_columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&address.detail)
    .bind(&address.province)
    .bind(&address.city_id)
    .bind(&address.district_id)
    .bind(&address.village_code)
    .bind(&address.zip_code)
    .fetch_one(&self.pool)
    .await?;
    Ok(row.into())
  }

  #[instrument(name = "pg::update_address", skip(self, patch))]
  async fn update_address(
    &self,
    user_id: Uuid,
    address_id: Uuid,
    patch: &AddressPatch,
  ) -> MarketResult<Option<Address>> {
    let row = sqlx::query_as::<_, AddressRow>(concat!(
      "UPDATE addresses SET \
         detail = COALESCE($3, detail), \
         province = COALESCE($4, province), \
         city_id = COALESCE($5, city_id), \
         district_id = COALESCE($6, district_id), \
         village_code = COALESCE($7, village_code), \
         zip_code = COALESCE($8, zip_code), \
         updated_at = NOW() \
       WHERE id = $1 AND user_id = $2 RETURNING ",
      address_columns!()
    ))
    .bind(address_id)
    .bind(user_id)
    .bind(patch.detail.as_deref())
    .bind(patch.province.as_deref())
    .bind(patch.city_id.as_deref())
    .bind(patch.district_id.as_deref())
    .bind(patch.village_code.as_deref())
    .bind(patch.zip_code.as_deref())
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(Address::from))
  }

  #[instrument(name = "pg::delete_address", skip(self))]
  async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> MarketResult<bool> {
    let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
      .bind(address_id)
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "pg::address_has_orders", skip(self))]
  async fn address_has_orders(&self, address_id: Uuid) -> MarketResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM orders WHERE address_id = $1)")
      .bind(address_id)
      .fetch_one(&self.pool)
      .await?;
    Ok(exists)
  }

  #[instrument(name = "pg::list_orders", skip(self))]
  async fn list_orders(&self, user_id: Uuid) -> MarketResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(concat!(
      "SELECT ",
      order_columns!(),
      " FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Order::from).collect())
  }

  #[instrument(name = "pg::find_order", skip(self))]
  async fn find_order(&self, order_id: Uuid) -> MarketResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(concat!("SELECT ", order_columns!(), " FROM orders WHERE id = $1"))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Order::from))
  }

  #[instrument(name = "pg::order_lines", skip(self))]
  async fn order_lines(&self, order_id: Uuid) -> MarketResult<Vec<OrderLineView>> {
    let rows = sqlx::query_as::<_, OrderLineViewRow>(
      "SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name, p.image_path AS product_image, \
         oi.quantity, oi.price_at_order \
       FROM order_items oi JOIN products p ON p.id = oi.product_id \
       WHERE oi.order_id = $1 ORDER BY oi.created_at, oi.id",
    )
    .bind(order_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(OrderLineView::from).collect())
  }

  #[instrument(name = "pg::transition_order", skip(self))]
  async fn transition_order(&self, order_id: Uuid, from: OrderStatus, to: OrderStatus) -> MarketResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(concat!(
      "UPDATE orders SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING ",
      order_columns!()
    ))
    .bind(order_id)
    .bind(from)
    .bind(to)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(Order::from))
  }

  #[instrument(name = "pg::begin_checkout", skip(self))]
  async fn begin_checkout(&self) -> MarketResult<Box<dyn CheckoutTx>> {
    let tx = self.pool.begin().await?;
    Ok(Box::new(PgCheckoutTx { tx }))
  }
}

/// A checkout unit of work holding one pooled connection inside a transaction.
/// Dropping it without `commit` rolls back.
pub struct PgCheckoutTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutTx for PgCheckoutTx {
  async fn address_belongs_to(&mut self, user_id: Uuid, address_id: Uuid) -> MarketResult<bool> {
    let exists =
      sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM addresses WHERE id = $1 AND user_id = $2)")
        .bind(address_id)
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await?;
    Ok(exists)
  }

  async fn lock_cart(&mut self, user_id: Uuid) -> MarketResult<Vec<CheckoutLine>> {
    // Locks are taken in product id order so concurrent checkouts cannot deadlock.
    let rows = sqlx::query_as::<_, CheckoutRow>(
      "SELECT ci.id AS line_id, ci.product_id, ci.quantity, p.price, p.stock, p.min_order, p.status \
       FROM cart_items ci JOIN products p ON p.id = ci.product_id \
       WHERE ci.user_id = $1 ORDER BY ci.product_id \
       FOR UPDATE OF p, ci",
    )
    .bind(user_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(rows.into_iter().map(CheckoutLine::from).collect())
  }

  async fn insert_order(&mut self, order: &NewOrder) -> MarketResult<Order> {
    let row = sqlx::query_as::<_, OrderRow>(concat!(
      "INSERT INTO orders (id, user_id, address_id, status, payment_method, total_product_price, \
       shipping_cost, grand_total, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) RETURNING ",
      order_columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(order.user_id)
    .bind(order.address_id)
    .bind(OrderStatus::Pending)
    .bind(&order.payment_method)
    .bind(order.total_product_price)
    .bind(order.shipping_cost)
    .bind(order.grand_total)
    .fetch_one(&mut *self.tx)
    .await?;
    Ok(row.into())
  }

  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> MarketResult<bool> {
    let result =
      sqlx::query("UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1 AND stock >= $2")
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *self.tx)
        .await?;
    Ok(result.rows_affected() == 1)
  }

  async fn insert_order_line(&mut self, order_id: Uuid, line: &CheckoutLine) -> MarketResult<OrderLine> {
    let row = sqlx::query_as::<_, OrderLineRow>(
      "INSERT INTO order_items (id, order_id, product_id, quantity, price_at_order, created_at) \
       VALUES ($1, $2, $3, $4, $5, NOW()) \
       RETURNING id, order_id, product_id, quantity, price_at_order, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(line.product_id)
    .bind(line.quantity)
    .bind(line.price)
    .fetch_one(&mut *self.tx)
    .await?;
    Ok(row.into())
  }

  async fn clear_cart(&mut self, user_id: Uuid) -> MarketResult<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(user_id)
      .execute(&mut *self.tx)
      .await?;
    Ok(result.rows_affected())
  }

  async fn commit(self: Box<Self>) -> MarketResult<()> {
    self.tx.commit().await?;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> MarketResult<()> {
    self.tx.rollback().await?;
    Ok(())
  }
}
