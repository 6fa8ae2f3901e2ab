// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use chrono::Utc;
use once_cell::sync::Lazy;
use tani::model::{Address, Product, ProductStatus};
use tani::MemoryMarketStore;
use tracing::Level;
use uuid::Uuid;

// --- Helper for Tracing Setup ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// A fresh, empty store with tracing wired to the test writer.
pub fn setup() -> MemoryMarketStore {
  setup_tracing();
  MemoryMarketStore::new()
}

// --- Fixtures ---

pub const UNIT_WEIGHT: i32 = 250;

pub fn product(status: ProductStatus, stock: i32, min_order: i32, price: i64) -> Product {
  let now = Utc::now();
  Product {
    id: Uuid::new_v4(),
    seller_id: Uuid::new_v4(),
    name: format!("Gabah {}", &Uuid::new_v4().simple().to_string()[..6]),
    description: None,
    price,
    unit: "kg".to_string(),
    stock,
    min_order,
    weight: UNIT_WEIGHT,
    origin_village_code: Some("3201012001".to_string()),
    image_path: None,
    category: Some("grain".to_string()),
    harvest_date: None,
    status,
    created_at: now,
    updated_at: now,
  }
}

pub fn seed_product(
  store: &MemoryMarketStore,
  status: ProductStatus,
  stock: i32,
  min_order: i32,
  price: i64,
) -> Product {
  let product = product(status, stock, min_order, price);
  store.put_product(product.clone());
  product
}

pub fn seed_address(store: &MemoryMarketStore, user_id: Uuid) -> Address {
  let now = Utc::now();
  let address = Address {
    id: Uuid::new_v4(),
    user_id,
    detail: "Jl. Sawah Indah No. 7".to_string(),
    province: "Jawa Barat".to_string(),
    city_id: "3201".to_string(),
    district_id: "320101".to_string(),
    village_code: "3201011001".to_string(),
    zip_code: "16911".to_string(),
    created_at: now,
    updated_at: now,
  };
  store.put_address(address.clone());
  address
}

/// Overwrites fields of a stored product, the way a seller edit would.
pub fn restock(store: &MemoryMarketStore, product_id: Uuid, stock: i32) {
  if let Some(mut product) = store.product(product_id) {
    product.stock = stock;
    store.put_product(product);
  }
}

pub fn set_status(store: &MemoryMarketStore, product_id: Uuid, status: ProductStatus) {
  if let Some(mut product) = store.product(product_id) {
    product.status = status;
    store.put_product(product);
  }
}
