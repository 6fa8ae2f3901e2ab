// src/lib.rs

//! Tani: the domain core of a small agricultural marketplace.
//!
//! The crate owns the rules that protect stock and orders:
//!  - A pure availability evaluator shared by every cart write path.
//!  - Cart line operations (add, set, relative delta, remove, listing).
//!  - An all-or-nothing checkout that turns a cart into an order.
//!  - Catalog, address and order services built on the same storage seam.
//!
//! Storage is reached through [`MarketStore`]. [`PgMarketStore`] talks to PostgreSQL
//! through sqlx; [`MemoryMarketStore`] keeps everything in process and is what the
//! test-suite runs against.

pub mod addresses;
pub mod availability;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod model;
pub mod orders;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::availability::{evaluate, Decision, Rejection, StockPosition};
pub use crate::checkout::{CheckoutReceipt, CheckoutRequest};
pub use crate::error::{MarketError, MarketResult};
#[cfg(feature = "testing")]
pub use crate::store::memory::Fault;
pub use crate::store::memory::MemoryMarketStore;
pub use crate::store::postgres::{PgMarketStore, MIGRATOR};
pub use crate::store::{CheckoutLine, CheckoutTx, MarketStore};
