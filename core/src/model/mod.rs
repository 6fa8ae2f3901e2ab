// core/src/model/mod.rs

//! Typed domain entities. Store implementations map their rows into these
//! before anything else in the crate sees them.

pub mod actor;
pub mod address;
pub mod cart;
pub mod order;
pub mod product;

pub use actor::{Actor, Role};
pub use address::{Address, AddressPatch, NewAddress};
pub use cart::{CartChange, CartLine, CartLineRef, CartLineView, CartListing, CartProduct};
pub use order::{NewOrder, Order, OrderDetail, OrderLine, OrderLineView, OrderStatus};
pub use product::{NewProduct, Product, ProductPatch, ProductQuery, ProductStatus};
