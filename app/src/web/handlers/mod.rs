// app/src/web/handlers/mod.rs

pub mod address_handlers;
pub mod cart_handlers;
pub mod checkout_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod shipping_handlers;
