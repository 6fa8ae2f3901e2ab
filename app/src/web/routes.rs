// app/src/web/routes.rs

use actix_web::{error, web, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{
  address_handlers, cart_handlers, checkout_handlers, order_handlers, product_handlers, shipping_handlers,
};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn json_error(err: error::JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid query parameters: {}", err)).into()
}

fn path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid path parameter: {}", err)).into()
}

// Called from `main.rs` and the route tests to mount the whole API.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .app_data(web::JsonConfig::default().error_handler(json_error))
      .app_data(web::QueryConfig::default().error_handler(query_error))
      .app_data(web::PathConfig::default().error_handler(path_error))
      .route("/health", web::get().to(health_check_handler))
      // Catalog: reads are public, writes need a seller or admin token
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::patch().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::list_cart_handler))
          .route("", web::post().to(cart_handlers::add_to_cart_handler))
          .route("", web::put().to(cart_handlers::set_cart_quantity_handler))
          .route("", web::patch().to(cart_handlers::apply_cart_delta_handler))
          .route("", web::delete().to(cart_handlers::remove_from_cart_handler))
          .route("/checkout", web::post().to(checkout_handlers::checkout_handler))
          .route("/items/{line_id}", web::put().to(cart_handlers::set_cart_line_quantity_handler))
          .route("/items/{line_id}", web::delete().to(cart_handlers::remove_cart_line_handler)),
      )
      .service(
        web::scope("/addresses")
          .route("", web::get().to(address_handlers::list_addresses_handler))
          .route("", web::post().to(address_handlers::create_address_handler))
          .route("/{address_id}", web::put().to(address_handlers::replace_address_handler))
          .route("/{address_id}", web::patch().to(address_handlers::patch_address_handler))
          .route("/{address_id}", web::delete().to(address_handlers::delete_address_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}", web::delete().to(order_handlers::cancel_order_handler))
          .route("/{order_id}/status", web::put().to(order_handlers::advance_order_handler)),
      )
      .route("/shipping/estimate", web::post().to(shipping_handlers::estimate_shipping_handler)),
  );
}
