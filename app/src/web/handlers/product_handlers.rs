// app/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tani::catalog;
use tani::model::{NewProduct, ProductPatch, ProductQuery};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ProductQuery>,
) -> Result<HttpResponse, AppError> {
  let products = catalog::list_products(app_state.store(), &query_params).await?;
  info!("Successfully fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = catalog::get_product(app_state.store(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[instrument(name = "handler::create_product", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewProduct>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product = catalog::create_product(app_state.store(), auth_user.actor(), &req_payload).await?;
  Ok(HttpResponse::Created().json(json!({
      "message": "Product created successfully.",
      "product": product
  })))
}

#[instrument(
    name = "handler::update_product",
    skip(app_state, path, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %path.as_ref())
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<ProductPatch>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product = catalog::update_product(app_state.store(), auth_user.actor(), path.into_inner(), &req_payload).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Product updated successfully.",
      "product": product
  })))
}

#[instrument(
    name = "handler::delete_product",
    skip(app_state, path, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %path.as_ref())
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  catalog::delete_product(app_state.store(), auth_user.actor(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully." })))
}
