// app/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tani::cart;
use tani::model::{CartChange, CartLineRef};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartQuantityPayload {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartDeltaPayload {
  pub product_id: Uuid,
  pub delta: i32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartProductPayload {
  pub product_id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct LineQuantityPayload {
  pub quantity: i32,
}

fn change_response(change: CartChange) -> HttpResponse {
  match change {
    CartChange::Updated(line) => HttpResponse::Ok().json(json!({
        "message": "Cart updated successfully.",
        "cartItem": line,
        "newQuantity": line.quantity,
    })),
    CartChange::Removed => HttpResponse::Ok().json(json!({
        "message": "Product removed from cart.",
        "cartItem": null,
        "newQuantity": 0,
    })),
  }
}

// --- Handlers ---

#[instrument(name = "handler::list_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let listing = cart::list(app_state.store(), auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(listing))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CartQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let line = cart::add_or_increment(
    app_state.store(),
    auth_user.user_id,
    req_payload.product_id,
    req_payload.quantity,
  )
  .await?;
  info!(
    "Add to cart successful for user: {}. Item ID: {}, New Quantity: {}",
    auth_user.user_id, line.id, line.quantity
  );
  Ok(HttpResponse::Ok().json(json!({
      "message": "Item added to cart successfully.",
      "cartItem": line
  })))
}

#[instrument(
    name = "handler::set_cart_quantity",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn set_cart_quantity_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CartQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let change = cart::set_quantity(
    app_state.store(),
    auth_user.user_id,
    CartLineRef::Product(req_payload.product_id),
    req_payload.quantity,
  )
  .await?;
  Ok(change_response(change))
}

#[instrument(
    name = "handler::apply_cart_delta",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, delta = %req_payload.delta)
)]
pub async fn apply_cart_delta_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CartDeltaPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let change = cart::apply_delta(
    app_state.store(),
    auth_user.user_id,
    req_payload.product_id,
    req_payload.delta,
  )
  .await?;
  Ok(change_response(change))
}

#[instrument(
    name = "handler::remove_from_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id)
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CartProductPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart::remove(
    app_state.store(),
    auth_user.user_id,
    CartLineRef::Product(req_payload.product_id),
  )
  .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Product removed from cart." })))
}

#[instrument(
    name = "handler::set_cart_line_quantity",
    skip(app_state, path, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, line_id = %path.as_ref())
)]
pub async fn set_cart_line_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<LineQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let change = cart::set_quantity(
    app_state.store(),
    auth_user.user_id,
    CartLineRef::Line(path.into_inner()),
    req_payload.quantity,
  )
  .await?;
  Ok(change_response(change))
}

#[instrument(
    name = "handler::remove_cart_line",
    skip(app_state, path, auth_user),
    fields(user_id = %auth_user.user_id, line_id = %path.as_ref())
)]
pub async fn remove_cart_line_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart::remove(app_state.store(), auth_user.user_id, CartLineRef::Line(path.into_inner())).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Product removed from cart." })))
}
