// app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tani::model::OrderStatus;
use tani::orders;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct OrderStatusPayload {
  pub status: OrderStatus,
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = orders::list_orders(app_state.store(), auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(
    name = "handler::get_order",
    skip(app_state, path, auth_user),
    fields(user_id = %auth_user.user_id, order_id = %path.as_ref())
)]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = orders::get_order(app_state.store(), auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

#[instrument(
    name = "handler::cancel_order",
    skip(app_state, path, auth_user),
    fields(user_id = %auth_user.user_id, order_id = %path.as_ref())
)]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = orders::cancel_order(app_state.store(), auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Order cancelled.",
      "order": order
  })))
}

#[instrument(
    name = "handler::advance_order",
    skip(app_state, path, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, order_id = %path.as_ref(), status = %req_payload.status)
)]
pub async fn advance_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<OrderStatusPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = orders::advance_order(app_state.store(), auth_user.actor(), path.into_inner(), req_payload.status).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}
