// app/src/web/handlers/address_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tani::addresses;
use tani::model::{AddressPatch, NewAddress};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_addresses", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_addresses_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let addresses = addresses::list_addresses(app_state.store(), auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "addresses": addresses })))
}

#[instrument(name = "handler::create_address", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_address_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewAddress>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let address = addresses::create_address(app_state.store(), auth_user.user_id, &req_payload).await?;
  Ok(HttpResponse::Created().json(json!({
      "message": "Address created successfully.",
      "address": address
  })))
}

#[instrument(
    name = "handler::replace_address",
    skip(app_state, path, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, address_id = %path.as_ref())
)]
pub async fn replace_address_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<NewAddress>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let address =
    addresses::replace_address(app_state.store(), auth_user.user_id, path.into_inner(), &req_payload).await?;
  Ok(HttpResponse::Ok().json(json!({ "address": address })))
}

#[instrument(
    name = "handler::patch_address",
    skip(app_state, path, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, address_id = %path.as_ref())
)]
pub async fn patch_address_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<AddressPatch>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let address = addresses::patch_address(app_state.store(), auth_user.user_id, path.into_inner(), &req_payload).await?;
  Ok(HttpResponse::Ok().json(json!({ "address": address })))
}

#[instrument(
    name = "handler::delete_address",
    skip(app_state, path, auth_user),
    fields(user_id = %auth_user.user_id, address_id = %path.as_ref())
)]
pub async fn delete_address_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  addresses::delete_address(app_state.store(), auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Address deleted successfully." })))
}
