// app/src/web/handlers/shipping_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::shipping::RateRequest;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::estimate_shipping", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn estimate_shipping_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RateRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  req_payload.validate()?;
  let quotes = app_state.shipping.quote(&req_payload).await?;
  info!("Returning {} shipping options.", quotes.len());
  Ok(HttpResponse::Ok().json(json!({ "options": quotes })))
}
