// app/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tani::checkout::checkout;
use tani::CheckoutRequest;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

/// Clients send the chosen courier price either as a number or as its string form.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ShippingOption {
  Amount(i64),
  Text(String),
}

impl ShippingOption {
  fn cost(&self) -> Result<i64, AppError> {
    match self {
      ShippingOption::Amount(amount) => Ok(*amount),
      ShippingOption::Text(text) => text
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("shippingOption '{}' is not a valid amount", text))),
    }
  }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
  pub address_id: Uuid,
  #[serde(alias = "shippingCost")]
  pub shipping_option: ShippingOption,
  pub payment_method: String,
  pub total_amount: i64,
}

impl CheckoutPayload {
  fn into_request(self) -> Result<CheckoutRequest, AppError> {
    Ok(CheckoutRequest {
      address_id: self.address_id,
      shipping_cost: self.shipping_option.cost()?,
      payment_method: self.payment_method,
      total_amount: self.total_amount,
    })
  }
}

#[instrument(
    name = "handler::checkout",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, address_id = %req_payload.address_id)
)]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  info!("Checkout attempt by user: {}", auth_user.user_id);
  let request = req_payload.into_inner().into_request()?;
  let receipt = checkout(app_state.store(), auth_user.user_id, &request).await?;

  Ok(HttpResponse::Created().json(json!({
      "message": "Order placed successfully.",
      "orderId": receipt.order_id(),
      "order": receipt
  })))
}
