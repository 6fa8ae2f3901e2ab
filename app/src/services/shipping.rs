// app/src/services/shipping.rs

//! Courier rate lookups against api.co.id. Quotes only feed the shipping cost a
//! buyer later submits at checkout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::{AppError, Result as AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
  #[serde(alias = "origin_village_code")]
  pub origin_village_code: String,
  #[serde(alias = "destination_village_code")]
  pub destination_village_code: String,
  /// Total parcel weight in grams.
  pub weight: i64,
  #[serde(default)]
  pub courier: Option<String>,
}

impl RateRequest {
  pub fn validate(&self) -> AppResult<()> {
    if self.origin_village_code.trim().is_empty() || self.destination_village_code.trim().is_empty() {
      return Err(AppError::Validation(
        "originVillageCode and destinationVillageCode are required".to_string(),
      ));
    }
    if self.weight <= 0 {
      return Err(AppError::Validation("weight must be greater than 0".to_string()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
  pub service: String,
  pub description: String,
  /// Price in rupiah; submitted back as the checkout shipping cost.
  pub price: i64,
  pub estimated_delivery: String,
}

#[async_trait]
pub trait ShippingRates: Send + Sync {
  async fn quote(&self, request: &RateRequest) -> AppResult<Vec<ShippingQuote>>;
}

pub struct ApiCoIdRates {
  client: Client,
  base_url: String,
  api_key: Option<String>,
}

impl ApiCoIdRates {
  pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> AppResult<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Failed to build shipping HTTP client: {}", e)))?;
    if api_key.is_none() {
      warn!("SHIPPING_API_KEY is not set; courier lookups will likely be refused.");
    }
    Ok(Self {
      client,
      base_url: base_url.into(),
      api_key,
    })
  }
}

#[async_trait]
impl ShippingRates for ApiCoIdRates {
  #[instrument(
    name = "shipping::quote",
    skip(self, request),
    fields(origin = %request.origin_village_code, destination = %request.destination_village_code, weight = request.weight)
  )]
  async fn quote(&self, request: &RateRequest) -> AppResult<Vec<ShippingQuote>> {
    let url = format!("{}/expedition/shipping-cost", self.base_url);
    let weight = request.weight.to_string();
    let mut query = vec![
      ("origin_village_code", request.origin_village_code.as_str()),
      ("destination_village_code", request.destination_village_code.as_str()),
      ("weight", weight.as_str()),
    ];
    if let Some(courier) = request.courier.as_deref().filter(|c| !c.is_empty()) {
      query.push(("courier", courier));
    }

    let mut call = self.client.get(&url).query(&query);
    if let Some(key) = &self.api_key {
      call = call.header("x-api-co-id", key);
    }

    let response = call
      .send()
      .await
      .map_err(|e| AppError::Shipping(format!("request failed: {}", e)))?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      warn!(%status, body = %body, "Courier API answered with an error status.");
      return Err(AppError::Shipping(format!("courier API returned {}", status)));
    }

    let payload: Value = response
      .json()
      .await
      .map_err(|e| AppError::Shipping(format!("unreadable response: {}", e)))?;
    let quotes = parse_quotes(&payload)?;
    debug!("Received {} courier quotes.", quotes.len());
    Ok(quotes)
  }
}

/// Maps `{"is_success": true, "data": {"couriers": [...]}}` into quotes.
pub fn parse_quotes(payload: &Value) -> AppResult<Vec<ShippingQuote>> {
  if payload.get("is_success").and_then(Value::as_bool) != Some(true) {
    return Err(AppError::Shipping("courier API reported failure".to_string()));
  }
  let couriers = payload
    .pointer("/data/couriers")
    .and_then(Value::as_array)
    .ok_or_else(|| AppError::Shipping("invalid response structure".to_string()))?;

  couriers
    .iter()
    .map(|item| {
      let text = |key: &str| item.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
      let code = text("courier_code").unwrap_or("?");
      let service = text("courier_name")
        .or(text("courier_code"))
        .unwrap_or("Unknown Service")
        .to_string();
      let estimation = text("estimation");
      let price = item
        .get("price")
        .and_then(|p| p.as_i64().or_else(|| p.as_str().and_then(|s| s.parse().ok())))
        .ok_or_else(|| AppError::Shipping(format!("quote from {} has no price", service)))?;
      Ok(ShippingQuote {
        description: format!("({}) {}", code, estimation.unwrap_or("no estimate available")),
        service,
        price,
        estimated_delivery: estimation.unwrap_or("N/A").to_string(),
      })
    })
    .collect()
}
