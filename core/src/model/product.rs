// core/src/model/product.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::Type as SqlxType;
use std::fmt;
use uuid::Uuid;

use crate::error::{MarketError, MarketResult};

/// Availability status of a product.
///
/// `Inactive` covers listings a seller has paused; the availability rules
/// treat it as "currently unavailable". `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "product_status_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
  #[serde(alias = "pre-order")]
  PreOrder,
  ReadyStock,
  SoldOut,
  Inactive,
  Deleted,
}

impl ProductStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProductStatus::PreOrder => "pre_order",
      ProductStatus::ReadyStock => "ready_stock",
      ProductStatus::SoldOut => "sold_out",
      ProductStatus::Inactive => "inactive",
      ProductStatus::Deleted => "deleted",
    }
  }

  /// Live statuses move freely among each other and may be deleted.
  /// Nothing leaves `Deleted`.
  pub fn can_transition_to(self, next: ProductStatus) -> bool {
    match (self, next) {
      (ProductStatus::Deleted, _) => false,
      (_, _) => true,
    }
  }
}

impl fmt::Display for ProductStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub seller_id: Uuid,
  pub name: String,
  pub description: Option<String>,
  /// Price in whole rupiah.
  pub price: i64,
  pub unit: String,
  pub stock: i32,
  pub min_order: i32,
  /// Shipping weight of one unit, in grams.
  pub weight: i32,
  pub origin_village_code: Option<String>,
  pub image_path: Option<String>,
  pub category: Option<String>,
  pub harvest_date: Option<NaiveDate>,
  pub status: ProductStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  /// Only admins may list a product on behalf of another seller.
  #[serde(default)]
  pub seller_id: Option<Uuid>,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub price: i64,
  pub unit: String,
  #[serde(default)]
  pub stock: i32,
  #[serde(default = "default_min_order")]
  pub min_order: i32,
  #[serde(default)]
  pub weight: i32,
  #[serde(default)]
  pub origin_village_code: Option<String>,
  #[serde(default)]
  pub image_path: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub harvest_date: Option<NaiveDate>,
  #[serde(default)]
  pub status: Option<ProductStatus>,
}

fn default_min_order() -> i32 {
  1
}

impl NewProduct {
  pub fn validate(&self) -> MarketResult<()> {
    if self.name.trim().is_empty() || self.unit.trim().is_empty() {
      return Err(MarketError::validation("name and unit are required"));
    }
    check_bounds(Some(self.price), Some(self.stock), Some(self.min_order), Some(self.weight))?;
    if self.status == Some(ProductStatus::Deleted) {
      return Err(MarketError::validation("a new product cannot start out deleted"));
    }
    Ok(())
  }

  pub fn initial_status(&self) -> ProductStatus {
    self.status.unwrap_or(ProductStatus::PreOrder)
  }
}

/// Partial update of a product. Absent fields are left untouched; the clearable
/// text fields distinguish "absent" (`None`) from an explicit `null` (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductPatch {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub description: Option<Option<String>>,
  #[serde(default)]
  pub price: Option<i64>,
  #[serde(default)]
  pub unit: Option<String>,
  #[serde(default)]
  pub stock: Option<i32>,
  #[serde(default)]
  pub min_order: Option<i32>,
  #[serde(default)]
  pub weight: Option<i32>,
  #[serde(default, deserialize_with = "double_option")]
  pub origin_village_code: Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub image_path: Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub category: Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub harvest_date: Option<Option<NaiveDate>>,
  #[serde(default)]
  pub status: Option<ProductStatus>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

impl ProductPatch {
  pub fn status_only(status: ProductStatus) -> Self {
    Self {
      status: Some(status),
      ..Self::default()
    }
  }

  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.description.is_none()
      && self.price.is_none()
      && self.unit.is_none()
      && self.stock.is_none()
      && self.min_order.is_none()
      && self.weight.is_none()
      && self.origin_village_code.is_none()
      && self.image_path.is_none()
      && self.category.is_none()
      && self.harvest_date.is_none()
      && self.status.is_none()
  }

  pub fn validate(&self) -> MarketResult<()> {
    if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(MarketError::validation("name cannot be empty"));
    }
    if self.unit.as_deref().is_some_and(|u| u.trim().is_empty()) {
      return Err(MarketError::validation("unit cannot be empty"));
    }
    check_bounds(self.price, self.stock, self.min_order, self.weight)
  }

  /// Applies the recognised fields to `product` in place.
  pub fn apply_to(&self, product: &mut Product) {
    if let Some(name) = &self.name {
      product.name = name.clone();
    }
    if let Some(description) = &self.description {
      product.description = description.clone();
    }
    if let Some(price) = self.price {
      product.price = price;
    }
    if let Some(unit) = &self.unit {
      product.unit = unit.clone();
    }
    if let Some(stock) = self.stock {
      product.stock = stock;
    }
    if let Some(min_order) = self.min_order {
      product.min_order = min_order;
    }
    if let Some(weight) = self.weight {
      product.weight = weight;
    }
    if let Some(code) = &self.origin_village_code {
      product.origin_village_code = code.clone();
    }
    if let Some(image_path) = &self.image_path {
      product.image_path = image_path.clone();
    }
    if let Some(category) = &self.category {
      product.category = category.clone();
    }
    if let Some(harvest_date) = self.harvest_date {
      product.harvest_date = harvest_date;
    }
    if let Some(status) = self.status {
      product.status = status;
    }
  }
}

fn check_bounds(price: Option<i64>, stock: Option<i32>, min_order: Option<i32>, weight: Option<i32>) -> MarketResult<()> {
  if price.is_some_and(|p| p < 0) {
    return Err(MarketError::validation("price must be non-negative"));
  }
  if stock.is_some_and(|s| s < 0) {
    return Err(MarketError::validation("stock must be non-negative"));
  }
  if min_order.is_some_and(|m| m < 1) {
    return Err(MarketError::validation("min order must be at least 1"));
  }
  if weight.is_some_and(|w| w < 0) {
    return Err(MarketError::validation("weight must be non-negative"));
  }
  Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
  pub category: Option<String>,
  pub limit: Option<i64>,
  pub offset: Option<i64>,
}

impl ProductQuery {
  pub fn validate(&self) -> MarketResult<()> {
    if self.limit.is_some_and(|l| l < 1) {
      return Err(MarketError::validation("invalid limit parameter"));
    }
    if self.offset.is_some_and(|o| o < 0) {
      return Err(MarketError::validation("invalid offset parameter"));
    }
    if self.offset.is_some() && self.limit.is_none() {
      return Err(MarketError::validation("offset requires a limit"));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deleted_is_terminal() {
    use ProductStatus::*;
    for next in [PreOrder, ReadyStock, SoldOut, Inactive, Deleted] {
      assert!(!Deleted.can_transition_to(next), "deleted -> {next} must be refused");
    }
    assert!(ReadyStock.can_transition_to(SoldOut));
    assert!(SoldOut.can_transition_to(ReadyStock));
    assert!(Inactive.can_transition_to(Deleted));
  }

  #[test]
  fn patch_distinguishes_null_from_absent() {
    let patch: ProductPatch = serde_json::from_str(r#"{"description": null, "price": 1500}"#).unwrap();
    assert_eq!(patch.description, Some(None));
    assert_eq!(patch.category, None);
    assert_eq!(patch.price, Some(1500));
    assert!(!patch.is_empty());
  }

  #[test]
  fn patch_rejects_unknown_fields() {
    let parsed: Result<ProductPatch, _> = serde_json::from_str(r#"{"seller_id": "x"}"#);
    assert!(parsed.is_err());
  }

  #[test]
  fn status_accepts_legacy_pre_order_spelling() {
    let status: ProductStatus = serde_json::from_str(r#""pre-order""#).unwrap();
    assert_eq!(status, ProductStatus::PreOrder);
  }

  #[test]
  fn offset_without_limit_is_rejected() {
    let query = ProductQuery {
      offset: Some(10),
      ..ProductQuery::default()
    };
    assert!(matches!(query.validate(), Err(MarketError::Validation(_))));
  }
}
