// core/src/model/address.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MarketError, MarketResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
  pub id: Uuid,
  pub user_id: Uuid,
  pub detail: String,
  pub province: String,
  pub city_id: String,
  pub district_id: String,
  /// Administrative village code, used as the shipping destination.
  pub village_code: String,
  pub zip_code: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
  pub detail: String,
  pub province: String,
  pub city_id: String,
  pub district_id: String,
  pub village_code: String,
  pub zip_code: String,
}

impl NewAddress {
  pub fn validate(&self) -> MarketResult<()> {
    let fields = [
      ("detail", &self.detail),
      ("province", &self.province),
      ("cityId", &self.city_id),
      ("districtId", &self.district_id),
      ("villageCode", &self.village_code),
      ("zipCode", &self.zip_code),
    ];
    for (name, value) in fields {
      if value.trim().is_empty() {
        return Err(MarketError::validation(format!("{} is required", name)));
      }
    }
    Ok(())
  }
}

/// Partial address update over a fixed set of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressPatch {
  pub detail: Option<String>,
  pub province: Option<String>,
  pub city_id: Option<String>,
  pub district_id: Option<String>,
  pub village_code: Option<String>,
  pub zip_code: Option<String>,
}

impl AddressPatch {
  pub fn is_empty(&self) -> bool {
    self.detail.is_none()
      && self.province.is_none()
      && self.city_id.is_none()
      && self.district_id.is_none()
      && self.village_code.is_none()
      && self.zip_code.is_none()
  }

  pub fn validate(&self) -> MarketResult<()> {
    if self.is_empty() {
      return Err(MarketError::validation("no fields provided for update"));
    }
    let fields = [
      ("detail", &self.detail),
      ("province", &self.province),
      ("cityId", &self.city_id),
      ("districtId", &self.district_id),
      ("villageCode", &self.village_code),
      ("zipCode", &self.zip_code),
    ];
    for (name, value) in fields {
      if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        return Err(MarketError::validation(format!("{} cannot be empty", name)));
      }
    }
    Ok(())
  }

  pub fn apply_to(&self, address: &mut Address) {
    if let Some(detail) = &self.detail {
      address.detail = detail.clone();
    }
    if let Some(province) = &self.province {
      address.province = province.clone();
    }
    if let Some(city_id) = &self.city_id {
      address.city_id = city_id.clone();
    }
    if let Some(district_id) = &self.district_id {
      address.district_id = district_id.clone();
    }
    if let Some(village_code) = &self.village_code {
      address.village_code = village_code.clone();
    }
    if let Some(zip_code) = &self.zip_code {
      address.zip_code = zip_code.clone();
    }
  }
}

impl From<NewAddress> for AddressPatch {
  fn from(address: NewAddress) -> Self {
    Self {
      detail: Some(address.detail),
      province: Some(address.province),
      city_id: Some(address.city_id),
      district_id: Some(address.district_id),
      village_code: Some(address.village_code),
      zip_code: Some(address.zip_code),
    }
  }
}
