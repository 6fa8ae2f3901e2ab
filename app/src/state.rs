// app/src/state.rs
use crate::config::AppConfig;
use crate::services::shipping::ShippingRates;
use std::sync::Arc;
use tani::MarketStore;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn MarketStore>,
  pub shipping: Arc<dyn ShippingRates>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  pub fn store(&self) -> &dyn MarketStore {
    self.store.as_ref()
  }
}
