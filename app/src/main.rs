// app/src/main.rs

mod config;
mod errors;
mod services;
mod state;
mod web;

use crate::config::{AppConfig, LogFormat, StoreBackend};
use crate::errors::{AppError, Result as AppResult};
use crate::services::shipping::ApiCoIdRates;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tani::{MarketStore, MemoryMarketStore, PgMarketStore, MIGRATOR};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str()));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter) // RUST_LOG overrides the INFO default
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

async fn build_store(config: &AppConfig) -> AppResult<Arc<dyn MarketStore>> {
  match config.store_backend {
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on restart.");
      Ok(Arc::new(MemoryMarketStore::new()))
    }
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;
      let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await?;
      tracing::info!("Successfully connected to the database.");

      if config.run_migrations {
        MIGRATOR
          .run(&pool)
          .await
          .map_err(|e| AppError::Internal(format!("Migrations failed: {}", e)))?;
        tracing::info!("Database migrations applied.");
      }
      Ok(Arc::new(PgMarketStore::new(pool)))
    }
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  init_tracing(LogFormat::from_env());
  tracing::info!("Starting marketplace server...");

  let app_config = Arc::new(AppConfig::from_env().context("loading configuration")?);
  let store = build_store(&app_config).await.context("initialising the store")?;
  let shipping = ApiCoIdRates::new(
    app_config.shipping_api_base_url.clone(),
    app_config.shipping_api_key.clone(),
    app_config.shipping_timeout,
  )
  .context("initialising the shipping client")?;

  let app_state = AppState {
    store,
    shipping: Arc::new(shipping),
    config: app_config.clone(),
  };

  let server_address = app_config.server_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await
  .context("running the HTTP server")
}
