// app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" => Ok(StoreBackend::Postgres),
      "memory" => Ok(StoreBackend::Memory),
      other => Err(AppError::Config(format!("Invalid STORE_BACKEND '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

impl LogFormat {
  /// Read before the subscriber exists, so errors fall back to text.
  pub fn from_env() -> Self {
    dotenv().ok();
    match env::var("LOG_FORMAT") {
      Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
      _ => LogFormat::Text,
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub jwt_secret: String,
  pub shipping_api_base_url: String,
  pub shipping_api_key: Option<String>,
  pub shipping_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("store_backend", &self.store_backend)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("database_max_connections", &self.database_max_connections)
      .field("run_migrations", &self.run_migrations)
      .field("jwt_secret", &"[REDACTED]")
      .field("shipping_api_base_url", &self.shipping_api_base_url)
      .field("shipping_api_key", &self.shipping_api_key.as_ref().map(|_| "[REDACTED]"))
      .field("shipping_timeout", &self.shipping_timeout)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let env_or = |var_name: &str, default: &str| get_env(var_name).unwrap_or_else(|_| default.to_string());

    let server_host = env_or("SERVER_HOST", "127.0.0.1");
    let server_port = env_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let store_backend = env_or("STORE_BACKEND", "postgres").parse::<StoreBackend>()?;
    let database_url = get_env("DATABASE_URL").ok();
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "DATABASE_URL is required when STORE_BACKEND=postgres".to_string(),
      ));
    }
    let database_max_connections = env_or("DATABASE_MAX_CONNECTIONS", "10")
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let run_migrations = env_or("RUN_MIGRATIONS", "false")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    let jwt_secret = get_env("JWT_SECRET")?;
    if jwt_secret.len() < 16 {
      return Err(AppError::Config("JWT_SECRET must be at least 16 bytes".to_string()));
    }

    let shipping_api_base_url = env_or("SHIPPING_API_BASE_URL", "https://use.api.co.id")
      .trim_end_matches('/')
      .to_string();
    let shipping_api_key = get_env("SHIPPING_API_KEY").ok().filter(|k| !k.is_empty());
    let shipping_timeout = env_or("SHIPPING_TIMEOUT_SECS", "10")
      .parse::<u64>()
      .map(Duration::from_secs)
      .map_err(|e| AppError::Config(format!("Invalid SHIPPING_TIMEOUT_SECS: {}", e)))?;

    let config = Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      database_max_connections,
      run_migrations,
      jwt_secret,
      shipping_api_base_url,
      shipping_api_key,
      shipping_timeout,
    };
    tracing::info!("Application configuration loaded successfully.");
    tracing::debug!(config = ?config, "Loaded config details");
    Ok(config)
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
impl AppConfig {
  pub fn for_tests(jwt_secret: &str) -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      store_backend: StoreBackend::Memory,
      database_url: None,
      database_max_connections: 1,
      run_migrations: false,
      jwt_secret: jwt_secret.to_string(),
      shipping_api_base_url: "http://127.0.0.1:9".to_string(),
      shipping_api_key: None,
      shipping_timeout: Duration::from_secs(1),
    }
  }
}
