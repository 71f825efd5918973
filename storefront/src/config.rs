// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "pg" => Ok(StoreBackend::Postgres),
      "memory" | "mem" => Ok(StoreBackend::Memory),
      other => Err(AppError::Config(format!("Invalid STORE_BACKEND '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
  Midtrans,
  Mock,
}

impl FromStr for GatewayMode {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "midtrans" => Ok(GatewayMode::Midtrans),
      "mock" => Ok(GatewayMode::Mock),
      other => Err(AppError::Config(format!("Invalid GATEWAY_MODE '{}'", other))),
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  /// Required when `store_backend` is Postgres.
  pub database_url: Option<String>,
  /// Public site URL; the gateway's finish callback points back here.
  pub app_base_url: String,

  pub gateway_mode: GatewayMode,
  pub midtrans_server_key: Option<String>,
  pub midtrans_production: bool,
  pub verify_notification_signature: bool,

  /// Recompute order totals from catalog prices instead of trusting the client.
  pub reprice_orders: bool,

  // Apply schema.sql and insert the demo catalog on startup.
  pub seed_db: bool,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("store_backend", &self.store_backend)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("app_base_url", &self.app_base_url)
      .field("gateway_mode", &self.gateway_mode)
      .field("midtrans_server_key", &self.midtrans_server_key.as_ref().map(|_| "[REDACTED]"))
      .field("midtrans_production", &self.midtrans_production)
      .field("verify_notification_signature", &self.verify_notification_signature)
      .field("reprice_orders", &self.reprice_orders)
      .field("seed_db", &self.seed_db)
      .finish()
  }
}

impl Default for AppConfig {
  /// In-memory store with the mock gateway; what the test suites run against.
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      store_backend: StoreBackend::Memory,
      database_url: None,
      app_base_url: "http://127.0.0.1:8080".to_string(),
      gateway_mode: GatewayMode::Mock,
      midtrans_server_key: None,
      midtrans_production: false,
      verify_notification_signature: false,
      reprice_orders: false,
      seed_db: false,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let get_flag = |var_name: &str| {
      get_env(var_name)
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .map_err(|e| AppError::Config(format!("Invalid {} value: {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let store_backend = get_env("STORE_BACKEND")
      .unwrap_or_else(|_| "postgres".to_string())
      .parse::<StoreBackend>()?;
    let database_url = match store_backend {
      StoreBackend::Postgres => Some(get_env("DATABASE_URL")?),
      StoreBackend::Memory => get_env("DATABASE_URL").ok(),
    };
    let app_base_url = get_env("APP_BASE_URL")
      .unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port))
      .trim_end_matches('/')
      .to_string();

    let gateway_mode = get_env("GATEWAY_MODE")
      .unwrap_or_else(|_| "mock".to_string())
      .parse::<GatewayMode>()?;
    let midtrans_server_key = get_env("MIDTRANS_SERVER_KEY").ok().filter(|k| !k.trim().is_empty());
    let midtrans_production = get_flag("MIDTRANS_PRODUCTION")?;
    let verify_notification_signature = get_flag("MIDTRANS_VERIFY_SIGNATURE")?;

    if midtrans_server_key.is_none() && (gateway_mode == GatewayMode::Midtrans || verify_notification_signature) {
      return Err(AppError::Config(
        "MIDTRANS_SERVER_KEY is required for GATEWAY_MODE=midtrans and MIDTRANS_VERIFY_SIGNATURE=true".to_string(),
      ));
    }

    let reprice_orders = get_flag("REPRICE_ORDERS")?;
    let seed_db = get_flag("SEED_DB")?;

    let config = Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      app_base_url,
      gateway_mode,
      midtrans_server_key,
      midtrans_production,
      verify_notification_signature,
      reprice_orders,
      seed_db,
    };
    tracing::info!(config = ?config, "Application configuration loaded successfully.");
    Ok(config)
  }
}
