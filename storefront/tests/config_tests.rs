// tests/config_tests.rs

use serial_test::serial;
use std::env;

use storefront::config::{AppConfig, GatewayMode, StoreBackend};
use storefront::errors::AppError;

const VARS: [&str; 11] = [
  "SERVER_HOST",
  "SERVER_PORT",
  "STORE_BACKEND",
  "DATABASE_URL",
  "APP_BASE_URL",
  "GATEWAY_MODE",
  "MIDTRANS_SERVER_KEY",
  "MIDTRANS_PRODUCTION",
  "MIDTRANS_VERIFY_SIGNATURE",
  "REPRICE_ORDERS",
  "SEED_DB",
];

fn clear_env() {
  for var in VARS {
    env::remove_var(var);
  }
}

#[test]
#[serial]
fn memory_backend_needs_no_database() {
  clear_env();
  env::set_var("STORE_BACKEND", "memory");
  env::set_var("SERVER_PORT", "9090");
  env::set_var("APP_BASE_URL", "https://shop.example.com/");

  let config = AppConfig::from_env().unwrap();
  assert_eq!(config.store_backend, StoreBackend::Memory);
  assert_eq!(config.gateway_mode, GatewayMode::Mock);
  assert_eq!(config.server_port, 9090);
  assert_eq!(config.app_base_url, "https://shop.example.com");
  assert!(!config.reprice_orders);
  assert!(!config.verify_notification_signature);
  clear_env();
}

#[test]
#[serial]
fn postgres_backend_requires_database_url() {
  clear_env();
  assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));

  env::set_var("DATABASE_URL", "postgres://localhost/shop");
  let config = AppConfig::from_env().unwrap();
  assert_eq!(config.store_backend, StoreBackend::Postgres);
  assert_eq!(config.app_base_url, "http://127.0.0.1:8080");
  clear_env();
}

#[test]
#[serial]
fn midtrans_requires_server_key() {
  clear_env();
  env::set_var("STORE_BACKEND", "memory");
  env::set_var("GATEWAY_MODE", "midtrans");
  assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));

  env::set_var("MIDTRANS_SERVER_KEY", "SB-Mid-server-test");
  env::set_var("MIDTRANS_VERIFY_SIGNATURE", "true");
  let config = AppConfig::from_env().unwrap();
  assert_eq!(config.gateway_mode, GatewayMode::Midtrans);
  assert!(config.verify_notification_signature);
  clear_env();
}

#[test]
#[serial]
fn invalid_flags_are_config_errors() {
  clear_env();
  env::set_var("STORE_BACKEND", "memory");
  env::set_var("REPRICE_ORDERS", "sometimes");
  assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
  clear_env();
}
