// storefront/src/main.rs

use std::sync::Arc;

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use storefront::config::{AppConfig, GatewayMode, StoreBackend};
use storefront::errors::{AppError, Result as AppResult};
use storefront::services::seed::seed_demo_catalog;
use storefront::services::{CatalogStore, MemoryStore, MidtransGateway, MockGateway, OrderLedger, PaymentGateway, PgStore};
use storefront::state::AppState;
use storefront::web::configure_app_routes;

type Stores = (Arc<dyn CatalogStore>, Arc<dyn OrderLedger>);

async fn build_stores(config: &AppConfig) -> AppResult<Stores> {
  match config.store_backend {
    StoreBackend::Memory => {
      tracing::info!("Using in-memory catalog and order ledger.");
      let store = Arc::new(MemoryStore::new());
      if config.seed_db {
        seed_demo_catalog(store.as_ref()).await?;
      }
      let catalog: Arc<dyn CatalogStore> = store.clone();
      let ledger: Arc<dyn OrderLedger> = store;
      Ok((catalog, ledger))
    }
    StoreBackend::Postgres => {
      let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres backend".to_string()))?;
      let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
      tracing::info!("Successfully connected to the database.");

      let store = Arc::new(PgStore::new(pool));
      if config.seed_db {
        store.apply_schema().await?;
        seed_demo_catalog(store.as_ref()).await?;
      }
      let catalog: Arc<dyn CatalogStore> = store.clone();
      let ledger: Arc<dyn OrderLedger> = store;
      Ok((catalog, ledger))
    }
  }
}

fn build_gateway(config: &AppConfig) -> AppResult<Arc<dyn PaymentGateway>> {
  match config.gateway_mode {
    GatewayMode::Mock => {
      tracing::warn!("Using the mock payment gateway; no real payments will be taken.");
      Ok(Arc::new(MockGateway::new()))
    }
    GatewayMode::Midtrans => {
      let server_key = config
        .midtrans_server_key
        .as_deref()
        .ok_or_else(|| AppError::Config("MIDTRANS_SERVER_KEY is required for the midtrans gateway".to_string()))?;
      Ok(Arc::new(MidtransGateway::new(server_key, config.midtrans_production)))
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = AppConfig::from_env().map_err(|e| {
    tracing::error!(error = %e, "Failed to load application configuration.");
    std::io::Error::other(e.to_string())
  })?;

  let (catalog, ledger) = build_stores(&app_config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialise storage.");
    std::io::Error::other(e.to_string())
  })?;
  let gateway = build_gateway(&app_config).map_err(|e| std::io::Error::other(e.to_string()))?;

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(app_config, catalog, ledger, gateway);

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
