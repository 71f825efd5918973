// storefront/src/state.rs

use alur::FlowRegistry;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::{CatalogStore, OrderLedger, PaymentGateway};

#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<dyn CatalogStore>,
  pub ledger: Arc<dyn OrderLedger>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state and registers every workflow against it.
  pub fn new(
    config: AppConfig,
    catalog: Arc<dyn CatalogStore>,
    ledger: Arc<dyn OrderLedger>,
    gateway: Arc<dyn PaymentGateway>,
  ) -> Self {
    let state = Self {
      catalog,
      ledger,
      gateway,
      flows: Arc::new(FlowRegistry::new()),
      config: Arc::new(config),
    };
    crate::pipelines::register_all_pipelines(&state.flows, &state);
    state
  }
}
