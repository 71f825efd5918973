// storefront/src/pipelines/mod.rs

//! Every storefront workflow, built on `alur` flows and registered once at startup.

use crate::errors::AppError;
use crate::state::AppState;
use alur::FlowRegistry;
use std::sync::Arc;

pub mod common_steps;
pub mod contexts;

pub mod notification_pipeline;
pub mod order_admin_pipeline;
pub mod order_pipeline;
pub mod settlement_pipeline;

/// Registers all workflows with `registry`. Called from `AppState::new`.
pub fn register_all_pipelines(registry: &Arc<FlowRegistry<AppError>>, app_state: &AppState) {
  tracing::info!("Registering storefront pipelines...");

  order_pipeline::register_create_order_pipeline(registry, app_state);
  settlement_pipeline::register_settlement_pipeline(registry, app_state);
  notification_pipeline::register_notification_pipeline(registry, app_state);
  order_admin_pipeline::register_shipping_pipeline(registry, app_state);
  order_admin_pipeline::register_status_change_pipeline(registry, app_state);

  tracing::info!("All storefront pipelines registered.");
}
