// storefront/src/pipelines/order_pipeline.rs

//! Checkout: validate the submitted lines, optionally reprice them from the
//! catalog, reserve stock for all of them at once, then record the order.

use alur::{Flow, FlowContext, FlowRegistry, StepControl};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::order::DEFAULT_RECIPIENT_NAME;
use crate::models::{NewOrder, OrderLine};
use crate::pipelines::contexts::CreateOrderCtxData;
use crate::services::StockRequest;
use crate::state::AppState;

/// Sum of `unit_price * quantity` over `lines`; an overflow is a validation error.
fn line_total(lines: &[OrderLine]) -> Result<i64, AppError> {
  lines.iter().try_fold(0i64, |total, line| {
    line
      .unit_price
      .checked_mul(i64::from(line.quantity))
      .and_then(|amount| total.checked_add(amount))
      .ok_or_else(|| AppError::Validation(format!("Order total overflows at product '{}'", line.product_id)))
  })
}

pub fn register_create_order_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) {
  let mut p = Flow::<CreateOrderCtxData, AppError>::new(
    "create_order",
    &[
      ("validate_request", false),
      ("reprice_lines", false),
      ("reserve_stock", false),
      ("persist_order", false),
    ],
  );

  p.skip_if("reprice_lines", |data: &CreateOrderCtxData| !data.app_state.config.reprice_orders);

  // Step 1: Validate
  p.on("validate_request", |ctx: FlowContext<CreateOrderCtxData>| async move {
    let mut guard = ctx.write();
    let draft = &mut guard.draft;

    if draft.lines.is_empty() {
      return Err(AppError::Validation("Order must contain at least one product".to_string()));
    }
    for (index, line) in draft.lines.iter().enumerate() {
      if line.product_id.trim().is_empty() {
        return Err(AppError::Validation(format!("Line {} is missing a product id", index + 1)));
      }
      if line.quantity < 1 {
        return Err(AppError::Validation(format!(
          "Line {} ({}) must have a quantity of at least 1",
          index + 1,
          line.product_id
        )));
      }
    }
    line_total(&draft.lines)?;
    if draft.price <= 0 {
      return Err(AppError::Validation("Order price must be a positive amount".to_string()));
    }
    for field in [&mut draft.address, &mut draft.phone] {
      if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *field = None;
      }
    }
    Ok::<_, AppError>(StepControl::Continue)
  });

  // Step 2: Reprice from the catalog (skipped unless REPRICE_ORDERS is on)
  p.on("reprice_lines", |ctx: FlowContext<CreateOrderCtxData>| async move {
    let (catalog, mut lines, submitted) = ctx.with(|data| {
      (
        data.app_state.catalog.clone(),
        data.draft.lines.clone(),
        data.draft.price,
      )
    });

    for line in lines.iter_mut() {
      let product = catalog
        .get(&line.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", line.product_id)))?;
      let unit_price = product.unit_price(line.option.as_deref()).ok_or_else(|| {
        AppError::Validation(format!(
          "Product '{}' has no option '{}'",
          product.id,
          line.option.as_deref().unwrap_or_default()
        ))
      })?;
      line.title = product.title;
      line.unit_price = unit_price;
    }
    let total = line_total(&lines)?;

    if total != submitted {
      warn!(submitted, computed = total, "Submitted order total does not match catalog prices.");
      return Err(AppError::Validation(format!(
        "Order total {} does not match catalog total {}",
        submitted, total
      )));
    }
    ctx.write().draft.lines = lines;
    Ok::<_, AppError>(StepControl::Continue)
  });

  // Step 3: Reserve stock, all lines or none
  p.on("reserve_stock", |ctx: FlowContext<CreateOrderCtxData>| async move {
    let (catalog, requests) = ctx.with(|data| {
      (
        data.app_state.catalog.clone(),
        StockRequest::from_lines(&data.draft.lines),
      )
    });
    let requests = requests?;

    if let Err(e) = catalog.reserve(&requests).await {
      warn!(error = %e, "Stock reservation failed.");
      return Err(e);
    }
    info!(products = requests.len(), "Stock reserved for order.");
    ctx.write().reserved = requests;
    Ok::<_, AppError>(StepControl::Continue)
  });

  // Step 4: Persist; hand reserved stock back if that fails
  p.on("persist_order", |ctx: FlowContext<CreateOrderCtxData>| async move {
    let (app_state, new_order, reserved) = ctx.with(|data| {
      let name = data
        .draft
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| data.principal.name.clone().filter(|n| !n.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_RECIPIENT_NAME.to_string());
      let new_order = NewOrder {
        user_email: data.principal.email.clone(),
        name,
        lines: data.draft.lines.clone(),
        price: data.draft.price,
        address: data.draft.address.clone(),
        phone: data.draft.phone.clone(),
      };
      (data.app_state.clone(), new_order, data.reserved.clone())
    });

    match app_state.ledger.create(new_order).await {
      Ok(order) => {
        ctx.write().order = Some(order);
        Ok::<_, AppError>(StepControl::Continue)
      }
      Err(e) => {
        error!(error = %e, "Persisting order failed; releasing reserved stock.");
        if let Err(release_err) = app_state.catalog.release(&reserved).await {
          error!(error = %release_err, "Releasing reserved stock failed.");
        }
        Err(e)
      }
    }
  });

  p.after("persist_order", |ctx: FlowContext<CreateOrderCtxData>| async move {
    ctx.with(|data| {
      if let Some(order) = &data.order {
        info!(order_id = %order.id, user = %order.user_email, price = order.price, "Order created.");
      }
    });
    Ok::<_, AppError>(StepControl::Continue)
  });

  registry.register(p);
  info!("Create-order pipeline registered.");
}
