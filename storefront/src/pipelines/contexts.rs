// storefront/src/pipelines/contexts.rs

//! Data the workflows run over. Handlers receive these wrapped in
//! `alur::FlowContext`.

use alur::FlowContext;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Order, OrderLine, OrderStatus, PaymentNotification, Principal, ShippingInfo};
use crate::services::StockRequest;
use crate::state::AppState;

// --- Order creation ---

/// What the shopper submitted at checkout.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
  pub lines: Vec<OrderLine>,
  pub price: i64,
  pub name: Option<String>,
  pub address: Option<String>,
  pub phone: Option<String>,
}

#[derive(Clone)]
pub struct CreateOrderCtxData {
  pub app_state: AppState,
  pub principal: Principal,
  pub draft: OrderDraft,
  /// Set once the reservation committed; released again if persisting fails.
  pub reserved: Vec<StockRequest>,
  pub order: Option<Order>,
}

impl CreateOrderCtxData {
  pub fn new(app_state: AppState, principal: Principal, draft: OrderDraft) -> Self {
    Self {
      app_state,
      principal,
      draft,
      reserved: Vec::new(),
      order: None,
    }
  }
}

// --- Settlement: gateway payment or cash on delivery ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementRoute {
  Gateway,
  CashOnDelivery,
}

#[derive(Clone)]
pub struct PaymentInitCtxData {
  pub app_state: AppState,
  pub principal: Principal,
  pub order_id: Uuid,
  pub order: Option<Order>,
  pub token: Option<String>,
  pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodOutcome {
  Confirmed,
  AlreadyConfirmed,
}

#[derive(Clone)]
pub struct CodCtxData {
  pub app_state: AppState,
  pub principal: Principal,
  pub order_id: Uuid,
  pub order: Option<Order>,
  pub outcome: Option<CodOutcome>,
}

/// The sub-context prepared for whichever settlement branch runs.
#[derive(Clone)]
pub enum SettlementBranch {
  None,
  Gateway(FlowContext<PaymentInitCtxData>),
  CashOnDelivery(FlowContext<CodCtxData>),
}

#[derive(Clone)]
pub struct SettlementCtxData {
  pub app_state: AppState,
  pub principal: Principal,
  pub order_id: Uuid,
  pub route: SettlementRoute,
  pub branch: SettlementBranch,
}

impl SettlementCtxData {
  pub fn new(app_state: AppState, principal: Principal, order_id: Uuid, route: SettlementRoute) -> Self {
    Self {
      app_state,
      principal,
      order_id,
      route,
      branch: SettlementBranch::None,
    }
  }

  pub fn redirect_url(&self) -> Option<String> {
    match &self.branch {
      SettlementBranch::Gateway(sub) => sub.read().redirect_url.clone(),
      _ => None,
    }
  }

  pub fn cod_outcome(&self) -> Option<CodOutcome> {
    match &self.branch {
      SettlementBranch::CashOnDelivery(sub) => sub.read().outcome,
      _ => None,
    }
  }

  /// The order as the branch last saw it.
  pub fn order(&self) -> Option<Order> {
    match &self.branch {
      SettlementBranch::Gateway(sub) => sub.read().order.clone(),
      SettlementBranch::CashOnDelivery(sub) => sub.read().order.clone(),
      SettlementBranch::None => None,
    }
  }
}

// --- Payment notifications ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
  Applied,
  Unchanged,
  Ignored,
}

#[derive(Clone)]
pub struct NotificationCtxData {
  pub app_state: AppState,
  pub notification: PaymentNotification,
  pub order_id: Option<Uuid>,
  pub target: Option<OrderStatus>,
  pub order: Option<Order>,
  pub outcome: Option<ReconcileOutcome>,
  pub reason: Option<&'static str>,
}

impl NotificationCtxData {
  pub fn new(app_state: AppState, notification: PaymentNotification) -> Self {
    Self {
      app_state,
      notification,
      order_id: None,
      target: None,
      order: None,
      outcome: None,
      reason: None,
    }
  }
}

// --- Order maintenance ---

#[derive(Clone)]
pub struct ShippingCtxData {
  pub app_state: AppState,
  pub principal: Principal,
  pub order_id: Uuid,
  pub shipping: ShippingInfo,
  pub order: Option<Order>,
}

#[derive(Clone)]
pub struct StatusChangeCtxData {
  pub app_state: AppState,
  pub principal: Principal,
  pub order_id: Uuid,
  pub requested: OrderStatus,
  pub order: Option<Order>,
  pub changed: bool,
}
