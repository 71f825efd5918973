// storefront/src/services/mock_gateway.rs

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument};

use crate::errors::{AppError, Result as AppResult};
use crate::services::gateway::{PaymentGateway, TransactionRedirect, TransactionRequest};

pub const MOCK_PAYMENT_BASE_URL: &str = "https://mock-gateway.local/pay";

/// In-process gateway that records every request and can be told to fail.
#[derive(Default)]
pub struct MockGateway {
  requests: Mutex<Vec<TransactionRequest>>,
  failing: AtomicBool,
}

impl MockGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  pub fn requests(&self) -> Vec<TransactionRequest> {
    self.requests.lock().clone()
  }
}

#[async_trait]
impl PaymentGateway for MockGateway {
  fn name(&self) -> &'static str {
    "mock"
  }

  #[instrument(name = "MockGateway::create_transaction", skip_all, fields(token = %request.token, amount = request.amount))]
  async fn create_transaction(&self, request: &TransactionRequest) -> AppResult<TransactionRedirect> {
    self.requests.lock().push(request.clone());
    if self.failing.load(Ordering::SeqCst) {
      return Err(AppError::Gateway("Mock gateway configured to fail".to_string()));
    }
    if request.amount <= 0 {
      return Err(AppError::Gateway("Amount must be greater than zero".to_string()));
    }
    info!("Simulated hosted payment page.");
    Ok(TransactionRedirect {
      redirect_url: format!("{}/{}", MOCK_PAYMENT_BASE_URL, request.token),
    })
  }
}
