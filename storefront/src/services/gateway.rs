// storefront/src/services/gateway.rs

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::Result as AppResult;

/// Payment instruments offered on the hosted payment page.
pub const ALLOWED_PAYMENT_METHODS: [&str; 15] = [
  "credit_card",
  "gopay",
  "shopeepay",
  "qris",
  "bank_transfer",
  "echannel",
  "bca_klikbca",
  "bca_klikpay",
  "bri_epay",
  "cimb_clicks",
  "danamon_online",
  "akulaku",
  "kredivo",
  "dana",
  "ovo",
];

pub const CUSTOMER_FIRST_NAME: &str = "Customer";
pub const GUEST_EMAIL: &str = "guest@example.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerDetails {
  pub first_name: String,
  pub email: String,
}

impl CustomerDetails {
  pub fn for_email(email: &str) -> Self {
    let email = email.trim();
    Self {
      first_name: CUSTOMER_FIRST_NAME.to_string(),
      email: if email.is_empty() { GUEST_EMAIL } else { email }.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
  pub token: String,
  pub amount: i64,
  pub customer: CustomerDetails,
  pub allowed_methods: Vec<String>,
  /// Where the payment page sends the shopper when they are done.
  pub callback_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRedirect {
  pub redirect_url: String,
}

/// Hosted-payment provider. Implementations turn transport and provider
/// failures into `AppError::Gateway`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
  fn name(&self) -> &'static str;

  async fn create_transaction(&self, request: &TransactionRequest) -> AppResult<TransactionRedirect>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_email_falls_back_to_guest() {
    assert_eq!(CustomerDetails::for_email("  ").email, GUEST_EMAIL);
    let c = CustomerDetails::for_email("ana@example.com");
    assert_eq!(c.email, "ana@example.com");
    assert_eq!(c.first_name, "Customer");
  }
}
