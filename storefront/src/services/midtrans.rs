// storefront/src/services/midtrans.rs

//! Midtrans Snap over its REST API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument};

use crate::errors::{AppError, Result as AppResult};
use crate::services::gateway::{PaymentGateway, TransactionRedirect, TransactionRequest};

const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com/snap/v1/transactions";
const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com/snap/v1/transactions";

#[derive(Debug, Deserialize)]
struct SnapResponse {
  #[serde(default)]
  redirect_url: Option<String>,
  #[serde(default)]
  error_messages: Vec<String>,
}

pub struct MidtransGateway {
  client: reqwest::Client,
  server_key: String,
  endpoint: String,
}

impl MidtransGateway {
  pub fn new(server_key: &str, production: bool) -> Self {
    let endpoint = if production { PRODUCTION_SNAP_URL } else { SANDBOX_SNAP_URL };
    Self::with_endpoint(server_key, endpoint)
  }

  pub fn with_endpoint(server_key: &str, endpoint: &str) -> Self {
    Self {
      client: reqwest::Client::new(),
      server_key: server_key.to_string(),
      endpoint: endpoint.to_string(),
    }
  }

  fn request_body(request: &TransactionRequest) -> serde_json::Value {
    json!({
      "transaction_details": {
        "order_id": request.token,
        "gross_amount": request.amount,
      },
      "customer_details": request.customer,
      "enabled_payments": request.allowed_methods,
      "callbacks": {
        "finish": request.callback_url,
      },
    })
  }
}

#[async_trait]
impl PaymentGateway for MidtransGateway {
  fn name(&self) -> &'static str {
    "midtrans"
  }

  #[instrument(name = "MidtransGateway::create_transaction", skip_all, fields(token = %request.token, amount = request.amount), err(Display))]
  async fn create_transaction(&self, request: &TransactionRequest) -> AppResult<TransactionRedirect> {
    let response = self
      .client
      .post(&self.endpoint)
      .basic_auth(&self.server_key, Some(""))
      .header(reqwest::header::ACCEPT, "application/json")
      .json(&Self::request_body(request))
      .send()
      .await
      .map_err(|e| AppError::Gateway(format!("Snap request failed: {}", e)))?;

    let status = response.status();
    let body: SnapResponse = response
      .json()
      .await
      .map_err(|e| AppError::Gateway(format!("Unreadable Snap response ({}): {}", status, e)))?;

    match body.redirect_url {
      Some(redirect_url) if status.is_success() => {
        info!("Snap transaction created.");
        Ok(TransactionRedirect { redirect_url })
      }
      _ => {
        error!(%status, errors = ?body.error_messages, "Snap rejected the transaction.");
        Err(AppError::Gateway(format!(
          "Snap returned {}: {}",
          status,
          body.error_messages.join("; ")
        )))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::gateway::{CustomerDetails, ALLOWED_PAYMENT_METHODS};

  #[test]
  fn request_body_matches_snap_contract() {
    let request = TransactionRequest {
      token: "ORDER__abc__1".to_string(),
      amount: 20000,
      customer: CustomerDetails::for_email(""),
      allowed_methods: ALLOWED_PAYMENT_METHODS.iter().map(|m| m.to_string()).collect(),
      callback_url: "https://shop.test/success?order_id=abc&method=midtrans".to_string(),
    };
    let body = MidtransGateway::request_body(&request);

    assert_eq!(body["transaction_details"]["order_id"], "ORDER__abc__1");
    assert_eq!(body["transaction_details"]["gross_amount"], 20000);
    assert_eq!(body["customer_details"]["first_name"], "Customer");
    assert_eq!(body["customer_details"]["email"], "guest@example.com");
    assert_eq!(body["enabled_payments"].as_array().map(Vec::len), Some(15));
    assert_eq!(
      body["callbacks"]["finish"],
      "https://shop.test/success?order_id=abc&method=midtrans"
    );
  }

  #[tokio::test]
  async fn unreachable_endpoint_is_a_gateway_error() {
    let gateway = MidtransGateway::with_endpoint("key", "http://127.0.0.1:9/snap/v1/transactions");
    let request = TransactionRequest {
      token: "ORDER__abc__1".to_string(),
      amount: 1,
      customer: CustomerDetails::for_email("a@b.c"),
      allowed_methods: vec![],
      callback_url: String::new(),
    };
    assert!(matches!(
      gateway.create_transaction(&request).await,
      Err(AppError::Gateway(_))
    ));
  }
}
