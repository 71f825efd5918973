// storefront/src/models/notification.rs

use serde::Deserialize;

/// Body of an asynchronous payment notification.
///
/// `order_id` is the transaction token issued at payment initiation, not the
/// internal order id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentNotification {
  #[serde(default)]
  pub order_id: Option<String>,
  #[serde(default)]
  pub transaction_status: String,
  #[serde(default)]
  pub fraud_status: Option<String>,
  #[serde(default)]
  pub payment_type: Option<String>,
  #[serde(default)]
  pub status_code: Option<String>,
  #[serde(default, deserialize_with = "amount_as_string")]
  pub gross_amount: Option<String>,
  #[serde(default)]
  pub signature_key: Option<String>,
}

// The gateway sends gross_amount as a string ("20000.00"), some simulators as a number.
fn amount_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
  Ok(match raw {
    Some(serde_json::Value::String(s)) => Some(s),
    Some(serde_json::Value::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}
