// storefront/src/services/token.rs

//! Transaction tokens: `ORDER__<order id>__<epoch millis>`. A fresh token is
//! issued for every payment attempt; notifications carry it back.

use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};

const PREFIX: &str = "ORDER";
const DELIMITER: &str = "__";

pub fn compose(order_id: Uuid, epoch_millis: i64) -> String {
  format!("{PREFIX}{DELIMITER}{order_id}{DELIMITER}{epoch_millis}")
}

/// Extracts the order id from a token. Anything else is a validation error.
pub fn parse(token: Option<&str>) -> AppResult<Uuid> {
  let token = token
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| AppError::Validation("Missing order_id in notification".to_string()))?;

  let segment = token
    .split(DELIMITER)
    .nth(1)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| AppError::Validation(format!("Malformed transaction token '{}'", token)))?;

  Uuid::parse_str(segment)
    .map_err(|e| AppError::Validation(format!("Malformed order id in transaction token '{}': {}", token, e)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn composed_token_parses_back_to_order_id() {
    let id = Uuid::new_v4();
    let token = compose(id, 1_700_000_000_000);
    assert_eq!(token, format!("ORDER__{}__1700000000000", id));
    assert_eq!(parse(Some(&token)).unwrap(), id);
  }

  #[test]
  fn rejects_missing_or_malformed_tokens() {
    for bad in [None, Some(""), Some("   "), Some("ORDER"), Some("ORDER____1"), Some("ORDER__not-a-uuid__1")] {
      assert!(matches!(parse(bad), Err(AppError::Validation(_))), "accepted {bad:?}");
    }
  }
}
