// storefront/src/services/signature.rs

//! Midtrans notification signatures:
//! `hex(SHA512(order_id + status_code + gross_amount + server_key))`.

use sha2::{Digest, Sha512};

pub fn notification_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
  let mut hasher = Sha512::new();
  hasher.update(order_id.as_bytes());
  hasher.update(status_code.as_bytes());
  hasher.update(gross_amount.as_bytes());
  hasher.update(server_key.as_bytes());
  hex::encode(hasher.finalize())
}

pub fn verify_notification_signature(
  order_id: &str,
  status_code: &str,
  gross_amount: &str,
  server_key: &str,
  signature: &str,
) -> bool {
  let expected = notification_signature(order_id, status_code, gross_amount, server_key);
  // Compare every byte regardless of where the first mismatch is.
  let provided = signature.trim().to_ascii_lowercase();
  expected.len() == provided.len()
    && expected
      .bytes()
      .zip(provided.bytes())
      .fold(0u8, |acc, (a, b)| acc | (a ^ b))
      == 0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signature_is_lowercase_sha512_hex() {
    let sig = notification_signature("ORDER__x__1", "200", "20000.00", "server-key");
    assert_eq!(sig.len(), 128);
    assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
  }

  #[test]
  fn verification_detects_tampering() {
    let sig = notification_signature("ORDER__x__1", "200", "20000.00", "server-key");
    assert!(verify_notification_signature("ORDER__x__1", "200", "20000.00", "server-key", &sig));
    assert!(verify_notification_signature(
      "ORDER__x__1",
      "200",
      "20000.00",
      "server-key",
      &sig.to_uppercase()
    ));
    assert!(!verify_notification_signature("ORDER__x__1", "200", "1.00", "server-key", &sig));
    assert!(!verify_notification_signature("ORDER__x__1", "200", "20000.00", "other-key", &sig));
    assert!(!verify_notification_signature("ORDER__x__1", "200", "20000.00", "server-key", ""));
  }
}
