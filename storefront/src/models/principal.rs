// storefront/src/models/principal.rs

/// The acting user, as vouched for by the session provider in front of this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
  pub email: String,
  pub name: Option<String>,
  pub is_admin: bool,
}

impl Principal {
  pub fn customer(email: &str) -> Self {
    Self {
      email: email.to_string(),
      name: None,
      is_admin: false,
    }
  }

  pub fn admin(email: &str) -> Self {
    Self {
      email: email.to_string(),
      name: None,
      is_admin: true,
    }
  }

  pub fn can_access(&self, owner_email: &str) -> bool {
    self.is_admin || self.email.eq_ignore_ascii_case(owner_email)
  }
}
