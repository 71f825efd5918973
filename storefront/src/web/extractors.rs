// storefront/src/web/extractors.rs

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::models::Principal;

pub const USER_EMAIL_HEADER: &str = "X-User-Email";
pub const USER_NAME_HEADER: &str = "X-User-Name";
pub const USER_ADMIN_HEADER: &str = "X-User-Admin";

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
  req
    .headers()
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
}

/// Identity comes from the session provider in front of us and is trusted as given.
impl FromRequest for Principal {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let Some(email) = header(req, USER_EMAIL_HEADER) else {
      warn!(path = %req.path(), "Request without {} header.", USER_EMAIL_HEADER);
      return ready(Err(AppError::Auth(format!(
        "Authentication required: missing {} header",
        USER_EMAIL_HEADER
      ))));
    };

    let is_admin = header(req, USER_ADMIN_HEADER).is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");

    ready(Ok(Principal {
      email: email.to_string(),
      name: header(req, USER_NAME_HEADER).map(str::to_string),
      is_admin,
    }))
  }
}
