// storefront/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use alur::FlowError;
use serde_json::json;
use thiserror::Error;

use crate::models::status::InvalidTransition;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Insufficient stock for product '{title}' ({product_id}): requested {requested}, available {available}")]
  InsufficientStock {
    product_id: String,
    title: String,
    requested: i32,
    available: i32,
  },

  #[error("Invalid Status Transition: {0}")]
  InvalidTransition(#[from] InvalidTransition),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Payment Gateway Error: {0}")]
  Gateway(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(db_err) => AppError::Sqlx(db_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::InsufficientStock { product_id, title, .. } => HttpResponse::Conflict().json(json!({
        "error": "Insufficient stock",
        "product_id": product_id,
        "title": title,
        "detail": self.to_string(),
      })),
      AppError::InvalidTransition(t) => HttpResponse::Conflict().json(json!({
        "error": "Invalid status transition",
        "from": t.from.label(),
        "to": t.to.label(),
      })),
      AppError::Conflict(m) => HttpResponse::Conflict().json(json!({"error": m})),
      AppError::Gateway(m) => {
        HttpResponse::BadGateway().json(json!({"error": "Payment provider error", "detail": m}))
      }
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"})),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        HttpResponse::InternalServerError()
          .json(json!({"error": "Workflow processing error", "detail": source.to_string()}))
      }
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::status::{OrderStatus, Trigger};
  use actix_web::http::StatusCode;

  #[test]
  fn status_codes_follow_error_taxonomy() {
    let cases = [
      (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
      (AppError::Auth("who".into()), StatusCode::UNAUTHORIZED),
      (AppError::Forbidden("no".into()), StatusCode::FORBIDDEN),
      (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
      (
        AppError::InsufficientStock {
          product_id: "p1".into(),
          title: "Nasi Goreng".into(),
          requested: 3,
          available: 1,
        },
        StatusCode::CONFLICT,
      ),
      (
        AppError::from(InvalidTransition {
          from: OrderStatus::Failed,
          to: OrderStatus::InProcess,
          trigger: Trigger::CashOnDelivery,
        }),
        StatusCode::CONFLICT,
      ),
      (AppError::Gateway("timeout".into()), StatusCode::BAD_GATEWAY),
      (AppError::Internal("oops".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, expected) in cases {
      assert_eq!(err.error_response().status(), expected, "{err}");
    }
  }

  #[test]
  fn anyhow_wrapping_sqlx_keeps_database_variant() {
    let err = AppError::from(anyhow::Error::new(sqlx::Error::RowNotFound));
    assert!(matches!(err, AppError::Sqlx(_)));

    let err = AppError::from(anyhow::anyhow!("plain"));
    assert!(matches!(err, AppError::Internal(ref m) if m == "plain"));
  }
}
