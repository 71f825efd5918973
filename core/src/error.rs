// src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by the workflow machinery itself, as opposed to the
/// application errors returned by step handlers.
///
/// Every flow error type `E` must implement `From<FlowError>` so these can be
/// surfaced through the same `Result<_, E>` the handlers use.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step '{step}' is required but has no handlers")]
  HandlerMissing { step: String },

  #[error("Branch '{branch}' of step '{step}' could not build its sub-context: {source}")]
  BranchExtraction {
    step: String,
    branch: String,
    #[source]
    source: AnyhowError,
  },

  #[error("No branch matched in step '{step}'")]
  NoBranchMatched { step: String },

  #[error("No flow registered for context type {type_name}")]
  NotRegistered { type_name: &'static str },

  #[error("Context type mismatch in registry dispatch (expected {expected})")]
  TypeMismatch { expected: &'static str },
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
