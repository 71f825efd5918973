// src/core/step.rs

use super::{FlowContext, StepControl};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub(crate) type BoxFuture<R> = Pin<Box<dyn Future<Output = R> + Send>>;

/// A boxed step handler over context data `T`, failing with `E`.
pub type Handler<T, E> = Box<dyn Fn(FlowContext<T>) -> BoxFuture<Result<StepControl, E>> + Send + Sync>;

/// Predicate evaluated against the context before a step runs; `true` skips it.
pub type SkipIf<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Static description of one step.
#[derive(Clone)]
pub struct StepDef<T: Send + Sync + 'static> {
  pub name: String,
  /// An optional step with no handlers is passed over instead of failing the run.
  pub optional: bool,
  pub skip_if: Option<SkipIf<T>>,
}

impl<T: Send + Sync + 'static> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("has_skip_if", &self.skip_if.is_some())
      .finish()
  }
}
