// src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` handlers.

use crate::core::context_data::FlowContext;
use crate::core::control::StepControl;
use crate::core::step::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::Flow;
use std::future::Future;

fn boxed<T, E, F, UserErr>(handler_fn: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static) -> Handler<T, E>
where
  T: Send + Sync + 'static,
  F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
  UserErr: Into<E> + Send + Sync + 'static,
  E: 'static,
{
  Box::new(move |ctx| {
    let fut = handler_fn(ctx);
    Box::pin(async move { fut.await.map_err(Into::into) })
  })
}

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Adds a handler that runs before the step's `on` handlers.
  ///
  /// Handlers may fail with any error convertible into the flow's `E`.
  pub fn before<F, UserErr>(&mut self, step: &str, handler_fn: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + Sync + 'static,
  {
    let handler = boxed(handler_fn);
    self.hooks_mut(step).before.push(handler);
  }

  pub fn on<F, UserErr>(&mut self, step: &str, handler_fn: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + Sync + 'static,
  {
    let handler = boxed(handler_fn);
    self.hooks_mut(step).on.push(handler);
  }

  pub fn after<F, UserErr>(&mut self, step: &str, handler_fn: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + Sync + 'static,
  {
    let handler = boxed(handler_fn);
    self.hooks_mut(step).after.push(handler);
  }

  pub(crate) fn push_on_handler(&mut self, step: &str, handler: Handler<T, E>) {
    self.hooks_mut(step).on.push(handler);
  }
}
