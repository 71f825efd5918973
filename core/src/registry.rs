// src/registry.rs

//! `FlowRegistry<E>`: one flow per context type, dispatched by `TypeId`.

use crate::core::context_data::FlowContext;
use crate::core::control::FlowOutcome;
use crate::error::FlowError;
use crate::pipeline::definition::Flow;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedFlow<AppErr>: Send + Sync {
  fn name(&self) -> &str;

  /// `ctx` must hold a `FlowContext<T>` for the wrapped flow's `T`.
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr>;
}

struct Registered<T, FlowErr, AppErr>
where
  T: Send + Sync + 'static,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flow: Flow<T, FlowErr>,
  _app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<T, FlowErr, AppErr> ErasedFlow<AppErr> for Registered<T, FlowErr, AppErr>
where
  T: Send + Sync + 'static,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<FlowErr> + From<FlowError> + Send + Sync + 'static,
{
  fn name(&self) -> &str {
    self.flow.name()
  }

  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr> {
    let ctx = ctx.downcast::<FlowContext<T>>().map_err(|_| {
      AppErr::from(FlowError::TypeMismatch {
        expected: std::any::type_name::<FlowContext<T>>(),
      })
    })?;
    self.flow.run(*ctx).await.map_err(AppErr::from)
  }
}

/// Registry of flows keyed by the context type they run over.
///
/// `AppErr` is what `run` returns; it absorbs both each flow's handler error and
/// registry-level failures such as running a context type nobody registered.
pub struct FlowRegistry<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flows: RwLock<HashMap<TypeId, Arc<dyn ErasedFlow<AppErr>>>>,
}

impl<AppErr> Default for FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flows: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `flow` for context type `T`, replacing any earlier flow for `T`.
  pub fn register<T, FlowErr>(&self, flow: Flow<T, FlowErr>)
  where
    T: Send + Sync + 'static,
    FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<FlowErr>,
  {
    event!(Level::DEBUG, flow = %flow.name(), context = %std::any::type_name::<T>(), "Registering flow.");
    let entry: Arc<dyn ErasedFlow<AppErr>> = Arc::new(Registered::<T, FlowErr, AppErr> {
      flow,
      _app_err: PhantomData,
    });
    self.flows.write().insert(TypeId::of::<T>(), entry);
  }

  pub fn is_registered<T: 'static>(&self) -> bool {
    self.flows.read().contains_key(&TypeId::of::<T>())
  }

  /// Runs the flow registered for `T` against `ctx`.
  pub async fn run<T>(&self, ctx: FlowContext<T>) -> Result<FlowOutcome, AppErr>
  where
    T: Send + Sync + 'static,
  {
    let entry = self.flows.read().get(&TypeId::of::<T>()).cloned();
    let entry = entry.ok_or_else(|| {
      let type_name = std::any::type_name::<T>();
      event!(Level::ERROR, context = %type_name, "No flow registered.");
      AppErr::from(FlowError::NotRegistered { type_name })
    })?;

    event!(Level::DEBUG, flow = %entry.name(), "Dispatching flow.");
    entry.run_erased(Box::new(ctx)).await
  }
}
