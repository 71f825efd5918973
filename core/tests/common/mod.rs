// tests/common/mod.rs
#![allow(dead_code)]

use alur::{FlowContext, FlowError, StepControl};
use once_cell::sync::Lazy;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub trail: Vec<String>,
  pub message: String,
  pub halt_at: Option<String>,
  pub route: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubContext {
  pub input: String,
  pub output: String,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  // FlowError carries anyhow sources and is not PartialEq, so keep its Display.
  #[error("flow error: {0}")]
  Flow(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(e.to_string())
  }
}

pub type TestFuture = Pin<Box<dyn Future<Output = Result<StepControl, TestError>> + Send>>;

/// Handler that records `step` in the trail, appends `text`, and halts if the
/// context asks it to.
pub fn record(step: &'static str, text: &'static str) -> impl Fn(FlowContext<TestContext>) -> TestFuture + Send + Sync {
  move |ctx: FlowContext<TestContext>| -> TestFuture {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.trail.push(step.to_string());
      guard.message.push_str(text);
      tracing::debug!(target: "test_handlers", step, message = %guard.message, "recorded");
      if guard.halt_at.as_deref() == Some(step) {
        return Ok(StepControl::Halt);
      }
      Ok(StepControl::Continue)
    })
  }
}

pub fn fail(step: &'static str, reason: &'static str) -> impl Fn(FlowContext<TestContext>) -> TestFuture + Send + Sync {
  move |ctx: FlowContext<TestContext>| -> TestFuture {
    Box::pin(async move {
      ctx.write().trail.push(step.to_string());
      Err(TestError::Handler(reason.to_string()))
    })
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub static SUB_RUNS: AtomicUsize = AtomicUsize::new(0);

pub fn reset_counters() {
  SUB_RUNS.store(0, Ordering::SeqCst);
}
