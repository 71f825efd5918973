// tests/registry_tests.rs
mod common;

use alur::{Flow, FlowContext, FlowError, FlowOutcome, FlowRegistry, StepControl};
use common::*;

#[derive(Debug, Default)]
struct Greeting {
  text: String,
}

#[derive(Debug, Default)]
struct Tally {
  count: u32,
}

#[derive(Debug, thiserror::Error)]
enum GreetingError {
  #[error("greeting rejected")]
  Rejected,
  #[error(transparent)]
  Flow(#[from] FlowError),
}

impl From<GreetingError> for TestError {
  fn from(e: GreetingError) -> Self {
    match e {
      GreetingError::Flow(inner) => TestError::from(inner),
      other => TestError::Handler(other.to_string()),
    }
  }
}

fn registry() -> FlowRegistry<TestError> {
  let registry = FlowRegistry::<TestError>::new();

  let mut greet = Flow::<Greeting, GreetingError>::new("greet", &[("compose", false)]);
  greet.on("compose", |ctx: FlowContext<Greeting>| async move {
    let mut guard = ctx.write();
    if guard.text.is_empty() {
      return Err(GreetingError::Rejected);
    }
    guard.text = format!("hello, {}", guard.text);
    Ok(StepControl::Continue)
  });
  registry.register(greet);

  let mut tally = Flow::<Tally, TestError>::new("tally", &[("bump", false)]);
  tally.on("bump", |ctx: FlowContext<Tally>| async move {
    ctx.write().count += 1;
    Ok::<_, TestError>(StepControl::Continue)
  });
  registry.register(tally);

  registry
}

#[tokio::test]
async fn dispatches_by_context_type() {
  setup_tracing();
  let registry = registry();

  let greeting = FlowContext::new(Greeting { text: "ana".to_string() });
  assert_eq!(registry.run(greeting.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(greeting.read().text, "hello, ana");

  let tally = FlowContext::new(Tally::default());
  registry.run(tally.clone()).await.unwrap();
  registry.run(tally.clone()).await.unwrap();
  assert_eq!(tally.read().count, 2);
}

#[tokio::test]
async fn handler_errors_convert_into_the_registry_error() {
  setup_tracing();
  let registry = registry();

  let err = registry.run(FlowContext::new(Greeting::default())).await.unwrap_err();

  assert_eq!(err, TestError::Handler("greeting rejected".to_string()));
}

#[tokio::test]
async fn unregistered_context_type_is_an_error() {
  setup_tracing();
  let registry = registry();

  #[derive(Debug, Default)]
  struct Unknown;

  assert!(registry.is_registered::<Tally>());
  assert!(!registry.is_registered::<Unknown>());

  let err = registry.run(FlowContext::new(Unknown)).await.unwrap_err();
  match err {
    TestError::Flow(msg) => assert!(msg.contains("Unknown"), "unexpected message: {msg}"),
    other => panic!("expected a flow error, got {other:?}"),
  }
}

#[tokio::test]
async fn registering_twice_replaces_the_flow() {
  setup_tracing();
  let registry = registry();

  let mut doubled = Flow::<Tally, TestError>::new("tally_by_two", &[("bump", false)]);
  doubled.on("bump", |ctx: FlowContext<Tally>| async move {
    ctx.write().count += 2;
    Ok::<_, TestError>(StepControl::Continue)
  });
  registry.register(doubled);

  let tally = FlowContext::new(Tally::default());
  registry.run(tally.clone()).await.unwrap();
  assert_eq!(tally.read().count, 2);
}
