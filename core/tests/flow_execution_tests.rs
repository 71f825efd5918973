// tests/flow_execution_tests.rs
mod common;

use alur::{Flow, FlowContext, FlowOutcome, StepControl};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn steps_run_in_declared_order() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new("ordered", &[("one", false), ("two", false), ("three", false)]);
  flow.on("three", record("three", "3"));
  flow.on("one", record("one", "1"));
  flow.on("two", record("two", "2"));

  let ctx = FlowContext::new(TestContext::default());
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  let guard = ctx.read();
  assert_eq!(guard.trail, vec!["one", "two", "three"]);
  assert_eq!(guard.message, "123");
}

#[tokio::test]
#[serial]
async fn phases_run_before_on_after() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new("phases", &[("only", false)]);
  flow.after("only", record("after", "c"));
  flow.on("only", record("on", "b"));
  flow.before("only", record("before", "a"));

  let ctx = FlowContext::new(TestContext::default());
  flow.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().trail, vec!["before", "on", "after"]);
}

#[tokio::test]
#[serial]
async fn halt_stops_remaining_steps() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new("halting", &[("a", false), ("b", false), ("c", false)]);
  flow.on("a", record("a", "A"));
  flow.on("b", record("b", "B"));
  flow.on("c", record("c", "C"));

  let ctx = FlowContext::new(TestContext {
    halt_at: Some("b".to_string()),
    ..Default::default()
  });
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Halted { step: "b".to_string() });
  assert!(!outcome.is_completed());
  assert_eq!(ctx.read().message, "AB");
}

#[tokio::test]
#[serial]
async fn halt_in_before_phase_skips_on_handlers() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new("early_halt", &[("guarded", false)]);
  flow.before("guarded", |_ctx: FlowContext<TestContext>| async move { Ok::<_, TestError>(StepControl::Halt) });
  flow.on("guarded", record("guarded", "never"));

  let ctx = FlowContext::new(TestContext::default());
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Halted { step: "guarded".to_string() });
  assert!(ctx.read().trail.is_empty());
}

#[tokio::test]
#[serial]
async fn handler_error_is_returned_and_later_steps_do_not_run() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new("failing", &[("good", false), ("bad", false), ("later", false)]);
  flow.on("good", record("good", "G"));
  flow.on("bad", fail("bad", "boom"));
  flow.on("later", record("later", "L"));

  let ctx = FlowContext::new(TestContext::default());
  let err = flow.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("boom".to_string()));
  assert_eq!(ctx.read().trail, vec!["good", "bad"]);
}

#[tokio::test]
#[serial]
async fn skip_if_is_evaluated_when_the_step_is_reached() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new("skipping", &[("first", false), ("maybe", false), ("last", false)]);
  flow.on("first", record("first", "F"));
  flow.on("maybe", record("maybe", "M"));
  flow.on("last", record("last", "L"));
  // "first" has already written to the message by the time "maybe" is reached.
  flow.skip_if("maybe", |data: &TestContext| !data.message.is_empty());

  let ctx = FlowContext::new(TestContext::default());
  flow.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().trail, vec!["first", "last"]);
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_passed_over() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new("optional", &[("a", false), ("hook_point", true), ("b", false)]);
  flow.on("a", record("a", ""));
  flow.on("b", record("b", ""));

  let ctx = FlowContext::new(TestContext::default());
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert!(outcome.is_completed());
  assert_eq!(ctx.read().trail, vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn required_step_without_handlers_fails() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new("missing", &[("a", false), ("unwired", false)]);
  flow.on("a", record("a", ""));

  let err = flow.run(FlowContext::new(TestContext::default())).await.unwrap_err();

  match err {
    TestError::Flow(msg) => assert!(msg.contains("unwired"), "unexpected message: {msg}"),
    other => panic!("expected a flow error, got {other:?}"),
  }
}

#[test]
fn step_names_keep_declaration_order() {
  let flow = Flow::<TestContext, TestError>::new("names", &[("x", false), ("y", true)]);
  assert_eq!(flow.name(), "names");
  assert_eq!(flow.step_names(), vec!["x", "y"]);
}

#[test]
#[should_panic(expected = "has no step named 'ghost'")]
fn wiring_an_unknown_step_panics() {
  let mut flow = Flow::<TestContext, TestError>::new("strict", &[("real", false)]);
  flow.on("ghost", record("ghost", ""));
}
