// src/conditional/builder.rs

//! Fluent builder for steps that dispatch to one of several sub-flows.
//!
//! Each arm pairs a condition on the parent context with a sub-flow over its own
//! context type `S`, plus an extractor that hands the sub-flow its context. The
//! first arm whose condition holds runs; a halted sub-flow halts the parent.

use crate::core::context_data::FlowContext;
use crate::core::control::{FlowOutcome, StepControl};
use crate::core::step::{BoxFuture, Handler};
use crate::error::FlowError;
use crate::pipeline::definition::Flow;
use std::sync::Arc;
use tracing::{event, Level};

/// What a branch step does when no arm's condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatch {
  Continue,
  Halt,
  Fail,
}

type Condition<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type ArmRunner<T, E> = Arc<dyn Fn(FlowContext<T>) -> BoxFuture<Result<StepControl, E>> + Send + Sync>;

struct Arm<T: Send + Sync + 'static, E> {
  label: String,
  condition: Condition<T>,
  run: ArmRunner<T, E>,
}

pub struct BranchBuilder<'flow, T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flow: &'flow mut Flow<T, E>,
  step: String,
  arms: Vec<Arm<T, E>>,
  no_match: NoMatch,
}

impl<'flow, T, E> BranchBuilder<'flow, T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) fn new(flow: &'flow mut Flow<T, E>, step: String) -> Self {
    Self {
      flow,
      step,
      arms: Vec::new(),
      no_match: NoMatch::Continue,
    }
  }

  /// Adds an arm. `extract` builds the sub-flow's context from the parent data;
  /// it usually hands out a `FlowContext<S>` the parent stored earlier, so the
  /// parent can read the sub-flow's results afterwards.
  pub fn arm<S>(
    mut self,
    label: &str,
    condition: impl Fn(&T) -> bool + Send + Sync + 'static,
    sub_flow: Arc<Flow<S, E>>,
    extract: impl Fn(&T) -> anyhow::Result<FlowContext<S>> + Send + Sync + 'static,
  ) -> Self
  where
    S: Send + Sync + 'static,
  {
    let extract = Arc::new(extract);
    let step = self.step.clone();
    let branch = label.to_string();

    let run: ArmRunner<T, E> = Arc::new(move |parent: FlowContext<T>| {
      let sub_flow = Arc::clone(&sub_flow);
      let extracted = parent.with(|data| extract(data)).map_err(|source| FlowError::BranchExtraction {
        step: step.clone(),
        branch: branch.clone(),
        source,
      });
      Box::pin(async move {
        let sub_ctx = extracted.map_err(E::from)?;
        let control = match sub_flow.run(sub_ctx).await? {
          FlowOutcome::Completed => StepControl::Continue,
          FlowOutcome::Halted { .. } => StepControl::Halt,
        };
        Ok::<_, E>(control)
      })
    });

    self.arms.push(Arm {
      label: label.to_string(),
      condition: Arc::new(condition),
      run,
    });
    self
  }

  pub fn otherwise(mut self, no_match: NoMatch) -> Self {
    self.no_match = no_match;
    self
  }

  /// Installs the dispatcher as the step's `on` handler.
  pub fn finish(self) {
    let arms = Arc::new(self.arms);
    let no_match = self.no_match;
    let step = self.step.clone();

    let dispatcher: Handler<T, E> = Box::new(move |ctx: FlowContext<T>| {
      let arms = Arc::clone(&arms);
      let step = step.clone();
      Box::pin(async move {
        let chosen = ctx.with(|data| arms.iter().position(|arm| (arm.condition)(data)));
        match chosen {
          Some(index) => {
            let arm = &arms[index];
            event!(Level::DEBUG, step = %step, branch = %arm.label, "Branch selected.");
            (arm.run)(ctx.clone()).await
          }
          None => {
            event!(Level::DEBUG, step = %step, ?no_match, "No branch matched.");
            match no_match {
              NoMatch::Continue => Ok(StepControl::Continue),
              NoMatch::Halt => Ok(StepControl::Halt),
              NoMatch::Fail => Err(E::from(FlowError::NoBranchMatched { step })),
            }
          }
        }
      })
    });

    self.flow.push_on_handler(&self.step, dispatcher);
  }
}
