// src/pipeline/definition.rs

//! The `Flow<T, E>` struct and its construction.

use crate::conditional::builder::BranchBuilder;
use crate::core::step::{Handler, SkipIf, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;
use std::sync::Arc;

/// Handlers attached to one step, run in phase order.
pub(crate) struct StepHooks<T: Send + Sync + 'static, E> {
  pub(crate) before: Vec<Handler<T, E>>,
  pub(crate) on: Vec<Handler<T, E>>,
  pub(crate) after: Vec<Handler<T, E>>,
}

impl<T: Send + Sync + 'static, E> Default for StepHooks<T, E> {
  fn default() -> Self {
    Self {
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }
}

impl<T: Send + Sync + 'static, E> StepHooks<T, E> {
  pub(crate) fn is_empty(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }
}

/// An ordered list of named steps over context data `T`.
///
/// `E` is the error every handler returns. It must absorb [`FlowError`] so
/// framework failures (a required step without handlers, a branch that cannot
/// build its sub-context) come back through the same channel.
pub struct Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<T>>,
  pub(crate) hooks: HashMap<String, StepHooks<T, E>>,
}

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a flow from `(step_name, optional)` pairs, in execution order.
  pub fn new(name: &str, steps: &[(&str, bool)]) -> Self {
    Self {
      name: name.to_string(),
      steps: steps
        .iter()
        .map(|(step, optional)| StepDef {
          name: (*step).to_string(),
          optional: *optional,
          skip_if: None,
        })
        .collect(),
      hooks: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Skips `step` whenever `condition` holds for the context at the time the step is reached.
  pub fn skip_if(&mut self, step: &str, condition: impl Fn(&T) -> bool + Send + Sync + 'static) {
    let condition: SkipIf<T> = Arc::new(condition);
    self.step_mut(step).skip_if = Some(condition);
  }

  /// Turns `step` into a dispatch point over sub-flows.
  pub fn branch(&mut self, step: &str) -> BranchBuilder<'_, T, E> {
    self.step_mut(step);
    BranchBuilder::new(self, step.to_string())
  }

  /// Unknown step names are programming errors in flow setup, not runtime failures.
  pub(crate) fn step_mut(&mut self, step: &str) -> &mut StepDef<T> {
    let flow_name = self.name.clone();
    self
      .steps
      .iter_mut()
      .find(|s| s.name == step)
      .unwrap_or_else(|| panic!("flow '{}' has no step named '{}'", flow_name, step))
  }

  pub(crate) fn hooks_mut(&mut self, step: &str) -> &mut StepHooks<T, E> {
    self.step_mut(step);
    self.hooks.entry(step.to_string()).or_default()
  }
}
