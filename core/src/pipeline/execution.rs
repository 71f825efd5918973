// src/pipeline/execution.rs

//! `Flow::run`.

use crate::core::context_data::FlowContext;
use crate::core::control::{FlowOutcome, StepControl};
use crate::core::step::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::Flow;
use tracing::{event, instrument, span, Instrument, Level};

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx`.
  ///
  /// Stops at the first handler error, or at the first handler returning
  /// [`StepControl::Halt`]. A required step that has no handlers fails the run
  /// with [`FlowError::HandlerMissing`].
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: FlowContext<T>) -> Result<FlowOutcome, E> {
    for (index, step) in self.steps.iter().enumerate() {
      let step_span = span!(Level::INFO, "flow_step", step = %step.name, index, optional = step.optional);

      if let Some(skip_if) = &step.skip_if {
        if ctx.with(|data| skip_if(data)) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped by condition.");
          continue;
        }
      }

      let hooks = match self.hooks.get(&step.name) {
        Some(hooks) if !hooks.is_empty() => hooks,
        _ if step.optional => {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers.");
          continue;
        }
        _ => {
          event!(parent: &step_span, Level::ERROR, "Required step has no handlers.");
          return Err(E::from(FlowError::HandlerMissing {
            step: step.name.clone(),
          }));
        }
      };

      for (phase, handlers) in [("before", &hooks.before), ("on", &hooks.on), ("after", &hooks.after)] {
        let control = run_phase(handlers, &ctx, phase).instrument(step_span.clone()).await?;
        if control == StepControl::Halt {
          event!(parent: &step_span, Level::INFO, phase, "Flow halted.");
          return Ok(FlowOutcome::Halted {
            step: step.name.clone(),
          });
        }
      }
    }

    event!(Level::DEBUG, "Flow completed.");
    Ok(FlowOutcome::Completed)
  }
}

async fn run_phase<T, E>(handlers: &[Handler<T, E>], ctx: &FlowContext<T>, phase: &'static str) -> Result<StepControl, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + Send + Sync + 'static,
{
  for handler in handlers {
    match handler(ctx.clone()).await {
      Ok(StepControl::Continue) => {}
      Ok(StepControl::Halt) => return Ok(StepControl::Halt),
      Err(e) => {
        event!(Level::WARN, phase, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(StepControl::Continue)
}
