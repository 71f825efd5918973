pub mod context_data;
pub mod control;
pub mod step;

pub use context_data::FlowContext;
pub use control::{FlowOutcome, StepControl};
pub use step::{Handler, StepDef};
