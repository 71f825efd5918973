// src/lib.rs

//! Alur: small asynchronous step workflows.
//!
//! A [`Flow`] is an ordered list of named steps run over a shared [`FlowContext`].
//! Each step may carry `before`/`on`/`after` handlers, be optional, be skipped by a
//! condition on the context, or dispatch to one of several sub-flows through a
//! [`BranchBuilder`]. A [`FlowRegistry`] keeps one flow per context type so request
//! handlers only need to build a context and call `run`.
//!
//! Handlers receive a clone of the context handle. Lock guards taken from it are
//! blocking and must be dropped before the next `.await`.

pub mod conditional;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::conditional::builder::{BranchBuilder, NoMatch};
pub use crate::core::context_data::FlowContext;
pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::step::{Handler, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::definition::Flow;
pub use crate::registry::FlowRegistry;
