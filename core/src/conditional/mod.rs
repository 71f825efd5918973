// src/conditional/mod.rs

//! Conditional dispatch from a step into sub-flows.

pub mod builder;

pub use builder::{BranchBuilder, NoMatch};
