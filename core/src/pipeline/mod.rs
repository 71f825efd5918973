// src/pipeline/mod.rs

//! `Flow<T, E>`: definition, handler registration and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Flow;
