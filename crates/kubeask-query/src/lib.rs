//! Question routing for kubeask
//!
//! This crate decides which resources a question needs, fetches them, and
//! either returns a raw list or hands a snapshot to the model.

mod classify;
mod engine;

pub use classify::{Intent, classify, resolve_scope, wants_all_namespaces};
pub use engine::{Plan, QueryEngine, assemble};
