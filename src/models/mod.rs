//! Linear model evaluation.
//!
//! Models are evaluated by small, pure functions so that the pipeline and the
//! report code can share them.

pub mod model;

pub use model::*;
