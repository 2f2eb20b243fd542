//! Input/output helpers.
//!
//! - append-only CSV workbook sink (`workbook`)
//! - model JSON read/write (`model`)

pub mod model;
pub mod workbook;

pub use model::*;
pub use workbook::*;
