//! Pure series transforms: returns, joins, and the combine-first merge.

pub mod align;
pub mod merge;
pub mod returns;

pub use align::*;
pub use merge::*;
pub use returns::*;
