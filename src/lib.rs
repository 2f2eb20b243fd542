//! `gapfill` library crate.
//!
//! The binary (`gapfill`) is a thin wrapper around this library so that:
//!
//! - the estimation pipeline is testable without spawning processes or hitting the network
//! - price sources and sinks are swappable behind traits
//! - the pure stages (returns, joins, fit, merge) can be used on their own

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod series;
