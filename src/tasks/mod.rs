//! Background Tasks Module
//!
//! # Tasks
//! - Stale sweep: removes entries past their freshness window at a configured
//!   interval (off unless `SWEEP_INTERVAL` is set)

mod sweep;

pub use sweep::spawn_sweep_task;
