//! Serialized node dispatch

pub mod scheduler;

pub use scheduler::{Scheduler, DEFAULT_RATE_HZ};
