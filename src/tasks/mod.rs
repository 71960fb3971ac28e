//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - Expiration sweep: physically removes entries whose policy has elapsed

mod sweep;

pub use sweep::{sweep_once, SweepState, Sweeper};
