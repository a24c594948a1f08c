//! Ports (hexagonal boundaries) of the gateway.
//!
//! The module bus port lives in `shared-bus`; this crate only adds the clock.

pub mod outbound;

pub use outbound::{FixedClock, SystemTimeSource, TimeSource};
