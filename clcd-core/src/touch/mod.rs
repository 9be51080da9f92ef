//! Touch press tracking
//!
//! Turns the polled tag register into press, hold and release events.
//! The state machine is explicit, finite, and deterministic.

pub mod machine;

pub use machine::{Feedback, PressState, TouchHandler, TouchTracker, NO_TAG};
