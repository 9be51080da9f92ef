//! Screen navigation
//!
//! Screens are a closed set of `Copy` values implementing [`Screen`]. The
//! [`Navigator`] tracks the active screen and a bounded history stack and
//! dispatches lifecycle and touch callbacks into the active screen.

pub mod screen;
pub mod stack;

pub use screen::{NavContext, Navigator, Screen, SCREEN_NOT_FOUND};
pub use stack::{ScreenStack, STACK_DEPTH};
