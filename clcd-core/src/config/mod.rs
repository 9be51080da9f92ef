//! Configuration types
//!
//! Board-agnostic configuration structures. Touch calibration is stored as
//! postcard binary data by an external settings store.

pub mod calibration;
pub mod types;

pub use calibration::*;
pub use types::*;
