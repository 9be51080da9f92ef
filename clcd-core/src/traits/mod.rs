//! Hardware abstraction traits
//!
//! These traits define the interface between the driver logic and the
//! bus-specific implementation in `clcd-drivers`.

pub mod register;

pub use register::RegisterAccess;
