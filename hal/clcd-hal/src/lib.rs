//! clcd Hardware Abstraction Layer
//!
//! This crate defines the few hardware traits the display driver needs:
//! an SPI master, a chip-select/power-down output pin and a millisecond
//! clock. Boards either implement them directly or wrap their
//! `embedded-hal` 1.0 peripherals with the adapters in [`adapter`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  clcd-drivers (register access, UI)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  clcd-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ board HAL     │       │ embedded-hal  │
//! │ (direct impl) │       │   adapters    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (chip select, power down)
//! - [`spi::SpiBus`] - SPI bus operations
//! - [`time::Clock`] - Monotonic millisecond counter

#![no_std]
#![deny(unsafe_code)]

pub mod adapter;
pub mod gpio;
pub mod spi;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use spi::SpiBus;
pub use time::Clock;
