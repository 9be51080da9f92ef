//! Board-agnostic core logic for the touchscreen driver
//!
//! This crate contains the parts of the driver that do not touch a bus:
//!
//! - The register access trait implemented by the SPI transport
//! - Command ring arithmetic for the host-managed FIFO
//! - Touch press debounce state machine
//! - Screen navigation stack and callback contract
//! - Millisecond timers
//! - Configuration and touch calibration types

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod fifo;
pub mod nav;
pub mod timer;
pub mod touch;
pub mod traits;
