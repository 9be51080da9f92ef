//! Driver for FT800/FT81x display coprocessors
//!
//! Builds on the traits in `clcd-core` and `clcd-hal`:
//!
//! - SPI register transport with scoped chip select
//! - Command FIFO backends (host-managed ring, streaming port)
//! - Command processor sessions with the full widget command set
//! - Display-list cache in graphics RAM
//! - Sound synthesiser control
//! - Panel bring-up, backlight and touch calibration registers
//! - UI driver loop: touch tracking, idle callbacks, screen dispatch
//!
//! ```text
//! Ui ──▶ Navigator ──▶ Screen callbacks
//!  │                        │
//!  ▼                        ▼
//! Lcd ──▶ CommandProcessor / DlCache ──▶ FifoBackend ──▶ SpiInterface
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod cmd;
pub mod dlcache;
pub mod fifo;
pub mod lcd;
pub mod sound;
pub mod spi;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use cmd::CommandProcessor;
pub use dlcache::DlCache;
pub use fifo::{FifoBackend, SoftwareRing, StreamingRing};
pub use lcd::Lcd;
pub use sound::SoundPlayer;
pub use spi::SpiInterface;
pub use ui::Ui;
