//! FT800/FT81x coprocessor wire encoding
//!
//! This crate defines everything that ends up as bytes on the SPI bus:
//! memory maps for both chip generations, host commands, coprocessor
//! command records and raw display-list words. It performs no I/O.
//!
//! # Transfer framing
//!
//! ```text
//! read:   ┌──────────────┬─────────┬────────┬───────┬─────────────┐
//!         │ 00 A[21:16]  │ A[15:8] │ A[7:0] │ dummy │ data (LE)…  │
//!         └──────────────┴─────────┴────────┴───────┴─────────────┘
//! write:  ┌──────────────┬─────────┬────────┬─────────────┐
//!         │ 10 A[21:16]  │ A[15:8] │ A[7:0] │ data (LE)…  │
//!         └──────────────┴─────────┴────────┴─────────────┘
//! host:   ┌──────────────┬─────────┬────┐
//!         │ 01 CMD[5:0]  │ param   │ 00 │
//!         └──────────────┴─────────┴────┘
//! ```
//!
//! Every coprocessor command is a little-endian 32-bit opcode, optionally
//! followed by packed parameters, padded with zeros to a 4-byte boundary.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod display_list;
pub mod host;
pub mod memory;
pub mod sound;

pub use command::{padded_len, padding, Record, MAX_RECORD_SIZE};
pub use host::HostCommand;
pub use memory::{Chip, MemoryMap, CMD_RING_SIZE};
pub use sound::Effect;

/// Encode the 4-byte header of a memory read at `addr`
pub const fn read_header(addr: u32) -> [u8; 4] {
    [
        ((addr >> 16) & 0x3F) as u8,
        (addr >> 8) as u8,
        addr as u8,
        0x00,
    ]
}

/// Encode the 3-byte header of a memory write at `addr`
pub const fn write_header(addr: u32) -> [u8; 3] {
    [
        ((addr >> 16) & 0x3F) as u8 | 0x80,
        (addr >> 8) as u8,
        addr as u8,
    ]
}
