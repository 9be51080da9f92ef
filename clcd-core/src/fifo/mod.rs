//! Command FIFO bookkeeping
//!
//! The bus-facing backends live in `clcd-drivers`; this module holds the
//! cursor arithmetic they share so it can be tested without a device.

pub mod ring;

pub use ring::{fits, free_space, split, RingCursor, RING_CAPACITY, RING_SIZE};
