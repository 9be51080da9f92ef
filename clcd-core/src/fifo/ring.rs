//! Host-managed command ring arithmetic
//!
//! On the FT800 the host owns the write pointer of the 4 KiB command ring
//! and the coprocessor owns the read pointer:
//!
//! ```text
//!  0                 read               write               4096
//!  ├─── head free ────┼──── pending ──────┼──── tail free ────┤
//! ```
//!
//! A write that does not fit in the tail wraps and continues at offset 0,
//! so every write lands in at most two physical transfers. The writer never
//! lands on the read pointer: equal pointers mean "empty".

/// Ring size in bytes
pub const RING_SIZE: u16 = 4096;

/// Most bytes that can be queued at once
pub const RING_CAPACITY: u16 = RING_SIZE - 4;

/// Tail space up to the reader or the ring end, plus head space from
/// offset 0 when the reader is at or behind the writer
///
/// Both cursors must already be masked to the ring size.
pub const fn free_space(write: u16, read: u16) -> u16 {
    let (tail, head) = if read <= write {
        (RING_SIZE - write, read)
    } else {
        (read - write, 0)
    };
    tail + head
}

/// Whether `len` more bytes can be queued at `write` without the write
/// pointer catching up with `read`
pub const fn fits(write: u16, read: u16, len: u16) -> bool {
    len < free_space(write, read)
}

/// Split a `len` byte write at `write` into `(tail, head)` lengths
///
/// `tail` bytes go at `write`, `head` bytes wrap to offset 0.
pub const fn split(write: u16, len: u16) -> (u16, u16) {
    let room = RING_SIZE - write;
    if len <= room {
        (len, 0)
    } else {
        (room, len - room)
    }
}

/// Host copy of the ring write pointer
///
/// `None` until synchronised with the device's write register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingCursor(Option<u16>);

impl RingCursor {
    /// An unsynchronised cursor
    pub const fn unsynced() -> Self {
        Self(None)
    }

    /// Adopt the device's write pointer
    pub fn sync(&mut self, device_write: u32) {
        self.0 = Some((device_write & (RING_SIZE as u32 - 1)) as u16);
    }

    /// Forget the position, forcing a resync on next use
    pub fn invalidate(&mut self) {
        self.0 = None;
    }

    pub const fn get(&self) -> Option<u16> {
        self.0
    }

    pub const fn is_synced(&self) -> bool {
        self.0.is_some()
    }

    /// Move past `len` transferred bytes
    ///
    /// Does nothing while unsynchronised.
    pub fn advance(&mut self, len: u16) {
        if let Some(write) = self.0 {
            self.0 = Some(((write as u32 + len as u32) % RING_SIZE as u32) as u16);
        }
    }
}
