//! Command FIFO backends
//!
//! Both chip generations accept the same command stream but differ in who
//! owns the ring's write pointer:
//!
//! | Backend            | Chips        | Write pointer | `start` / `execute`  |
//! |--------------------|--------------|---------------|----------------------|
//! | [`SoftwareRing`]   | FT800, FT81x | host          | sync / publish       |
//! | [`StreamingRing`]  | FT81x        | device        | no-op                |
//!
//! Every `write` pads the command to a 4-byte boundary with zeros.

mod software;
mod streaming;

pub use software::SoftwareRing;
pub use streaming::StreamingRing;

use clcd_core::traits::RegisterAccess;
use clcd_protocol::memory::CMD_RING_MASK;
use clcd_protocol::{padded_len, MemoryMap};
use heapless::Vec;

/// Largest single ring transfer
///
/// Also the step in which commands larger than the ring are streamed, so
/// each step fits once the coprocessor has drained half the ring.
pub const MAX_TRANSFER: usize = 2048;

/// Source slices handed to one bus transaction
const MAX_PARTS: usize = 4;

/// A command FIFO implementation
pub trait FifoBackend {
    /// Prepare for a burst of commands
    fn start<R: RegisterAccess>(&mut self, regs: &mut R) -> Result<(), R::Error>;

    /// Queue `chunks` back to back as one command, zero padded to 4 bytes
    ///
    /// Blocks until the ring has room.
    fn write<R: RegisterAccess>(&mut self, regs: &mut R, chunks: &[&[u8]])
        -> Result<(), R::Error>;

    /// Make everything written so far visible to the coprocessor
    fn execute<R: RegisterAccess>(&mut self, regs: &mut R) -> Result<(), R::Error>;

    /// Hold the coprocessor in reset while both ring pointers are cleared
    fn reset<R: RegisterAccess>(&mut self, regs: &mut R) -> Result<(), R::Error>;
}

/// Ring registers shared by both backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct RingRegs {
    pub ram_cmd: u32,
    pub cmd_read: u32,
    pub cmd_write: u32,
    pub cpureset: u32,
}

impl RingRegs {
    pub fn new(map: &MemoryMap) -> Self {
        Self {
            ram_cmd: map.ram_cmd,
            cmd_read: map.reg_cmd_read,
            cmd_write: map.reg_cmd_write,
            cpureset: map.reg_cpureset,
        }
    }

    pub fn read_pointer<R: RegisterAccess>(&self, regs: &mut R) -> Result<u16, R::Error> {
        Ok((regs.read32(self.cmd_read)? & CMD_RING_MASK) as u16)
    }

    pub fn write_pointer<R: RegisterAccess>(&self, regs: &mut R) -> Result<u16, R::Error> {
        Ok((regs.read32(self.cmd_write)? & CMD_RING_MASK) as u16)
    }

    pub fn reset<R: RegisterAccess>(&self, regs: &mut R) -> Result<(), R::Error> {
        regs.write8(self.cpureset, 1)?;
        regs.write32(self.cmd_write, 0)?;
        regs.write32(self.cmd_read, 0)?;
        regs.write8(self.cpureset, 0)
    }
}

/// Source chunks of one command followed by implicit zero padding
pub(crate) struct Payload<'a> {
    chunks: &'a [&'a [u8]],
    data_len: usize,
}

impl<'a> Payload<'a> {
    pub fn new(chunks: &'a [&'a [u8]]) -> Self {
        let data_len = chunks.iter().map(|c| c.len()).sum();
        Self { chunks, data_len }
    }

    /// Length including padding
    pub fn padded_len(&self) -> usize {
        padded_len(self.data_len)
    }

    /// Emit bytes `start..start + len` of the padded payload
    ///
    /// `emit(parts, offset, padding)` is called once per bus transaction,
    /// `offset` being the payload position of the first part. Padding only
    /// ever ends the final transaction.
    pub fn emit<E>(
        &self,
        start: usize,
        len: usize,
        mut emit: impl FnMut(&[&[u8]], usize, usize) -> Result<(), E>,
    ) -> Result<(), E> {
        let end = start + len;
        let data_end = end.min(self.data_len);

        let mut parts: Vec<&[u8], MAX_PARTS> = Vec::new();
        let mut batch_offset = start;
        let mut cursor = start;
        let mut pos = 0;

        for chunk in self.chunks.iter().filter(|c| !c.is_empty()) {
            let chunk_start = pos;
            pos += chunk.len();
            if pos <= start || chunk_start >= data_end {
                continue;
            }
            let lo = start.max(chunk_start) - chunk_start;
            let hi = data_end.min(pos) - chunk_start;
            let piece = &chunk[lo..hi];

            if let Err(piece) = parts.push(piece) {
                emit(&parts, batch_offset, 0)?;
                parts.clear();
                batch_offset = cursor;
                let _ = parts.push(piece);
            }
            cursor += piece.len();
        }

        let padding = end - data_end.max(start);
        emit(&parts, batch_offset, padding)
    }
}
