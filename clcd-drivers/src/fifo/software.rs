//! Host-managed command ring
//!
//! The host keeps its own copy of the write pointer, copies commands into
//! `RAM_CMD` and publishes the pointer on `execute`. Writes crossing the end
//! of the ring wrap to offset 0.
//!
//! A command larger than the whole ring cannot wait for space in one go.
//! It is streamed instead: the pending batch is published, then each
//! piece is published as soon as it is queued so the coprocessor can keep
//! draining.

use clcd_core::fifo::{fits, split, RingCursor, RING_CAPACITY};
use clcd_core::traits::RegisterAccess;
use clcd_protocol::MemoryMap;

use super::{FifoBackend, Payload, RingRegs, MAX_TRANSFER};

/// Command FIFO with a host-side write cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftwareRing {
    regs: RingRegs,
    cursor: RingCursor,
}

impl SoftwareRing {
    pub fn new(map: &MemoryMap) -> Self {
        Self {
            regs: RingRegs::new(map),
            cursor: RingCursor::unsynced(),
        }
    }

    /// Host copy of the write pointer
    pub fn cursor(&self) -> RingCursor {
        self.cursor
    }

    fn synced_cursor<R: RegisterAccess>(&mut self, regs: &mut R) -> Result<u16, R::Error> {
        match self.cursor.get() {
            Some(write) => Ok(write),
            None => {
                let write = self.regs.write_pointer(regs)?;
                self.cursor.sync(write as u32);
                Ok(write)
            }
        }
    }

    /// Spin until `len` bytes fit ahead of the coprocessor's read pointer
    fn wait_for_space<R: RegisterAccess>(
        &self,
        regs: &mut R,
        write: u16,
        len: u16,
    ) -> Result<(), R::Error> {
        loop {
            let read = self.regs.read_pointer(regs)?;
            if fits(write, read, len) {
                return Ok(());
            }
        }
    }

    /// Copy `len` payload bytes from `offset` to the ring at `write`,
    /// wrapping at the ring end
    fn transfer<R: RegisterAccess>(
        &self,
        regs: &mut R,
        payload: &Payload<'_>,
        offset: usize,
        write: u16,
        len: usize,
    ) -> Result<(), R::Error> {
        let ram_cmd = self.regs.ram_cmd;
        let (tail, head) = split(write, len as u16);
        let (tail, head) = (tail as usize, head as usize);
        payload.emit(offset, tail, |parts, at, padding| {
            let addr = ram_cmd + write as u32 + (at - offset) as u32;
            regs.write_chunks(addr, parts, padding)
        })?;
        if head > 0 {
            let wrapped = offset + tail;
            payload.emit(wrapped, head, |parts, at, padding| {
                regs.write_chunks(ram_cmd + (at - wrapped) as u32, parts, padding)
            })?;
        }
        Ok(())
    }
}

impl FifoBackend for SoftwareRing {
    fn start<R: RegisterAccess>(&mut self, regs: &mut R) -> Result<(), R::Error> {
        self.synced_cursor(regs).map(|_| ())
    }

    fn write<R: RegisterAccess>(
        &mut self,
        regs: &mut R,
        chunks: &[&[u8]],
    ) -> Result<(), R::Error> {
        let payload = Payload::new(chunks);
        let total = payload.padded_len();
        let streamed = total > RING_CAPACITY as usize;

        let write = self.synced_cursor(regs)?;
        if streamed {
            #[cfg(feature = "defmt")]
            defmt::trace!("Streaming {} byte command through the ring", total);
            regs.write32(self.regs.cmd_write, write as u32)?;
        } else {
            self.wait_for_space(regs, write, total as u16)?;
        }

        let mut done = 0;
        while done < total {
            let len = (total - done).min(MAX_TRANSFER);
            let write = self.synced_cursor(regs)?;
            if streamed {
                self.wait_for_space(regs, write, len as u16)?;
            }
            self.transfer(regs, &payload, done, write, len)?;
            self.cursor.advance(len as u16);
            if streamed {
                self.execute(regs)?;
            }
            done += len;
        }
        Ok(())
    }

    fn execute<R: RegisterAccess>(&mut self, regs: &mut R) -> Result<(), R::Error> {
        match self.cursor.get() {
            Some(write) => regs.write32(self.regs.cmd_write, write as u32),
            None => Ok(()),
        }
    }

    fn reset<R: RegisterAccess>(&mut self, regs: &mut R) -> Result<(), R::Error> {
        self.regs.reset(regs)?;
        self.cursor.invalidate();
        Ok(())
    }
}
