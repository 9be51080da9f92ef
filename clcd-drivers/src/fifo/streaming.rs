//! Device-managed command ring (FT81x)
//!
//! Commands are written to `REG_CMDB_WRITE`; the chip appends them to the
//! ring and advances its own write pointer, so there is nothing to publish.

use clcd_core::traits::RegisterAccess;
use clcd_protocol::memory::CMD_RING_MASK;
use clcd_protocol::MemoryMap;

use super::{FifoBackend, Payload, RingRegs, MAX_TRANSFER};

/// Command FIFO backed by the streaming port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamingRing {
    regs: RingRegs,
    space: u32,
    port: u32,
}

impl StreamingRing {
    /// `None` on chips without a streaming port
    pub fn new(map: &MemoryMap) -> Option<Self> {
        Some(Self {
            regs: RingRegs::new(map),
            space: map.reg_cmdb_space?,
            port: map.reg_cmdb_write?,
        })
    }

    /// Spin until the chip reports room for `len` bytes
    fn wait_for_space<R: RegisterAccess>(&self, regs: &mut R, len: usize) -> Result<(), R::Error> {
        #[cfg(feature = "defmt")]
        let mut logged = false;
        loop {
            let space = (regs.read32(self.space)? & CMD_RING_MASK) as usize;
            if space >= len {
                return Ok(());
            }
            #[cfg(feature = "defmt")]
            if !logged {
                defmt::trace!("Command ring full, space={} need={}", space, len);
                logged = true;
            }
        }
    }
}

impl FifoBackend for StreamingRing {
    fn start<R: RegisterAccess>(&mut self, _regs: &mut R) -> Result<(), R::Error> {
        Ok(())
    }

    fn write<R: RegisterAccess>(
        &mut self,
        regs: &mut R,
        chunks: &[&[u8]],
    ) -> Result<(), R::Error> {
        let payload = Payload::new(chunks);
        let total = payload.padded_len();
        let port = self.port;

        let mut done = 0;
        while done < total {
            let len = (total - done).min(MAX_TRANSFER);
            self.wait_for_space(regs, len)?;
            payload.emit(done, len, |parts, _, padding| {
                regs.write_chunks(port, parts, padding)
            })?;
            done += len;
        }
        Ok(())
    }

    fn execute<R: RegisterAccess>(&mut self, _regs: &mut R) -> Result<(), R::Error> {
        Ok(())
    }

    fn reset<R: RegisterAccess>(&mut self, regs: &mut R) -> Result<(), R::Error> {
        self.regs.reset(regs)
    }
}
