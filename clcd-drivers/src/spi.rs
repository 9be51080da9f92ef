//! SPI register transport
//!
//! Every access is one chip-select window:
//!
//! ```text
//! CS  ‾‾\____________________________________/‾‾
//!        header (3 or 4 bytes)  payload…  padding
//! ```
//!
//! Chip select is held by a guard that releases it on every exit path,
//! including bus errors propagated with `?`.

use clcd_core::traits::RegisterAccess;
use clcd_hal::{OutputPin, SpiBus};
use clcd_protocol::{read_header, write_header, HostCommand};

/// Zero bytes sent per bus call when padding
const PAD_CHUNK: usize = 16;

/// Asserted (low) chip select, released on drop
struct ChipSelect<'a, CS: OutputPin>(&'a mut CS);

impl<'a, CS: OutputPin> ChipSelect<'a, CS> {
    fn assert(cs: &'a mut CS) -> Self {
        cs.set_low();
        Self(cs)
    }
}

impl<CS: OutputPin> Drop for ChipSelect<'_, CS> {
    fn drop(&mut self) {
        self.0.set_high();
    }
}

/// Register access over an SPI bus and a chip-select pin
pub struct SpiInterface<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI: SpiBus, CS: OutputPin> SpiInterface<SPI, CS> {
    /// Take ownership of the bus and chip select, deselecting the chip
    pub fn new(spi: SPI, mut cs: CS) -> Self {
        cs.set_high();
        Self { spi, cs }
    }

    /// Release the bus and pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI: SpiBus, CS: OutputPin> RegisterAccess for SpiInterface<SPI, CS> {
    type Error = SPI::Error;

    fn read_bulk(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        let _cs = ChipSelect::assert(&mut self.cs);
        self.spi.write(&read_header(addr))?;
        self.spi.read(buf)
    }

    fn write_chunks(
        &mut self,
        addr: u32,
        chunks: &[&[u8]],
        padding: usize,
    ) -> Result<(), Self::Error> {
        let _cs = ChipSelect::assert(&mut self.cs);
        self.spi.write(&write_header(addr))?;
        for chunk in chunks.iter().filter(|c| !c.is_empty()) {
            self.spi.write(chunk)?;
        }

        let zeros = [0u8; PAD_CHUNK];
        let mut remaining = padding;
        while remaining > 0 {
            let n = remaining.min(PAD_CHUNK);
            self.spi.write(&zeros[..n])?;
            remaining -= n;
        }
        Ok(())
    }

    fn host_command(&mut self, cmd: HostCommand, param: u8) -> Result<(), Self::Error> {
        let _cs = ChipSelect::assert(&mut self.cs);
        self.spi.write(&cmd.frame(param))
    }

    fn set_bus_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        self.spi.set_frequency(hz)
    }
}
