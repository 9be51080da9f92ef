//! SPI bus abstractions
//!
//! Provides traits for SPI master operations that can be implemented
//! by chip-specific HALs.

/// SPI bus master
///
/// Provides basic SPI transfer operations for communicating with
/// peripheral devices. Chip select is not part of the bus; the driver
/// drives it through a separate [`crate::OutputPin`].
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Transfer data (simultaneous read/write)
    ///
    /// Writes data from `write` buffer while reading into `read` buffer.
    /// Both buffers must be the same length.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error>;

    /// Write data without reading
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data (writes zeros)
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Change the bus clock
    ///
    /// Buses running at a fixed clock keep the default, which does nothing.
    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        let _ = hz;
        Ok(())
    }
}

/// Bus clock used until the coprocessor reports its device id
///
/// The chip only accepts up to 11 MHz while running from the internal
/// oscillator.
pub const STARTUP_FREQUENCY_HZ: u32 = 8_000_000;

/// Bus clock used once the coprocessor is running from its PLL
pub const RUNTIME_FREQUENCY_HZ: u32 = 20_000_000;
