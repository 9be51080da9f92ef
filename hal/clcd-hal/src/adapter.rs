//! Adapters from `embedded-hal` 1.0 peripherals
//!
//! Most board support crates expose `embedded_hal::spi::SpiBus` and
//! `embedded_hal::digital::OutputPin`. These thin wrappers let them be
//! handed straight to the driver.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin as EhOutputPin;
use embedded_hal::spi::SpiBus as EhSpiBus;

use crate::gpio::OutputPin;
use crate::spi::SpiBus;

/// Wraps an `embedded-hal` SPI bus
///
/// Every operation is flushed before returning so that chip select can be
/// released as soon as the call completes.
pub struct EhSpi<T>(pub T);

impl<T: EhSpiBus<u8>> SpiBus for EhSpi<T> {
    type Error = T::Error;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.0.transfer(read, write)?;
        self.0.flush()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write(data)?;
        self.0.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.0.read(buf)?;
        self.0.flush()
    }
}

/// Wraps an infallible `embedded-hal` output pin
///
/// The last written level is remembered so [`OutputPin::is_set_high`]
/// can be answered through a shared reference.
pub struct EhPin<T> {
    pin: T,
    high: bool,
}

impl<T: EhOutputPin<Error = Infallible>> EhPin<T> {
    /// Wrap `pin`, driving it to `initial_high`
    pub fn new(mut pin: T, initial_high: bool) -> Self {
        let result = if initial_high {
            pin.set_high()
        } else {
            pin.set_low()
        };
        result.unwrap_or(());
        Self {
            pin,
            high: initial_high,
        }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> T {
        self.pin
    }
}

impl<T: EhOutputPin<Error = Infallible>> OutputPin for EhPin<T> {
    fn set_high(&mut self) {
        self.pin.set_high().unwrap_or(());
        self.high = true;
    }

    fn set_low(&mut self) {
        self.pin.set_low().unwrap_or(());
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
