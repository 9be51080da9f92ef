//! Host commands
//!
//! Host commands bypass the memory space and control clocking and power.
//! They are three bytes long, the first byte carrying `01` in its top
//! bits for every command except `ACTIVE`.

/// Power and clock control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HostCommand {
    /// Switch from standby/sleep to active mode
    Active = 0x00,
    /// Oscillator and PLL on, system clock off
    Standby = 0x41,
    /// Oscillator and PLL off
    Sleep = 0x42,
    /// Power down the core
    PowerDown = 0x50,
    /// Use the external crystal
    ClockExternal = 0x44,
    /// Use the internal oscillator
    ClockInternal = 0x48,
    /// Select the system clock multiplier (FT81x)
    ClockSelect = 0x61,
    /// Reset the core
    CoreReset = 0x68,
}

impl HostCommand {
    /// Encode the 3-byte frame with parameter `param`
    pub const fn frame(self, param: u8) -> [u8; 3] {
        let cmd = self as u8;
        let first = if cmd == 0 { 0 } else { cmd | 0x40 };
        [first, param, 0x00]
    }
}
