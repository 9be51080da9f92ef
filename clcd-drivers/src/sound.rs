//! Sound synthesiser

use clcd_core::traits::RegisterAccess;
use clcd_protocol::{Effect, MemoryMap};

/// Plays the chip's built-in effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoundPlayer {
    reg_volume: u32,
    reg_sound: u32,
    reg_play: u32,
}

impl SoundPlayer {
    pub fn new(map: &MemoryMap) -> Self {
        Self {
            reg_volume: map.reg_vol_sound,
            reg_sound: map.reg_sound,
            reg_play: map.reg_play,
        }
    }

    pub fn set_volume<R: RegisterAccess>(&self, regs: &mut R, volume: u8) -> Result<(), R::Error> {
        regs.write8(self.reg_volume, volume)
    }

    /// Start `effect` at MIDI `note`, cutting off whatever is playing
    pub fn play<R: RegisterAccess>(
        &self,
        regs: &mut R,
        effect: Effect,
        note: u8,
    ) -> Result<(), R::Error> {
        regs.write16(self.reg_sound, effect.register_value(note))?;
        regs.write8(self.reg_play, 1)
    }

    pub fn is_playing<R: RegisterAccess>(&self, regs: &mut R) -> Result<bool, R::Error> {
        Ok(regs.read8(self.reg_play)? & 1 != 0)
    }
}
