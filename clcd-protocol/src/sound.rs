//! Built-in sound synthesiser effects

/// MIDI note number for middle C
pub const MIDDLE_C: u8 = 60;

/// Effect codes understood by `REG_SOUND`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Effect {
    Silence = 0x00,
    SquareWave = 0x01,
    SineWave = 0x02,
    SawtoothWave = 0x03,
    TriangleWave = 0x04,
    Beeping = 0x05,
    Alarm = 0x06,
    Warble = 0x07,
    Carousel = 0x08,
    Harp = 0x40,
    Xylophone = 0x41,
    Tuba = 0x42,
    Glockenspiel = 0x43,
    Organ = 0x44,
    Trumpet = 0x45,
    Piano = 0x46,
    Chimes = 0x47,
    MusicBox = 0x48,
    Bell = 0x49,
    Click = 0x50,
    Switch = 0x51,
    Cowbell = 0x52,
    Notch = 0x53,
    Hihat = 0x54,
    Kickdrum = 0x55,
    Pop = 0x56,
    Clack = 0x57,
    Chack = 0x58,
    Mute = 0x60,
    Unmute = 0x61,
}

impl Effect {
    /// `REG_SOUND` value playing this effect at MIDI `note`
    ///
    /// Percussive effects ignore the note.
    pub const fn register_value(self, note: u8) -> u16 {
        ((note as u16) << 8) | self as u16
    }
}
