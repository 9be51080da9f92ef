//! Touch calibration data
//!
//! The six touch transform registers map raw touch coordinates to screen
//! pixels. Their values come from `CMD_CALIBRATE` and are persisted by an
//! external settings store using postcard.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magic number to identify valid calibration data
pub const TOUCH_CALIBRATION_MAGIC: u32 = 0x5443_414C; // "TCAL"

/// Current calibration data version
pub const TOUCH_CALIBRATION_VERSION: u8 = 1;

/// Largest postcard encoding of [`TouchCalibration`]
pub const TOUCH_CALIBRATION_MAX_SIZE: usize = 5 + 1 + 6 * 5 + 5;

/// Calibration encode/decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Output buffer too small
    BufferTooSmall,
    /// Bytes are not a calibration record
    Malformed,
    /// Magic or version mismatch
    WrongVersion,
    /// Stored checksum does not match the transform
    BadChecksum,
}

/// Touch transform matrix coefficients A..F
///
/// Fixed-point values exactly as held by `REG_TOUCH_TRANSFORM_A..F`.
pub type TouchTransform = [u32; 6];

/// Default transform for 480x272 panels
pub const DEFAULT_TRANSFORM_480X272: TouchTransform = [
    0x0000_8100,
    0x0000_0000,
    0xFFF1_8000,
    0x0000_0000,
    0xFFFF_B100,
    0x0120_D000,
];

/// Default transform for 800x480 panels
pub const DEFAULT_TRANSFORM_800X480: TouchTransform = [
    0x0000_D8B9,
    0x0000_0124,
    0xFFE2_3926,
    0xFFFF_FF51,
    0xFFFF_7E4F,
    0x01F0_AF70,
];

/// Persisted touch calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TouchCalibration {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Transform register values
    pub transform: TouchTransform,
    /// CRC32 over magic, version and transform
    pub crc: u32,
}

impl TouchCalibration {
    /// Wrap a transform read back from the chip
    pub fn new(transform: TouchTransform) -> Self {
        let mut cal = Self {
            magic: TOUCH_CALIBRATION_MAGIC,
            version: TOUCH_CALIBRATION_VERSION,
            transform,
            crc: 0,
        };
        cal.crc = cal.calculate_crc();
        cal
    }

    /// Check magic, version and checksum
    pub fn is_valid(&self) -> bool {
        self.magic == TOUCH_CALIBRATION_MAGIC
            && self.version == TOUCH_CALIBRATION_VERSION
            && self.crc == self.calculate_crc()
    }

    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        for word in &self.transform {
            crc = crc32_update(crc, &word.to_le_bytes());
        }
        !crc
    }

    /// Serialize into `buf`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], CalibrationError> {
        postcard::to_slice(self, buf).map_err(|_| CalibrationError::BufferTooSmall)
    }

    /// Deserialize and validate a stored record
    #[cfg(feature = "serde")]
    pub fn decode(bytes: &[u8]) -> Result<Self, CalibrationError> {
        let cal: Self = postcard::from_bytes(bytes).map_err(|_| CalibrationError::Malformed)?;
        if cal.magic != TOUCH_CALIBRATION_MAGIC || cal.version != TOUCH_CALIBRATION_VERSION {
            return Err(CalibrationError::WrongVersion);
        }
        if cal.crc != cal.calculate_crc() {
            return Err(CalibrationError::BadChecksum);
        }
        Ok(cal)
    }
}

/// CRC32 update (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
