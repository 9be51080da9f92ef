//! Configuration type definitions
//!
//! Panel timings, orientation, UI timing and the display-list cache layout.
//! All types have `const` presets so boards can build them at compile time.

use clcd_protocol::Effect;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of one cache slot record (address + size)
pub const CACHE_SLOT_SIZE: u32 = 8;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Visible area or sync pulse does not fit in the line/frame cycle
    InvalidTiming,
    /// Pixel clock divisor of zero disables the panel
    InvalidPixelClock,
    /// Cache region cannot hold its slot table
    CacheTooSmall,
    /// Cache region extends past graphics RAM
    CacheOutOfRange,
    /// Touch repeat rate of zero
    InvalidRepeatRate,
}

/// LCD panel timing parameters
///
/// Values are in pixel clocks (horizontal) and lines (vertical), as written
/// to the `REG_H*`/`REG_V*` registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayTimings {
    pub hsize: u16,
    pub vsize: u16,
    pub hcycle: u16,
    pub hoffset: u16,
    pub hsync0: u16,
    pub hsync1: u16,
    pub vcycle: u16,
    pub voffset: u16,
    pub vsync0: u16,
    pub vsync1: u16,
    /// System clock divisor; 0 stops the pixel clock
    pub pclk: u8,
    /// 1 = data changes on the falling edge
    pub pclk_pol: u8,
    pub swizzle: u8,
    pub cspread: u8,
}

impl DisplayTimings {
    /// 4.3" 480x272 panels (FT800 modules)
    pub const WQVGA_480X272: Self = Self {
        hsize: 480,
        vsize: 272,
        hcycle: 548,
        hoffset: 43,
        hsync0: 0,
        hsync1: 41,
        vcycle: 292,
        voffset: 12,
        vsync0: 0,
        vsync1: 10,
        pclk: 5,
        pclk_pol: 1,
        swizzle: 0,
        cspread: 1,
    };

    /// 5" and 7" 800x480 panels (FT81x modules)
    pub const WVGA_800X480: Self = Self {
        hsize: 800,
        vsize: 480,
        hcycle: 928,
        hoffset: 88,
        hsync0: 0,
        hsync1: 48,
        vcycle: 525,
        voffset: 32,
        vsync0: 0,
        vsync1: 3,
        pclk: 2,
        pclk_pol: 1,
        swizzle: 0,
        cspread: 0,
    };

    /// Check that the visible area and sync pulses fit their cycles
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pclk == 0 {
            return Err(ConfigError::InvalidPixelClock);
        }
        let h_ok = self.hoffset as u32 + self.hsize as u32 <= self.hcycle as u32
            && self.hsync0 <= self.hsync1
            && self.hsync1 <= self.hoffset;
        let v_ok = self.voffset as u32 + self.vsize as u32 <= self.vcycle as u32
            && self.vsync0 <= self.vsync1
            && self.vsync1 <= self.voffset;
        if h_ok && v_ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidTiming)
        }
    }
}

impl Default for DisplayTimings {
    fn default() -> Self {
        Self::WQVGA_480X272
    }
}

/// Panel mounting orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orientation {
    pub portrait: bool,
    /// Rotated by 180 degrees
    pub inverted: bool,
    pub mirrored: bool,
}

impl Orientation {
    pub const LANDSCAPE: Self = Self {
        portrait: false,
        inverted: false,
        mirrored: false,
    };

    /// `CMD_SETROTATE` argument (FT81x)
    pub const fn rotation(&self) -> u32 {
        (self.mirrored as u32) << 2 | (self.portrait as u32) << 1 | self.inverted as u32
    }

    /// `REG_ROTATE` value (FT800 supports inversion only)
    pub const fn register_value(&self) -> u8 {
        self.inverted as u8
    }
}

/// Display-list cache placement in graphics RAM
///
/// The cache occupies the last `region_size` bytes of RAM_G:
///
/// ```text
/// ┌──────────────────────┬──────────┬──────────────────────────┐
/// │ slots × (addr, size) │ free ptr │ arena ...                │
/// └──────────────────────┴──────────┴──────────────────────────┘
/// ^ base                                             RAM_G end ^
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CacheLayout {
    /// Number of slot records
    pub slots: u16,
    /// Bytes reserved at the end of RAM_G
    pub region_size: u32,
}

impl Default for CacheLayout {
    fn default() -> Self {
        Self {
            slots: 250,
            region_size: 0x1_0000,
        }
    }
}

impl CacheLayout {
    /// First byte of the slot table
    pub const fn base(&self, ram_g_end: u32) -> u32 {
        ram_g_end - self.region_size
    }

    /// Address of slot `slot`'s record
    pub const fn slot_addr(&self, ram_g_end: u32, slot: u16) -> u32 {
        self.base(ram_g_end) + slot as u32 * CACHE_SLOT_SIZE
    }

    /// Address of the free-space pointer
    pub const fn free_ptr_addr(&self, ram_g_end: u32) -> u32 {
        self.slot_addr(ram_g_end, self.slots)
    }

    /// First byte of the arena
    pub const fn arena_start(&self, ram_g_end: u32) -> u32 {
        self.free_ptr_addr(ram_g_end) + 4
    }

    /// Check the layout against a graphics RAM of `ram_g_size` bytes
    pub fn validate(&self, ram_g_size: u32) -> Result<(), ConfigError> {
        if self.region_size > ram_g_size {
            return Err(ConfigError::CacheOutOfRange);
        }
        if self.slots as u32 * CACHE_SLOT_SIZE + 4 >= self.region_size {
            return Err(ConfigError::CacheTooSmall);
        }
        Ok(())
    }
}

/// Touch and redraw timing, plus feedback sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UiConfig {
    /// Quiet time required after a release
    pub debounce_ms: u32,
    /// Held buttons repeat this many times per second
    pub repeats_per_second: u8,
    /// Interval between `on_idle` calls
    pub idle_interval_ms: u32,
    /// Synthesiser volume
    pub volume: u8,
    pub press_sound: Effect,
    pub repeat_sound: Effect,
    pub unpress_sound: Effect,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            repeats_per_second: 4,
            idle_interval_ms: 1000,
            volume: 255,
            press_sound: Effect::Chack,
            repeat_sound: Effect::Chack,
            unpress_sound: Effect::Pop,
        }
    }
}

impl UiConfig {
    /// Interval between touch-held callbacks
    pub const fn repeat_interval_ms(&self) -> u32 {
        if self.repeats_per_second == 0 {
            u32::MAX
        } else {
            1000 / self.repeats_per_second as u32
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeats_per_second == 0 {
            return Err(ConfigError::InvalidRepeatRate);
        }
        Ok(())
    }
}

/// Display bring-up parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LcdConfig {
    pub timings: DisplayTimings,
    pub orientation: Orientation,
    /// Touch resistance threshold (`REG_TOUCH_RZTHRESH`)
    pub touch_threshold: u16,
    /// Log when the coprocessor has not drained after this long
    ///
    /// Diagnostic only: waiting continues regardless.
    pub idle_warn_ms: Option<u32>,
    /// Drive the external clock input instead of the internal oscillator
    pub external_clock: bool,
    /// Display-list cache placement in graphics RAM
    pub cache: CacheLayout,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            timings: DisplayTimings::default(),
            orientation: Orientation::LANDSCAPE,
            touch_threshold: 2000,
            idle_warn_ms: Some(3),
            external_clock: true,
            cache: CacheLayout::default(),
        }
    }
}

impl LcdConfig {
    /// Check timings and cache layout for a chip with `ram_g_size` bytes
    /// of graphics RAM
    pub fn validate(&self, ram_g_size: u32) -> Result<(), ConfigError> {
        self.timings.validate()?;
        self.cache.validate(ram_g_size)
    }
}
