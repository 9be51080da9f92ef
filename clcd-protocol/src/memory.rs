//! Memory maps for both coprocessor generations
//!
//! The FT800 and FT81x expose the same registers at different addresses.
//! Drivers take a [`MemoryMap`] by value and never hard-code an address.

/// Size of the coprocessor command ring in bytes
pub const CMD_RING_SIZE: u32 = 4096;

/// Mask applied to the command ring pointer registers
pub const CMD_RING_MASK: u32 = CMD_RING_SIZE - 1;

/// Size of the display-list RAM in bytes
pub const RAM_DL_SIZE: u32 = 8192;

/// Mask applied to `REG_CMD_DL`
pub const CMD_DL_MASK: u32 = RAM_DL_SIZE - 1;

/// Value read from `REG_ID` once the chip is running
pub const DEVICE_ID: u8 = 0x7C;

/// `REG_TOUCH_RAW_XY` when no touch is detected
pub const TOUCH_RAW_XY_IDLE: u32 = 0x8000_8000;

/// `REG_DLSWAP` value requesting a swap after the current frame
pub const DLSWAP_FRAME: u8 = 0x02;

/// `REG_GPIO` bit driving the panel DISP line
pub const GPIO_DISP: u8 = 0x80;

/// Supported chip generations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Chip {
    /// FT800/FT801: host-managed command ring
    Ft800,
    /// FT810..FT813: adds the streaming command port
    Ft81x,
}

impl Chip {
    /// Memory map for this chip
    pub const fn map(self) -> MemoryMap {
        match self {
            Chip::Ft800 => MemoryMap::FT800,
            Chip::Ft81x => MemoryMap::FT81X,
        }
    }
}

/// Register and RAM addresses of one chip generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryMap {
    pub chip: Chip,

    pub ram_g: u32,
    pub ram_g_size: u32,
    pub ram_dl: u32,
    pub ram_cmd: u32,

    pub reg_id: u32,
    pub reg_frames: u32,
    pub reg_clock: u32,
    pub reg_cpureset: u32,
    pub reg_hcycle: u32,
    pub reg_hoffset: u32,
    pub reg_hsize: u32,
    pub reg_hsync0: u32,
    pub reg_hsync1: u32,
    pub reg_vcycle: u32,
    pub reg_voffset: u32,
    pub reg_vsize: u32,
    pub reg_vsync0: u32,
    pub reg_vsync1: u32,
    pub reg_dlswap: u32,
    pub reg_rotate: u32,
    pub reg_dither: u32,
    pub reg_swizzle: u32,
    pub reg_cspread: u32,
    pub reg_pclk_pol: u32,
    pub reg_pclk: u32,
    pub reg_tag: u32,
    pub reg_vol_sound: u32,
    pub reg_sound: u32,
    pub reg_play: u32,
    pub reg_gpio_dir: u32,
    pub reg_gpio: u32,
    pub reg_pwm_hz: u32,
    pub reg_pwm_duty: u32,
    pub reg_cmd_read: u32,
    pub reg_cmd_write: u32,
    pub reg_cmd_dl: u32,
    pub reg_touch_mode: u32,
    pub reg_touch_adc_mode: u32,
    pub reg_touch_oversample: u32,
    pub reg_touch_rzthresh: u32,
    pub reg_touch_raw_xy: u32,
    pub reg_touch_rz: u32,
    pub reg_touch_screen_xy: u32,
    pub reg_touch_tag: u32,
    /// `REG_TOUCH_TRANSFORM_A`; B..F follow at 4-byte steps
    pub reg_touch_transform_a: u32,

    /// Streaming command port, FT81x only
    pub reg_cmdb_space: Option<u32>,
    pub reg_cmdb_write: Option<u32>,
    pub reg_mediafifo_read: Option<u32>,
    pub reg_mediafifo_write: Option<u32>,
}

impl MemoryMap {
    pub const FT800: Self = Self {
        chip: Chip::Ft800,

        ram_g: 0x00_0000,
        ram_g_size: 256 * 1024,
        ram_dl: 0x10_0000,
        ram_cmd: 0x10_8000,

        reg_id: 0x10_2400,
        reg_frames: 0x10_2404,
        reg_clock: 0x10_2408,
        reg_cpureset: 0x10_241C,
        reg_hcycle: 0x10_2428,
        reg_hoffset: 0x10_242C,
        reg_hsize: 0x10_2430,
        reg_hsync0: 0x10_2434,
        reg_hsync1: 0x10_2438,
        reg_vcycle: 0x10_243C,
        reg_voffset: 0x10_2440,
        reg_vsize: 0x10_2444,
        reg_vsync0: 0x10_2448,
        reg_vsync1: 0x10_244C,
        reg_dlswap: 0x10_2450,
        reg_rotate: 0x10_2454,
        reg_dither: 0x10_245C,
        reg_swizzle: 0x10_2460,
        reg_cspread: 0x10_2464,
        reg_pclk_pol: 0x10_2468,
        reg_pclk: 0x10_246C,
        reg_tag: 0x10_2478,
        reg_vol_sound: 0x10_2480,
        reg_sound: 0x10_2484,
        reg_play: 0x10_2488,
        reg_gpio_dir: 0x10_248C,
        reg_gpio: 0x10_2490,
        reg_pwm_hz: 0x10_24C0,
        reg_pwm_duty: 0x10_24C4,
        reg_cmd_read: 0x10_24E4,
        reg_cmd_write: 0x10_24E8,
        reg_cmd_dl: 0x10_24EC,
        reg_touch_mode: 0x10_24F0,
        reg_touch_adc_mode: 0x10_24F4,
        reg_touch_oversample: 0x10_2500,
        reg_touch_rzthresh: 0x10_2504,
        reg_touch_raw_xy: 0x10_2508,
        reg_touch_rz: 0x10_250C,
        reg_touch_screen_xy: 0x10_2510,
        reg_touch_tag: 0x10_2518,
        reg_touch_transform_a: 0x10_251C,

        reg_cmdb_space: None,
        reg_cmdb_write: None,
        reg_mediafifo_read: None,
        reg_mediafifo_write: None,
    };

    pub const FT81X: Self = Self {
        chip: Chip::Ft81x,

        ram_g: 0x00_0000,
        ram_g_size: 1024 * 1024,
        ram_dl: 0x30_0000,
        ram_cmd: 0x30_8000,

        reg_id: 0x30_2000,
        reg_frames: 0x30_2004,
        reg_clock: 0x30_2008,
        reg_cpureset: 0x30_2020,
        reg_hcycle: 0x30_202C,
        reg_hoffset: 0x30_2030,
        reg_hsize: 0x30_2034,
        reg_hsync0: 0x30_2038,
        reg_hsync1: 0x30_203C,
        reg_vcycle: 0x30_2040,
        reg_voffset: 0x30_2044,
        reg_vsize: 0x30_2048,
        reg_vsync0: 0x30_204C,
        reg_vsync1: 0x30_2050,
        reg_dlswap: 0x30_2054,
        reg_rotate: 0x30_2058,
        reg_dither: 0x30_2060,
        reg_swizzle: 0x30_2064,
        reg_cspread: 0x30_2068,
        reg_pclk_pol: 0x30_206C,
        reg_pclk: 0x30_2070,
        reg_tag: 0x30_207C,
        reg_vol_sound: 0x30_2084,
        reg_sound: 0x30_2088,
        reg_play: 0x30_208C,
        reg_gpio_dir: 0x30_2090,
        reg_gpio: 0x30_2094,
        reg_pwm_hz: 0x30_20D0,
        reg_pwm_duty: 0x30_20D4,
        reg_cmd_read: 0x30_20F8,
        reg_cmd_write: 0x30_20FC,
        reg_cmd_dl: 0x30_2100,
        reg_touch_mode: 0x30_2104,
        reg_touch_adc_mode: 0x30_2108,
        reg_touch_oversample: 0x30_2114,
        reg_touch_rzthresh: 0x30_2118,
        reg_touch_raw_xy: 0x30_211C,
        reg_touch_rz: 0x30_2120,
        reg_touch_screen_xy: 0x30_2124,
        reg_touch_tag: 0x30_212C,
        reg_touch_transform_a: 0x30_2150,

        reg_cmdb_space: Some(0x30_2574),
        reg_cmdb_write: Some(0x30_2578),
        reg_mediafifo_read: Some(0x30_9014),
        reg_mediafifo_write: Some(0x30_9018),
    };

    /// Address of touch transform register `index` (0 = A .. 5 = F)
    pub const fn touch_transform(&self, index: u8) -> u32 {
        self.reg_touch_transform_a + 4 * index as u32
    }

    /// One past the last byte of graphics RAM
    pub const fn ram_g_end(&self) -> u32 {
        self.ram_g + self.ram_g_size
    }

    /// Whether the streaming command port is available
    pub const fn has_cmdb(&self) -> bool {
        self.reg_cmdb_space.is_some() && self.reg_cmdb_write.is_some()
    }
}
