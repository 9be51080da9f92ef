//! Display module bring-up and control
//!
//! [`Lcd`] owns the register transport, the command FIFO backend and a
//! millisecond clock. Everything else in this crate borrows it.
//!
//! # Bring-up
//!
//! ```text
//! power_cycle ─▶ slow SPI ─▶ CLKEXT ─▶ ACTIVE ─▶ poll REG_ID ─▶ fast SPI
//!            ─▶ timings ─▶ blank frame ─▶ touch/audio/GPIO ─▶ PCLK on ─▶ coprocessor reset ─▶ transform
//! ```

use clcd_core::config::{
    LcdConfig, TouchCalibration, TouchTransform, DEFAULT_TRANSFORM_480X272,
    DEFAULT_TRANSFORM_800X480,
};
use clcd_core::timer::Timer;
use clcd_core::traits::RegisterAccess;
use clcd_hal::spi::{RUNTIME_FREQUENCY_HZ, STARTUP_FREQUENCY_HZ};
use clcd_hal::{Clock, OutputPin};
use clcd_protocol::command::opt;
use clcd_protocol::display_list::{clear, clear_color_rgb, DISPLAY};
use clcd_protocol::memory::{
    Chip, CMD_RING_MASK, DEVICE_ID, DLSWAP_FRAME, GPIO_DISP, TOUCH_RAW_XY_IDLE,
};
use clcd_protocol::{HostCommand, MemoryMap};
use embedded_hal::delay::DelayNs;

use crate::cmd::CommandProcessor;
use crate::fifo::FifoBackend;

/// `REG_ID` polls before giving up on the device ID
pub const ID_POLL_ATTEMPTS: u32 = 250;

/// Backlight PWM duty for full brightness
pub const MAX_BRIGHTNESS: u8 = 128;

/// Backlight PWM frequency
pub const PWM_HZ: u16 = 250;

/// Power-down pulse and recovery time
pub const POWER_CYCLE_MS: u32 = 20;

/// Settle time before asserting coprocessor reset
pub const RESET_SETTLE_MS: u32 = 100;

/// Time for the coprocessor to restart after reset
pub const RESET_RECOVER_MS: u32 = 300;

/// Pulse the module's power-down line
///
/// Leaves the chip powered with all registers at their reset values.
pub fn power_cycle<P: OutputPin, D: DelayNs>(pd: &mut P, delay: &mut D) {
    pd.set_low();
    delay.delay_ms(POWER_CYCLE_MS);
    pd.set_high();
    delay.delay_ms(POWER_CYCLE_MS);
}

/// A display module
pub struct Lcd<R, B, K> {
    pub(crate) regs: R,
    pub(crate) fifo: B,
    clock: K,
    map: MemoryMap,
    config: LcdConfig,
}

impl<R, B, K> Lcd<R, B, K>
where
    R: RegisterAccess,
    B: FifoBackend,
    K: Clock,
{
    pub fn new(regs: R, fifo: B, clock: K, map: MemoryMap, config: LcdConfig) -> Self {
        Self {
            regs,
            fifo,
            clock,
            map,
            config,
        }
    }

    /// Give back the transport, FIFO backend and clock
    pub fn release(self) -> (R, B, K) {
        (self.regs, self.fifo, self.clock)
    }

    /// Direct register access
    pub fn regs(&mut self) -> &mut R {
        &mut self.regs
    }

    pub fn fifo(&self) -> &B {
        &self.fifo
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn map(&self) -> &MemoryMap {
        &self.map
    }

    pub fn config(&self) -> &LcdConfig {
        &self.config
    }

    /// Open a command session
    pub fn cmd(&mut self) -> Result<CommandProcessor<'_, R, B, K>, R::Error> {
        CommandProcessor::new(self)
    }

    /// Publish queued commands
    pub fn execute(&mut self) -> Result<(), R::Error> {
        self.fifo.execute(&mut self.regs)
    }

    /// Whether the coprocessor has consumed every published command
    pub fn is_idle(&mut self) -> Result<bool, R::Error> {
        let read = self.regs.read32(self.map.reg_cmd_read)? & CMD_RING_MASK;
        let write = self.regs.read32(self.map.reg_cmd_write)? & CMD_RING_MASK;
        Ok(read == write)
    }

    /// Block until the coprocessor is idle
    ///
    /// With `idle_warn_ms` configured, a wait that outlasts it is logged
    /// once. The wait itself never gives up.
    pub fn wait_until_idle(&mut self) -> Result<(), R::Error> {
        let timer = Timer::started_at(self.clock.now_ms());
        let mut warned = false;
        while !self.is_idle()? {
            if let Some(limit) = self.config.idle_warn_ms {
                if !warned && timer.elapsed(self.clock.now_ms(), limit) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Coprocessor still busy after {} ms", limit);
                    warned = true;
                }
            }
        }
        Ok(())
    }

    /// Restart the coprocessor with an empty command ring
    pub fn reset_coprocessor<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), R::Error> {
        delay.delay_ms(RESET_SETTLE_MS);
        self.fifo.reset(&mut self.regs)?;
        delay.delay_ms(RESET_RECOVER_MS);
        Ok(())
    }

    pub fn device_id(&mut self) -> Result<u8, R::Error> {
        self.regs.read8(self.map.reg_id)
    }

    /// Wake the chip and configure the panel
    ///
    /// Expects a freshly powered chip (see [`power_cycle`]). A device ID
    /// that never reads back correctly is logged and bring-up continues
    /// on the startup bus clock.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), R::Error> {
        let map = self.map;
        let t = self.config.timings;

        self.regs.set_bus_frequency(STARTUP_FREQUENCY_HZ)?;

        let clock = if self.config.external_clock {
            HostCommand::ClockExternal
        } else {
            HostCommand::ClockInternal
        };
        self.regs.host_command(clock, 0)?;
        self.regs.host_command(HostCommand::Active, 0)?;

        let mut id = 0;
        for _ in 0..ID_POLL_ATTEMPTS {
            id = self.device_id()?;
            if id == DEVICE_ID {
                break;
            }
            delay.delay_ms(1);
        }
        if id == DEVICE_ID {
            self.regs.set_bus_frequency(RUNTIME_FREQUENCY_HZ)?;
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("Timeout waiting for device ID, got {=u8:#x}", id);
        }

        self.set_brightness(0)?;

        let regs = &mut self.regs;
        regs.write16(map.reg_hcycle, t.hcycle)?;
        regs.write16(map.reg_hoffset, t.hoffset)?;
        regs.write16(map.reg_hsync0, t.hsync0)?;
        regs.write16(map.reg_hsync1, t.hsync1)?;
        regs.write16(map.reg_vcycle, t.vcycle)?;
        regs.write16(map.reg_voffset, t.voffset)?;
        regs.write16(map.reg_vsync0, t.vsync0)?;
        regs.write16(map.reg_vsync1, t.vsync1)?;
        regs.write16(map.reg_hsize, t.hsize)?;
        regs.write16(map.reg_vsize, t.vsize)?;
        regs.write8(map.reg_swizzle, t.swizzle)?;
        regs.write8(map.reg_pclk_pol, t.pclk_pol)?;
        regs.write8(map.reg_cspread, t.cspread)?;

        regs.write_chunks(
            map.ram_dl,
            &[
                &clear_color_rgb(0).to_le_bytes(),
                &clear(true, true, true).to_le_bytes(),
                &DISPLAY.to_le_bytes(),
            ],
            0,
        )?;
        regs.write8(map.reg_dlswap, DLSWAP_FRAME)?;

        regs.write16(map.reg_touch_rzthresh, self.config.touch_threshold)?;
        regs.write8(map.reg_vol_sound, 0)?;

        let gpio_dir = regs.read8(map.reg_gpio_dir)?;
        regs.write8(map.reg_gpio_dir, gpio_dir | GPIO_DISP)?;
        let gpio = regs.read8(map.reg_gpio)?;
        regs.write8(map.reg_gpio, gpio | GPIO_DISP)?;

        regs.write8(map.reg_pclk, t.pclk)?;
        regs.write16(map.reg_pwm_hz, PWM_HZ)?;
        // Dithering causes horizontal line artifacts on some colours
        regs.write8(map.reg_dither, 0)?;

        self.reset_coprocessor(delay)?;
        self.default_touch_transform()
    }

    /// Start the pixel clock
    pub fn enable(&mut self) -> Result<(), R::Error> {
        self.regs.write8(self.map.reg_pclk, self.config.timings.pclk)
    }

    /// Stop the pixel clock, blanking the panel
    pub fn disable(&mut self) -> Result<(), R::Error> {
        self.regs.write8(self.map.reg_pclk, 0)
    }

    /// Set the backlight duty, clamped to [`MAX_BRIGHTNESS`]
    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), R::Error> {
        self.regs
            .write8(self.map.reg_pwm_duty, brightness.min(MAX_BRIGHTNESS))
    }

    pub fn brightness(&mut self) -> Result<u8, R::Error> {
        self.regs.read8(self.map.reg_pwm_duty)
    }

    pub fn turn_on_backlight(&mut self) -> Result<(), R::Error> {
        self.set_brightness(MAX_BRIGHTNESS)
    }

    /// Tag under the touch point, 0 if none
    pub fn tag(&mut self) -> Result<u8, R::Error> {
        self.regs.read8(self.map.reg_touch_tag)
    }

    pub fn is_touching(&mut self) -> Result<bool, R::Error> {
        Ok(self.regs.read32(self.map.reg_touch_raw_xy)? != TOUCH_RAW_XY_IDLE)
    }

    /// Current touch transform matrix
    pub fn touch_transform(&mut self) -> Result<TouchTransform, R::Error> {
        let mut transform = [0u32; 6];
        for (i, value) in (0u8..).zip(transform.iter_mut()) {
            *value = self.regs.read32(self.map.touch_transform(i))?;
        }
        Ok(transform)
    }

    /// Load a touch transform matrix, e.g. one restored from storage
    pub fn set_touch_transform(&mut self, transform: &TouchTransform) -> Result<(), R::Error> {
        for (i, value) in (0u8..).zip(transform.iter()) {
            self.regs.write32(self.map.touch_transform(i), *value)?;
        }
        Ok(())
    }

    /// Run the coprocessor's three-point touch calibration
    ///
    /// Blocks until the user has tapped all three targets, then captures
    /// the resulting transform for storage.
    pub fn calibrate(&mut self) -> Result<TouchCalibration, R::Error> {
        let x = (self.config.timings.hsize / 2) as i16;
        let y = (self.config.timings.vsize / 2) as i16;
        self.cmd()?
            .dlstart()?
            .dl(clear_color_rgb(0))?
            .dl(clear(true, true, true))?
            .text(x, y, 27, opt::OPT_CENTER, "Tap the dots")?
            .calibrate()?
            .execute()?;
        self.wait_until_idle()?;
        Ok(TouchCalibration::new(self.touch_transform()?))
    }

    /// Load a stored calibration
    ///
    /// Returns `false` and leaves the registers untouched when the record
    /// fails validation.
    pub fn restore_calibration(&mut self, cal: &TouchCalibration) -> Result<bool, R::Error> {
        if !cal.is_valid() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Stored touch calibration is invalid, keeping current transform");
            return Ok(false);
        }
        self.set_touch_transform(&cal.transform)?;
        Ok(true)
    }

    /// Load the factory transform for the panel size and apply orientation
    ///
    /// The FT81x rotates through the coprocessor, which also adjusts the
    /// transform. The FT800 can only invert.
    pub fn default_touch_transform(&mut self) -> Result<(), R::Error> {
        let transform = if self.config.timings.hsize >= 800 {
            DEFAULT_TRANSFORM_800X480
        } else {
            DEFAULT_TRANSFORM_480X272
        };
        self.regs.write32(self.map.reg_rotate, 0)?;
        self.set_touch_transform(&transform)?;

        let orientation = self.config.orientation;
        match self.map.chip {
            Chip::Ft81x => {
                self.cmd()?.setrotate(orientation.rotation())?.execute()?;
                self.wait_until_idle()
            }
            Chip::Ft800 => {
                if orientation.portrait || orientation.mirrored {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("FT800 supports only inverted orientation");
                }
                if orientation.inverted {
                    self.regs
                        .write32(self.map.reg_rotate, orientation.register_value() as u32)?;
                }
                Ok(())
            }
        }
    }
}
