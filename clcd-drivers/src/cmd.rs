//! Command processor sessions
//!
//! A [`CommandProcessor`] borrows the [`Lcd`] for a burst of commands. Each
//! builder queues one padded command and returns the session, so commands
//! chain with `?`:
//!
//! ```ignore
//! lcd.cmd()?
//!     .dlstart()?
//!     .bgcolor(0x10_2030)?
//!     .button(20, 20, 120, 40, 28, 0, "Home")?
//!     .dl(DISPLAY)?
//!     .swap()?
//!     .execute()?;
//! ```
//!
//! Nothing runs until [`CommandProcessor::execute`].

use clcd_core::traits::RegisterAccess;
use clcd_hal::Clock;
use clcd_protocol::command::{opcode, Record};

use crate::fifo::FifoBackend;
use crate::lcd::Lcd;

/// Borrow-scoped command session
pub struct CommandProcessor<'a, R, B, K> {
    lcd: &'a mut Lcd<R, B, K>,
}

type Chain<'s, 'a, R, B, K> =
    Result<&'s mut CommandProcessor<'a, R, B, K>, <R as RegisterAccess>::Error>;

impl<'a, R, B, K> CommandProcessor<'a, R, B, K>
where
    R: RegisterAccess,
    B: FifoBackend,
    K: Clock,
{
    pub(crate) fn new(lcd: &'a mut Lcd<R, B, K>) -> Result<Self, R::Error> {
        lcd.fifo.start(&mut lcd.regs)?;
        Ok(Self { lcd })
    }

    /// The display this session writes to
    pub fn lcd(&mut self) -> &mut Lcd<R, B, K> {
        self.lcd
    }

    fn write(&mut self, chunks: &[&[u8]]) -> Chain<'_, 'a, R, B, K> {
        self.lcd.fifo.write(&mut self.lcd.regs, chunks)?;
        Ok(self)
    }

    /// Queue an encoded record
    pub fn record(&mut self, record: &Record) -> Chain<'_, 'a, R, B, K> {
        self.write(&[record.as_bytes()])
    }

    fn record_str(&mut self, record: Record, s: &str) -> Chain<'_, 'a, R, B, K> {
        self.write(&[record.as_bytes(), s.as_bytes(), &[0]])
    }

    /// Queue a bare 32-bit word
    pub fn cmd(&mut self, word: u32) -> Chain<'_, 'a, R, B, K> {
        self.write(&[&word.to_le_bytes()])
    }

    /// Queue a display-list word
    pub fn dl(&mut self, word: u32) -> Chain<'_, 'a, R, B, K> {
        self.cmd(word)
    }

    /// Queue raw bytes, zero padded
    pub fn data(&mut self, data: &[u8]) -> Chain<'_, 'a, R, B, K> {
        self.write(&[data])
    }

    /// Queue a NUL-terminated string
    pub fn str(&mut self, s: &str) -> Chain<'_, 'a, R, B, K> {
        self.write(&[s.as_bytes(), &[0]])
    }

    /// Publish everything queued so far
    pub fn execute(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.lcd.execute()?;
        Ok(self)
    }

    pub fn wait_until_idle(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.lcd.wait_until_idle()?;
        Ok(self)
    }

    // Control

    pub fn dlstart(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.cmd(opcode::DLSTART)
    }

    pub fn swap(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.cmd(opcode::SWAP)
    }

    pub fn coldstart(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.cmd(opcode::COLDSTART)
    }

    pub fn interrupt(&mut self, ms: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::interrupt(ms))
    }

    pub fn stop(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.cmd(opcode::STOP)
    }

    pub fn screensaver(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.cmd(opcode::SCREENSAVER)
    }

    pub fn logo(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.cmd(opcode::LOGO)
    }

    pub fn calibrate(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::calibrate())
    }

    // Graphics state

    pub fn bgcolor(&mut self, rgb: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::bgcolor(rgb))
    }

    pub fn fgcolor(&mut self, rgb: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::fgcolor(rgb))
    }

    pub fn gradcolor(&mut self, rgb: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::gradcolor(rgb))
    }

    pub fn loadidentity(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.cmd(opcode::LOADIDENTITY)
    }

    pub fn setmatrix(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.cmd(opcode::SETMATRIX)
    }

    pub fn getmatrix(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::getmatrix())
    }

    pub fn scale(&mut self, sx: i32, sy: i32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::scale(sx, sy))
    }

    /// Rotate by `angle` in 1/65536 turns
    pub fn rotate(&mut self, angle: i32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::rotate(angle))
    }

    pub fn translate(&mut self, tx: i32, ty: i32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::translate(tx, ty))
    }

    pub fn setfont(&mut self, font: u32, ptr: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::setfont(font, ptr))
    }

    pub fn romfont(&mut self, font: u32, rom_slot: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::romfont(font, rom_slot))
    }

    // Widgets

    pub fn gradient(
        &mut self,
        x0: i16,
        y0: i16,
        rgb0: u32,
        x1: i16,
        y1: i16,
        rgb1: u32,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::gradient(x0, y0, rgb0, x1, y1, rgb1))
    }

    pub fn text(
        &mut self,
        x: i16,
        y: i16,
        font: i16,
        options: u16,
        s: &str,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record_str(Record::text(x, y, font, options), s)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn button(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        font: i16,
        options: u16,
        s: &str,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record_str(Record::button(x, y, w, h, font, options), s)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn keys(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        font: i16,
        options: u16,
        s: &str,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record_str(Record::keys(x, y, w, h, font, options), s)
    }

    pub fn number(
        &mut self,
        x: i16,
        y: i16,
        font: i16,
        options: u16,
        n: i32,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::number(x, y, font, options, n))
    }

    /// Toggle with labels `off` and `on` separated by `\xff` in `s`
    #[allow(clippy::too_many_arguments)]
    pub fn toggle(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        font: i16,
        options: u16,
        on: bool,
        s: &str,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record_str(Record::toggle(x, y, w, font, options, on), s)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn progress(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        options: u16,
        val: u16,
        range: u16,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::progress(x, y, w, h, options, val, range))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn slider(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        options: u16,
        val: u16,
        range: u16,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::slider(x, y, w, h, options, val, range))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn scrollbar(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        options: u16,
        val: u16,
        size: u16,
        range: u16,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::scrollbar(x, y, w, h, options, val, size, range))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn gauge(
        &mut self,
        x: i16,
        y: i16,
        r: i16,
        options: u16,
        major: u16,
        minor: u16,
        val: u16,
        range: u16,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::gauge(x, y, r, options, major, minor, val, range))
    }

    pub fn dial(
        &mut self,
        x: i16,
        y: i16,
        r: i16,
        options: u16,
        val: u16,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::dial(x, y, r, options, val))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn clock(
        &mut self,
        x: i16,
        y: i16,
        r: i16,
        options: u16,
        h: u16,
        m: u16,
        s: u16,
        ms: u16,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::clock(x, y, r, options, h, m, s, ms))
    }

    pub fn spinner(&mut self, x: i16, y: i16, style: u16, scale: u16) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::spinner(x, y, style, scale))
    }

    pub fn sketch(
        &mut self,
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        ptr: u32,
        format: u16,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::sketch(x, y, w, h, ptr, format))
    }

    pub fn track(&mut self, x: i16, y: i16, w: i16, h: i16, tag: i16) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::track(x, y, w, h, tag))
    }

    pub fn snapshot(&mut self, ptr: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::snapshot(ptr))
    }

    // Memory

    pub fn memzero(&mut self, ptr: u32, num: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::memzero(ptr, num))
    }

    pub fn memset(&mut self, ptr: u32, value: u32, num: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::memset(ptr, value, num))
    }

    pub fn memcpy(&mut self, dest: u32, src: u32, num: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::memcpy(dest, src, num))
    }

    pub fn memcrc(&mut self, ptr: u32, num: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::memcrc(ptr, num))
    }

    /// Copy `data` to `ptr` through the command stream
    pub fn memwrite(&mut self, ptr: u32, data: &[u8]) -> Chain<'_, 'a, R, B, K> {
        let header = Record::memwrite(ptr, data.len() as u32);
        self.write(&[header.as_bytes(), data])
    }

    /// Splice `num` bytes of display list from `ptr` into the current list
    pub fn append(&mut self, ptr: u32, num: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::append(ptr, num))
    }

    /// Decompress zlib `data` to `ptr`
    pub fn inflate(&mut self, ptr: u32, data: &[u8]) -> Chain<'_, 'a, R, B, K> {
        self.write(&[Record::inflate(ptr).as_bytes(), data])
    }

    /// Decode a JPEG (or PNG on FT81x) to `ptr`
    pub fn loadimage(&mut self, ptr: u32, options: u32, data: &[u8]) -> Chain<'_, 'a, R, B, K> {
        self.write(&[Record::loadimage(ptr, options).as_bytes(), data])
    }

    pub fn getptr(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::getptr())
    }

    pub fn getprops(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::getprops())
    }

    // FT81x only

    pub fn setrotate(&mut self, rotation: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::setrotate(rotation))
    }

    pub fn setbase(&mut self, base: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::setbase(base))
    }

    pub fn setbitmap(&mut self, addr: u32, format: u16, w: u16, h: u16) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::setbitmap(addr, format, w, h))
    }

    pub fn snapshot2(
        &mut self,
        format: u32,
        ptr: u32,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
    ) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::snapshot2(format, ptr, x, y, w, h))
    }

    pub fn mediafifo(&mut self, ptr: u32, size: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::mediafifo(ptr, size))
    }

    pub fn videostart(&mut self) -> Chain<'_, 'a, R, B, K> {
        self.cmd(opcode::VIDEOSTART)
    }

    pub fn videoframe(&mut self, dest: u32, result_ptr: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::videoframe(dest, result_ptr))
    }

    pub fn playvideo(&mut self, options: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::playvideo(options))
    }

    pub fn setfont2(&mut self, font: u32, ptr: u32, first_char: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::setfont2(font, ptr, first_char))
    }

    pub fn setscratch(&mut self, handle: u32) -> Chain<'_, 'a, R, B, K> {
        self.record(&Record::setscratch(handle))
    }
}
