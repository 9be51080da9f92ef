//! Coprocessor command records
//!
//! A command is a 32-bit opcode optionally followed by packed little-endian
//! parameters. [`Record`] builds the fixed-layout part; variable payloads
//! (strings, `MEMWRITE` data) are streamed after it by the driver and the
//! whole command is zero padded to a 4-byte boundary.

use heapless::Vec;

/// Largest fixed-layout record, in bytes
pub const MAX_RECORD_SIZE: usize = 32;

/// Zero bytes needed to bring `len` to a multiple of four
pub const fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// `len` rounded up to a multiple of four
pub const fn padded_len(len: usize) -> usize {
    len + padding(len)
}

/// Coprocessor opcodes
pub mod opcode {
    pub const DLSTART: u32 = 0xFFFF_FF00;
    pub const SWAP: u32 = 0xFFFF_FF01;
    pub const INTERRUPT: u32 = 0xFFFF_FF02;
    pub const BGCOLOR: u32 = 0xFFFF_FF09;
    pub const FGCOLOR: u32 = 0xFFFF_FF0A;
    pub const GRADIENT: u32 = 0xFFFF_FF0B;
    pub const TEXT: u32 = 0xFFFF_FF0C;
    pub const BUTTON: u32 = 0xFFFF_FF0D;
    pub const KEYS: u32 = 0xFFFF_FF0E;
    pub const PROGRESS: u32 = 0xFFFF_FF0F;
    pub const SLIDER: u32 = 0xFFFF_FF10;
    pub const SCROLLBAR: u32 = 0xFFFF_FF11;
    pub const TOGGLE: u32 = 0xFFFF_FF12;
    pub const GAUGE: u32 = 0xFFFF_FF13;
    pub const CLOCK: u32 = 0xFFFF_FF14;
    pub const CALIBRATE: u32 = 0xFFFF_FF15;
    pub const SPINNER: u32 = 0xFFFF_FF16;
    pub const STOP: u32 = 0xFFFF_FF17;
    pub const MEMCRC: u32 = 0xFFFF_FF18;
    pub const REGREAD: u32 = 0xFFFF_FF19;
    pub const MEMWRITE: u32 = 0xFFFF_FF1A;
    pub const MEMSET: u32 = 0xFFFF_FF1B;
    pub const MEMZERO: u32 = 0xFFFF_FF1C;
    pub const MEMCPY: u32 = 0xFFFF_FF1D;
    pub const APPEND: u32 = 0xFFFF_FF1E;
    pub const SNAPSHOT: u32 = 0xFFFF_FF1F;
    pub const INFLATE: u32 = 0xFFFF_FF22;
    pub const GETPTR: u32 = 0xFFFF_FF23;
    pub const LOADIMAGE: u32 = 0xFFFF_FF24;
    pub const GETPROPS: u32 = 0xFFFF_FF25;
    pub const LOADIDENTITY: u32 = 0xFFFF_FF26;
    pub const TRANSLATE: u32 = 0xFFFF_FF27;
    pub const SCALE: u32 = 0xFFFF_FF28;
    pub const ROTATE: u32 = 0xFFFF_FF29;
    pub const SETMATRIX: u32 = 0xFFFF_FF2A;
    pub const SETFONT: u32 = 0xFFFF_FF2B;
    pub const TRACK: u32 = 0xFFFF_FF2C;
    pub const DIAL: u32 = 0xFFFF_FF2D;
    pub const NUMBER: u32 = 0xFFFF_FF2E;
    pub const SCREENSAVER: u32 = 0xFFFF_FF2F;
    pub const SKETCH: u32 = 0xFFFF_FF30;
    pub const LOGO: u32 = 0xFFFF_FF31;
    pub const COLDSTART: u32 = 0xFFFF_FF32;
    pub const GETMATRIX: u32 = 0xFFFF_FF33;
    pub const GRADCOLOR: u32 = 0xFFFF_FF34;
    pub const SETROTATE: u32 = 0xFFFF_FF36;
    pub const SNAPSHOT2: u32 = 0xFFFF_FF37;
    pub const SETBASE: u32 = 0xFFFF_FF38;
    pub const MEDIAFIFO: u32 = 0xFFFF_FF39;
    pub const PLAYVIDEO: u32 = 0xFFFF_FF3A;
    pub const SETFONT2: u32 = 0xFFFF_FF3B;
    pub const SETSCRATCH: u32 = 0xFFFF_FF3C;
    pub const ROMFONT: u32 = 0xFFFF_FF3F;
    pub const VIDEOSTART: u32 = 0xFFFF_FF40;
    pub const VIDEOFRAME: u32 = 0xFFFF_FF41;
    pub const SETBITMAP: u32 = 0xFFFF_FF43;

    /// Whether `word` is a coprocessor command rather than a display-list word
    pub const fn is_command(word: u32) -> bool {
        word & 0xFFFF_FF00 == 0xFFFF_FF00
    }
}

/// Widget option flags
pub mod opt {
    pub const OPT_3D: u16 = 0;
    pub const OPT_RGB565: u16 = 0;
    pub const OPT_MONO: u16 = 1;
    pub const OPT_NODL: u16 = 2;
    pub const OPT_NOTEAR: u16 = 4;
    pub const OPT_FULLSCREEN: u16 = 8;
    pub const OPT_MEDIAFIFO: u16 = 16;
    pub const OPT_SOUND: u16 = 32;
    pub const OPT_FLAT: u16 = 256;
    pub const OPT_SIGNED: u16 = 256;
    pub const OPT_CENTERX: u16 = 512;
    pub const OPT_CENTERY: u16 = 1024;
    pub const OPT_CENTER: u16 = OPT_CENTERX | OPT_CENTERY;
    pub const OPT_RIGHTX: u16 = 2048;
    pub const OPT_NOBACK: u16 = 4096;
    pub const OPT_NOTICKS: u16 = 8192;
    pub const OPT_NOHM: u16 = 16384;
    pub const OPT_NOPOINTER: u16 = 16384;
    pub const OPT_NOSECS: u16 = 32768;
    pub const OPT_NOHANDS: u16 = OPT_NOPOINTER | OPT_NOSECS;
}

/// Fixed-layout command record
///
/// # Example
/// ```
/// use clcd_protocol::command::{opcode, Record};
/// let rec = Record::append(0x1000, 600);
/// assert_eq!(rec.opcode(), opcode::APPEND);
/// assert_eq!(rec.len(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    bytes: Vec<u8, MAX_RECORD_SIZE>,
}

impl Record {
    /// Start a record with `opcode` and no parameters
    pub fn new(opcode: u32) -> Self {
        Self { bytes: Vec::new() }.put(&opcode.to_le_bytes())
    }

    fn put(mut self, bytes: &[u8]) -> Self {
        let stored = self.bytes.extend_from_slice(bytes).is_ok();
        debug_assert!(stored, "command record longer than MAX_RECORD_SIZE");
        self
    }

    /// Append an unsigned 32-bit parameter
    pub(crate) fn u32(self, value: u32) -> Self {
        self.put(&value.to_le_bytes())
    }

    /// Append a signed 32-bit parameter
    pub(crate) fn i32(self, value: i32) -> Self {
        self.put(&value.to_le_bytes())
    }

    /// Append an unsigned 16-bit parameter
    pub(crate) fn u16(self, value: u16) -> Self {
        self.put(&value.to_le_bytes())
    }

    /// Append a signed 16-bit parameter
    pub(crate) fn i16(self, value: i16) -> Self {
        self.put(&value.to_le_bytes())
    }

    /// Encoded bytes, unpadded
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length, unpadded
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Leading opcode
    pub fn opcode(&self) -> u32 {
        match self.bytes.get(..4) {
            Some(&[a, b, c, d]) => u32::from_le_bytes([a, b, c, d]),
            _ => 0,
        }
    }

    // Graphics state

    pub fn interrupt(ms: u32) -> Self {
        Self::new(opcode::INTERRUPT).u32(ms)
    }

    pub fn bgcolor(rgb: u32) -> Self {
        Self::new(opcode::BGCOLOR).u32(rgb)
    }

    pub fn fgcolor(rgb: u32) -> Self {
        Self::new(opcode::FGCOLOR).u32(rgb)
    }

    pub fn gradcolor(rgb: u32) -> Self {
        Self::new(opcode::GRADCOLOR).u32(rgb)
    }

    pub fn gradient(x0: i16, y0: i16, rgb0: u32, x1: i16, y1: i16, rgb1: u32) -> Self {
        Self::new(opcode::GRADIENT)
            .i16(x0)
            .i16(y0)
            .u32(rgb0)
            .i16(x1)
            .i16(y1)
            .u32(rgb1)
    }

    pub fn translate(tx: i32, ty: i32) -> Self {
        Self::new(opcode::TRANSLATE).i32(tx).i32(ty)
    }

    pub fn scale(sx: i32, sy: i32) -> Self {
        Self::new(opcode::SCALE).i32(sx).i32(sy)
    }

    pub fn rotate(angle: i32) -> Self {
        Self::new(opcode::ROTATE).i32(angle)
    }

    /// `CMD_GETMATRIX` with six result placeholders
    pub fn getmatrix() -> Self {
        Self::new(opcode::GETMATRIX)
            .u32(0)
            .u32(0)
            .u32(0)
            .u32(0)
            .u32(0)
            .u32(0)
    }

    pub fn setfont(font: u32, ptr: u32) -> Self {
        Self::new(opcode::SETFONT).u32(font).u32(ptr)
    }

    pub fn setfont2(font: u32, ptr: u32, first_char: u32) -> Self {
        Self::new(opcode::SETFONT2).u32(font).u32(ptr).u32(first_char)
    }

    pub fn setscratch(handle: u32) -> Self {
        Self::new(opcode::SETSCRATCH).u32(handle)
    }

    pub fn romfont(font: u32, rom_slot: u32) -> Self {
        Self::new(opcode::ROMFONT).u32(font).u32(rom_slot)
    }

    // Widgets. Records followed by a string end on a 4-byte boundary.

    pub fn text(x: i16, y: i16, font: i16, options: u16) -> Self {
        Self::new(opcode::TEXT).i16(x).i16(y).i16(font).u16(options)
    }

    pub fn button(x: i16, y: i16, w: i16, h: i16, font: i16, options: u16) -> Self {
        Self::new(opcode::BUTTON)
            .i16(x)
            .i16(y)
            .i16(w)
            .i16(h)
            .i16(font)
            .u16(options)
    }

    pub fn keys(x: i16, y: i16, w: i16, h: i16, font: i16, options: u16) -> Self {
        Self::new(opcode::KEYS)
            .i16(x)
            .i16(y)
            .i16(w)
            .i16(h)
            .i16(font)
            .u16(options)
    }

    pub fn number(x: i16, y: i16, font: i16, options: u16, n: i32) -> Self {
        Self::new(opcode::NUMBER)
            .i16(x)
            .i16(y)
            .i16(font)
            .u16(options)
            .i32(n)
    }

    /// `CMD_TOGGLE`; the chip expects `0xFFFF` for on
    pub fn toggle(x: i16, y: i16, w: i16, font: i16, options: u16, on: bool) -> Self {
        Self::new(opcode::TOGGLE)
            .i16(x)
            .i16(y)
            .i16(w)
            .i16(font)
            .u16(options)
            .u16(if on { 0xFFFF } else { 0 })
    }

    pub fn progress(x: i16, y: i16, w: i16, h: i16, options: u16, val: u16, range: u16) -> Self {
        Self::new(opcode::PROGRESS)
            .i16(x)
            .i16(y)
            .i16(w)
            .i16(h)
            .u16(options)
            .u16(val)
            .u16(range)
    }

    pub fn slider(x: i16, y: i16, w: i16, h: i16, options: u16, val: u16, range: u16) -> Self {
        Self::new(opcode::SLIDER)
            .i16(x)
            .i16(y)
            .i16(w)
            .i16(h)
            .u16(options)
            .u16(val)
            .u16(range)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn scrollbar(
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        options: u16,
        val: u16,
        size: u16,
        range: u16,
    ) -> Self {
        Self::new(opcode::SCROLLBAR)
            .i16(x)
            .i16(y)
            .i16(w)
            .i16(h)
            .u16(options)
            .u16(val)
            .u16(size)
            .u16(range)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn gauge(
        x: i16,
        y: i16,
        r: i16,
        options: u16,
        major: u16,
        minor: u16,
        val: u16,
        range: u16,
    ) -> Self {
        Self::new(opcode::GAUGE)
            .i16(x)
            .i16(y)
            .i16(r)
            .u16(options)
            .u16(major)
            .u16(minor)
            .u16(val)
            .u16(range)
    }

    pub fn dial(x: i16, y: i16, r: i16, options: u16, val: u16) -> Self {
        Self::new(opcode::DIAL)
            .i16(x)
            .i16(y)
            .i16(r)
            .u16(options)
            .u16(val)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn clock(x: i16, y: i16, r: i16, options: u16, h: u16, m: u16, s: u16, ms: u16) -> Self {
        Self::new(opcode::CLOCK)
            .i16(x)
            .i16(y)
            .i16(r)
            .u16(options)
            .u16(h)
            .u16(m)
            .u16(s)
            .u16(ms)
    }

    pub fn spinner(x: i16, y: i16, style: u16, scale: u16) -> Self {
        Self::new(opcode::SPINNER).i16(x).i16(y).u16(style).u16(scale)
    }

    pub fn sketch(x: i16, y: i16, w: u16, h: u16, ptr: u32, format: u16) -> Self {
        Self::new(opcode::SKETCH)
            .i16(x)
            .i16(y)
            .u16(w)
            .u16(h)
            .u32(ptr)
            .u16(format)
    }

    pub fn track(x: i16, y: i16, w: i16, h: i16, tag: i16) -> Self {
        Self::new(opcode::TRACK).i16(x).i16(y).i16(w).i16(h).i16(tag)
    }

    /// `CMD_CALIBRATE` with its result placeholder
    pub fn calibrate() -> Self {
        Self::new(opcode::CALIBRATE).u32(0)
    }

    // Memory

    /// `CMD_MEMCRC` with its result placeholder
    pub fn memcrc(ptr: u32, num: u32) -> Self {
        Self::new(opcode::MEMCRC).u32(ptr).u32(num).u32(0)
    }

    /// `CMD_REGREAD` with its result placeholder
    pub fn regread(ptr: u32) -> Self {
        Self::new(opcode::REGREAD).u32(ptr).u32(0)
    }

    /// `CMD_MEMWRITE` header; `num` data bytes follow
    pub fn memwrite(ptr: u32, num: u32) -> Self {
        Self::new(opcode::MEMWRITE).u32(ptr).u32(num)
    }

    pub fn memset(ptr: u32, value: u32, num: u32) -> Self {
        Self::new(opcode::MEMSET).u32(ptr).u32(value).u32(num)
    }

    pub fn memzero(ptr: u32, num: u32) -> Self {
        Self::new(opcode::MEMZERO).u32(ptr).u32(num)
    }

    pub fn memcpy(dest: u32, src: u32, num: u32) -> Self {
        Self::new(opcode::MEMCPY).u32(dest).u32(src).u32(num)
    }

    pub fn append(ptr: u32, num: u32) -> Self {
        Self::new(opcode::APPEND).u32(ptr).u32(num)
    }

    /// `CMD_INFLATE` header; deflated data follows
    pub fn inflate(ptr: u32) -> Self {
        Self::new(opcode::INFLATE).u32(ptr)
    }

    /// `CMD_GETPTR` with its result placeholder
    pub fn getptr() -> Self {
        Self::new(opcode::GETPTR).u32(0)
    }

    /// `CMD_LOADIMAGE` header; JPEG/PNG data follows
    pub fn loadimage(ptr: u32, options: u32) -> Self {
        Self::new(opcode::LOADIMAGE).u32(ptr).u32(options)
    }

    /// `CMD_GETPROPS` with its result placeholders
    pub fn getprops() -> Self {
        Self::new(opcode::GETPROPS).u32(0).u32(0).u32(0)
    }

    pub fn snapshot(ptr: u32) -> Self {
        Self::new(opcode::SNAPSHOT).u32(ptr)
    }

    // FT81x only

    pub fn snapshot2(format: u32, ptr: u32, x: i16, y: i16, w: i16, h: i16) -> Self {
        Self::new(opcode::SNAPSHOT2)
            .u32(format)
            .u32(ptr)
            .i16(x)
            .i16(y)
            .i16(w)
            .i16(h)
    }

    pub fn setrotate(rotation: u32) -> Self {
        Self::new(opcode::SETROTATE).u32(rotation)
    }

    pub fn setbase(base: u32) -> Self {
        Self::new(opcode::SETBASE).u32(base)
    }

    pub fn setbitmap(addr: u32, format: u16, w: u16, h: u16) -> Self {
        Self::new(opcode::SETBITMAP)
            .u32(addr)
            .u16(format)
            .u16(w)
            .u16(h)
            .u16(0)
    }

    pub fn mediafifo(ptr: u32, size: u32) -> Self {
        Self::new(opcode::MEDIAFIFO).u32(ptr).u32(size)
    }

    pub fn playvideo(options: u32) -> Self {
        Self::new(opcode::PLAYVIDEO).u32(options)
    }

    pub fn videoframe(dest: u32, result_ptr: u32) -> Self {
        Self::new(opcode::VIDEOFRAME).u32(dest).u32(result_ptr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_padding_values() {
        assert_eq!(padding(0), 0);
        assert_eq!(padding(1), 3);
        assert_eq!(padding(2), 2);
        assert_eq!(padding(3), 1);
        assert_eq!(padding(4), 0);
        assert_eq!(padded_len(13), 16);
    }

    #[test]
    fn test_text_record_layout() {
        let rec = Record::text(10, -2, 27, opt::OPT_CENTER);
        assert_eq!(
            rec.as_bytes(),
            &[0x0C, 0xFF, 0xFF, 0xFF, 10, 0, 0xFE, 0xFF, 27, 0, 0x00, 0x06]
        );
    }

    #[test]
    fn test_number_carries_font() {
        let rec = Record::number(1, 2, 26, 0, -5);
        assert_eq!(rec.len(), 16);
        assert_eq!(&rec.as_bytes()[8..10], &26i16.to_le_bytes());
        assert_eq!(&rec.as_bytes()[12..16], &(-5i32).to_le_bytes());
    }

    #[test]
    fn test_toggle_state_word() {
        let on = Record::toggle(0, 0, 40, 26, 0, true);
        let off = Record::toggle(0, 0, 40, 26, 0, false);
        assert_eq!(&on.as_bytes()[14..16], &[0xFF, 0xFF]);
        assert_eq!(&off.as_bytes()[14..16], &[0x00, 0x00]);
    }

    #[test]
    fn test_string_records_are_aligned() {
        // Strings are streamed right after these, so the fixed part must
        // already sit on a word boundary.
        assert_eq!(Record::text(0, 0, 0, 0).len() % 4, 0);
        assert_eq!(Record::button(0, 0, 0, 0, 0, 0).len() % 4, 0);
        assert_eq!(Record::keys(0, 0, 0, 0, 0, 0).len() % 4, 0);
        assert_eq!(Record::toggle(0, 0, 0, 0, 0, false).len() % 4, 0);
    }

    #[test]
    fn test_records_fit_capacity() {
        let largest = [
            Record::getmatrix(),
            Record::gradient(0, 0, 0, 0, 0, 0),
            Record::clock(0, 0, 0, 0, 0, 0, 0, 0),
            Record::gauge(0, 0, 0, 0, 0, 0, 0, 0),
            Record::scrollbar(0, 0, 0, 0, 0, 0, 0, 0),
            Record::snapshot2(0, 0, 0, 0, 0, 0),
        ];
        for rec in largest.iter() {
            assert!(rec.len() <= MAX_RECORD_SIZE);
        }
        assert_eq!(Record::getmatrix().len(), 28);
        assert_eq!(Record::clock(0, 0, 0, 0, 0, 0, 0, 0).len(), 20);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "MAX_RECORD_SIZE")]
    fn test_overlong_record_is_rejected() {
        let mut rec = Record::new(opcode::MEMSET);
        for i in 0..8 {
            rec = rec.u32(i);
        }
        assert!(rec.len() <= MAX_RECORD_SIZE);
    }

    #[test]
    fn test_memory_records() {
        let rec = Record::memcpy(0xF_0000, 0x30_0000, 600);
        assert_eq!(rec.opcode(), opcode::MEMCPY);
        assert_eq!(&rec.as_bytes()[4..8], &0xF_0000u32.to_le_bytes());
        assert_eq!(&rec.as_bytes()[8..12], &0x30_0000u32.to_le_bytes());
        assert_eq!(&rec.as_bytes()[12..16], &600u32.to_le_bytes());
    }

    #[test]
    fn test_is_command() {
        assert!(opcode::is_command(opcode::SWAP));
        assert!(!opcode::is_command(0x2600_0007));
    }

    proptest! {
        #[test]
        fn prop_padding_reaches_word_boundary(len in 0usize..10_000) {
            let pad = padding(len);
            prop_assert!(pad < 4);
            prop_assert_eq!((len + pad) % 4, 0);
        }
    }
}
