//! Display-list words
//!
//! Display-list instructions are single 32-bit words written either
//! directly into RAM_DL or through the command ring, where the coprocessor
//! copies them into the list it is building.

/// Drawing primitives for [`begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Primitive {
    Bitmaps = 1,
    Points = 2,
    Lines = 3,
    LineStrip = 4,
    EdgeStripR = 5,
    EdgeStripL = 6,
    EdgeStripA = 7,
    EdgeStripB = 8,
    Rects = 9,
}

/// Pack an RGB triple into the 24-bit colour used by colour commands
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// End of the display list
pub const DISPLAY: u32 = 0x0000_0000;

pub const fn clear(color: bool, stencil: bool, tag: bool) -> u32 {
    (0x26 << 24) | ((color as u32) << 2) | ((stencil as u32) << 1) | tag as u32
}

pub const fn clear_color_rgb(rgb: u32) -> u32 {
    (0x02 << 24) | (rgb & 0xFF_FFFF)
}

pub const fn clear_color_a(alpha: u8) -> u32 {
    (0x0F << 24) | alpha as u32
}

pub const fn color_rgb(rgb: u32) -> u32 {
    (0x04 << 24) | (rgb & 0xFF_FFFF)
}

pub const fn color_a(alpha: u8) -> u32 {
    (0x10 << 24) | alpha as u32
}

/// Tag subsequent graphics with `tag` for touch attribution
pub const fn tag(tag: u8) -> u32 {
    (0x03 << 24) | tag as u32
}

pub const fn tag_mask(enabled: bool) -> u32 {
    (0x14 << 24) | enabled as u32
}

pub const fn begin(primitive: Primitive) -> u32 {
    (0x1F << 24) | primitive as u32
}

pub const END: u32 = 0x21 << 24;

pub const SAVE_CONTEXT: u32 = 0x22 << 24;

pub const RESTORE_CONTEXT: u32 = 0x23 << 24;

/// Vertex in 1/16 pixel units
pub const fn vertex2f(x: i16, y: i16) -> u32 {
    (1 << 30) | (((x as u32) & 0x7FFF) << 15) | ((y as u32) & 0x7FFF)
}

/// Vertex in whole pixels, with bitmap handle and cell
pub const fn vertex2ii(x: u16, y: u16, handle: u8, cell: u8) -> u32 {
    (2 << 30)
        | (((x as u32) & 0x1FF) << 21)
        | (((y as u32) & 0x1FF) << 12)
        | (((handle as u32) & 0x1F) << 7)
        | ((cell as u32) & 0x7F)
}

/// Point radius in 1/16 pixel units
pub const fn point_size(size: u16) -> u32 {
    (0x0D << 24) | ((size as u32) & 0x1FFF)
}

/// Line width in 1/16 pixel units
pub const fn line_width(width: u16) -> u32 {
    (0x0E << 24) | ((width as u32) & 0xFFF)
}

pub const fn bitmap_handle(handle: u8) -> u32 {
    (0x05 << 24) | ((handle as u32) & 0x1F)
}

pub const fn cell(cell: u8) -> u32 {
    (0x06 << 24) | ((cell as u32) & 0x7F)
}
