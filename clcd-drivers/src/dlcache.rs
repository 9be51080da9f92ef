//! Display-list cache in graphics RAM
//!
//! A screen's static background is built once, copied from `RAM_DL` into
//! graphics RAM, and replayed on later frames with a single `CMD_APPEND`.
//!
//! ```text
//! RAM_G end - region_size                                     RAM_G end
//! ┌─────────────────────────┬──────────┬─────────────────────────────┐
//! │ slot 0 │ slot 1 │ ...   │ free ptr │ fragment │ fragment │ ...   │
//! │ (addr, size) pairs      │          │ arena ──▶ grows upward      │
//! └─────────────────────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! `(0, 0)` marks an empty slot. Allocation is bump-only; the arena is
//! reclaimed as a whole by [`DlCache::init`].

use clcd_core::config::{CacheLayout, CACHE_SLOT_SIZE};
use clcd_core::traits::RegisterAccess;
use clcd_hal::Clock;
use clcd_protocol::memory::CMD_DL_MASK;
use clcd_protocol::padded_len;

use crate::cmd::CommandProcessor;
use crate::fifo::FifoBackend;
use crate::lcd::Lcd;

/// Handle on one cache slot
///
/// Loads the slot record on construction; the record itself lives in the
/// chip and outlives the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DlCache {
    slot: u16,
    /// Address of the slot record, `None` for slots past the table
    record: Option<u32>,
    addr: u32,
    size: u32,
}

/// Slot records fetched per bus transaction when scanning the table
const SCAN_BATCH: usize = 32;

fn layout<R, B, K>(lcd: &Lcd<R, B, K>) -> (CacheLayout, u32)
where
    R: RegisterAccess,
    B: FifoBackend,
    K: Clock,
{
    (lcd.config().cache, lcd.map().ram_g_end())
}

/// Bytes owned by the fragment at `addr`
///
/// Allocation is bump-only, so a fragment's space ends where the next
/// fragment starts, or at the free pointer for the newest one.
fn owned_extent<R, B, K>(lcd: &mut Lcd<R, B, K>, addr: u32) -> Result<u32, R::Error>
where
    R: RegisterAccess,
    B: FifoBackend,
    K: Clock,
{
    let (layout, end) = layout(lcd);
    let mut limit = lcd.regs().read32(layout.free_ptr_addr(end))?;

    let mut buf = [0u8; SCAN_BATCH * CACHE_SLOT_SIZE as usize];
    let mut slot = 0;
    while slot < layout.slots {
        let count = (layout.slots - slot).min(SCAN_BATCH as u16);
        let records = &mut buf[..count as usize * CACHE_SLOT_SIZE as usize];
        lcd.regs().read_bulk(layout.slot_addr(end, slot), records)?;
        for record in records.chunks_exact(CACHE_SLOT_SIZE as usize) {
            let other = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
            if other > addr && other < limit {
                limit = other;
            }
        }
        slot += count;
    }
    Ok(limit.saturating_sub(addr))
}

impl DlCache {
    /// Empty every slot and rewind the arena
    ///
    /// Must run again after anything overwrites graphics RAM wholesale.
    pub fn init<R, B, K>(lcd: &mut Lcd<R, B, K>) -> Result<(), R::Error>
    where
        R: RegisterAccess,
        B: FifoBackend,
        K: Clock,
    {
        let (layout, end) = layout(lcd);
        let table = layout.slots as usize * CACHE_SLOT_SIZE as usize;
        let regs = lcd.regs();
        regs.write_chunks(layout.base(end), &[], table)?;
        regs.write32(layout.free_ptr_addr(end), layout.arena_start(end))
    }

    /// Load the record of `slot`
    pub fn new<R, B, K>(lcd: &mut Lcd<R, B, K>, slot: u16) -> Result<Self, R::Error>
    where
        R: RegisterAccess,
        B: FifoBackend,
        K: Clock,
    {
        let (layout, end) = layout(lcd);
        if slot >= layout.slots {
            #[cfg(feature = "defmt")]
            defmt::warn!("DL cache slot {} out of range", slot);
            return Ok(Self {
                slot,
                record: None,
                addr: 0,
                size: 0,
            });
        }

        let record = layout.slot_addr(end, slot);
        let mut buf = [0u8; CACHE_SLOT_SIZE as usize];
        lcd.regs().read_bulk(record, &mut buf)?;
        let [a0, a1, a2, a3, s0, s1, s2, s3] = buf;
        Ok(Self {
            slot,
            record: Some(record),
            addr: u32::from_le_bytes([a0, a1, a2, a3]),
            size: u32::from_le_bytes([s0, s1, s2, s3]),
        })
    }

    pub fn slot(&self) -> u16 {
        self.slot
    }

    /// Arena address of the fragment, 0 if the slot owns none
    pub fn addr(&self) -> u32 {
        self.addr
    }

    /// Length of the stored fragment
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Whether the slot holds a fragment to replay
    pub fn has_data(&self) -> bool {
        !cfg!(feature = "dl-cache-disabled") && self.size != 0
    }

    /// Copy the display list built so far into the slot
    ///
    /// Flushes the FIFO and waits for the coprocessor so `REG_CMD_DL` holds
    /// the list length. A slot without space allocates `reserve` bytes (or
    /// the list length if `reserve` is 0) at the free pointer. A slot that
    /// already owns space reuses it and never grows: the list must fit in
    /// `reserve`, or in the previously stored size when `reserve` is 0, and
    /// never past the space allocated to the slot.
    ///
    /// Returns false, leaving the slot table and free pointer untouched,
    /// when the list is empty or does not fit. The list under construction
    /// is kept, so the caller can carry on drawing uncached.
    pub fn store<R, B, K>(&mut self, lcd: &mut Lcd<R, B, K>, reserve: u32) -> Result<bool, R::Error>
    where
        R: RegisterAccess,
        B: FifoBackend,
        K: Clock,
    {
        let Some(record) = self.record else {
            return Ok(false);
        };
        let (layout, end) = layout(lcd);
        let ram_dl = lcd.map().ram_dl;
        let reg_cmd_dl = lcd.map().reg_cmd_dl;

        lcd.execute()?;
        lcd.wait_until_idle()?;
        let measured = lcd.regs().read32(reg_cmd_dl)? & CMD_DL_MASK;
        if measured == 0 {
            return Ok(false);
        }

        let free_ptr = layout.free_ptr_addr(end);
        let (addr, budget, alloc) = if self.addr == 0 {
            let free = lcd.regs().read32(free_ptr)?;
            if free < layout.arena_start(end) || free > end {
                #[cfg(feature = "defmt")]
                defmt::error!("DL cache free pointer {=u32:#x} corrupt, run init", free);
                return Ok(false);
            }
            let alloc = padded_len(if reserve > 0 { reserve } else { measured } as usize) as u32;
            (free, end - free, alloc)
        } else {
            let wanted = if reserve > 0 { reserve } else { self.size };
            let owned = owned_extent(lcd, self.addr)?;
            (self.addr, wanted.min(owned), 0)
        };

        // A fresh reservation must also hold the list it is created for
        let fits = measured <= budget && alloc <= budget && (alloc == 0 || measured <= alloc);
        if !fits {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "DL cache slot {} full: need {}, have {}",
                self.slot,
                measured.max(alloc),
                budget
            );
            return Ok(false);
        }

        lcd.cmd()?.memcpy(addr, ram_dl, measured)?.execute()?;

        let mut entry = [0u8; CACHE_SLOT_SIZE as usize];
        entry[..4].copy_from_slice(&addr.to_le_bytes());
        entry[4..].copy_from_slice(&measured.to_le_bytes());
        lcd.regs().write_bulk(record, &entry, 0)?;
        if alloc > 0 {
            lcd.regs().write32(free_ptr, addr + alloc)?;
        }

        self.addr = addr;
        self.size = measured;
        Ok(true)
    }

    /// Replay the stored fragment into the list under construction
    ///
    /// Does nothing when the slot is empty.
    pub fn append<R, B, K>(&self, cmd: &mut CommandProcessor<'_, R, B, K>) -> Result<(), R::Error>
    where
        R: RegisterAccess,
        B: FifoBackend,
        K: Clock,
    {
        if self.has_data() {
            cmd.append(self.addr, self.size)?;
        }
        Ok(())
    }
}

impl<R, B, K> Lcd<R, B, K>
where
    R: RegisterAccess,
    B: FifoBackend,
    K: Clock,
{
    /// Draw a frame whose background is served from cache slot `slot`
    ///
    /// On a miss `background` is drawn and stored with `reserve` bytes; if
    /// it does not fit the frame is still drawn, just uncached. Returns true
    /// when the background came from the cache.
    pub fn refresh_cached<F, G>(
        &mut self,
        slot: u16,
        reserve: u32,
        background: F,
        foreground: G,
    ) -> Result<bool, R::Error>
    where
        F: FnOnce(&mut CommandProcessor<'_, R, B, K>) -> Result<(), R::Error>,
        G: FnOnce(&mut CommandProcessor<'_, R, B, K>) -> Result<(), R::Error>,
    {
        let mut cache = DlCache::new(self, slot)?;
        let hit = cache.has_data();
        {
            let mut cmd = self.cmd()?;
            cmd.dlstart()?;
            if hit {
                cache.append(&mut cmd)?;
            } else {
                background(&mut cmd)?;
            }
        }
        if !hit {
            cache.store(self, reserve)?;
        }

        let mut cmd = self.cmd()?;
        foreground(&mut cmd)?;
        cmd.dl(clcd_protocol::display_list::DISPLAY)?
            .swap()?
            .execute()?;
        Ok(hit)
    }

    /// Draw a frame without the cache
    pub fn refresh_uncached<F>(&mut self, draw: F) -> Result<(), R::Error>
    where
        F: FnOnce(&mut CommandProcessor<'_, R, B, K>) -> Result<(), R::Error>,
    {
        let mut cmd = self.cmd()?;
        cmd.dlstart()?;
        draw(&mut cmd)?;
        cmd.dl(clcd_protocol::display_list::DISPLAY)?
            .swap()?
            .execute()?;
        Ok(())
    }
}
