//! Simulated display module for unit tests
//!
//! [`FakeEve`] decodes SPI frames into register reads and writes against a
//! sparse memory image. Writes that publish the command ring run a small
//! coprocessor model: display-list words land in `RAM_DL`, memory commands
//! act on graphics RAM and widget strings are collected for inspection.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use clcd_core::config::LcdConfig;
use clcd_hal::{Clock, OutputPin, SpiBus};
use clcd_protocol::command::{opcode, padded_len, Record};
use clcd_protocol::memory::{CMD_DL_MASK, CMD_RING_MASK, CMD_RING_SIZE, DEVICE_ID, TOUCH_RAW_XY_IDLE};
use clcd_protocol::MemoryMap;
use embedded_hal::delay::DelayNs;

use crate::lcd::Lcd;
use crate::spi::SpiInterface;

/// `REG_CMDB_SPACE` when nothing is scripted
const CMDB_SPACE_IDLE: u32 = CMD_RING_SIZE - 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeError;

pub type FakeInterface = SpiInterface<FakeSpi, FakeCs>;
pub type FakeLcd<B> = Lcd<FakeInterface, B, FakeClock>;

struct State {
    map: MemoryMap,
    mem: HashMap<u32, u8>,

    selected: bool,
    frame: Vec<u8>,
    read_pos: usize,
    did_read: bool,
    failed: bool,
    transactions: usize,
    fail_next: bool,
    fail_at: Option<usize>,

    writes: Vec<(u32, Vec<u8>)>,
    last_header: Vec<u8>,
    host: Vec<[u8; 3]>,
    reads: HashMap<u32, usize>,

    cmdb_space: VecDeque<u32>,
    tags: VecDeque<u8>,
    auto_consume: bool,
    read_advance: u32,

    pending: Vec<u8>,
    dl_ptr: u32,
    commands: Vec<Vec<u32>>,
    strings: Vec<String>,
    swaps: usize,
    frequencies: Vec<u32>,
}

impl State {
    fn new(map: MemoryMap) -> Self {
        let mut state = Self {
            map,
            mem: HashMap::new(),
            selected: false,
            frame: Vec::new(),
            read_pos: 0,
            did_read: false,
            failed: false,
            transactions: 0,
            fail_next: false,
            fail_at: None,
            frequencies: Vec::new(),
            writes: Vec::new(),
            last_header: Vec::new(),
            host: Vec::new(),
            reads: HashMap::new(),
            cmdb_space: VecDeque::new(),
            tags: VecDeque::new(),
            auto_consume: true,
            read_advance: 0,
            pending: Vec::new(),
            dl_ptr: 0,
            commands: Vec::new(),
            strings: Vec::new(),
            swaps: 0,
        };
        state.poke(map.reg_id, &[DEVICE_ID]);
        state.poke(map.reg_touch_raw_xy, &TOUCH_RAW_XY_IDLE.to_le_bytes());
        state
    }

    fn peek(&self, addr: u32) -> u8 {
        self.mem.get(&addr).copied().unwrap_or(0)
    }

    fn peek32(&self, addr: u32) -> u32 {
        u32::from_le_bytes([
            self.peek(addr),
            self.peek(addr + 1),
            self.peek(addr + 2),
            self.peek(addr + 3),
        ])
    }

    fn poke(&mut self, addr: u32, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.mem.insert(addr + i as u32, *b);
        }
    }

    fn poke32(&mut self, addr: u32, value: u32) {
        self.poke(addr, &value.to_le_bytes());
    }

    fn check_failure(&mut self) -> Result<(), FakeError> {
        if self.fail_next {
            self.fail_next = false;
            self.failed = true;
            return Err(FakeError);
        }
        Ok(())
    }

    fn begin(&mut self) {
        self.selected = true;
        self.frame.clear();
        self.read_pos = 0;
        self.did_read = false;
        self.failed = false;
        if self.fail_at == Some(self.transactions) {
            self.fail_at = None;
            self.fail_next = true;
        }
        self.transactions += 1;
    }

    fn end(&mut self) {
        if !self.selected {
            return;
        }
        self.selected = false;
        if self.failed || self.frame.len() < 3 {
            return;
        }

        let frame = core::mem::take(&mut self.frame);
        if self.did_read {
            self.last_header = frame[..4.min(frame.len())].to_vec();
        } else if frame[0] & 0x80 != 0 {
            self.last_header = frame[..3].to_vec();
            let addr = header_addr(&frame);
            let payload = frame[3..].to_vec();
            self.on_write(addr, &payload);
            self.writes.push((addr, payload));
        } else {
            self.last_header = frame[..3].to_vec();
            self.host.push([frame[0], frame[1], frame[2]]);
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), FakeError> {
        self.check_failure()?;
        let addr = header_addr(&self.frame);
        if !self.did_read {
            self.did_read = true;
            self.on_read(addr);
        }
        let base = addr + self.read_pos as u32;
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.peek(base + i as u32);
        }
        self.read_pos += buf.len();
        Ok(())
    }

    fn on_read(&mut self, addr: u32) {
        *self.reads.entry(addr).or_insert(0) += 1;

        let map = self.map;
        if addr == map.reg_cmd_read && self.read_advance > 0 {
            let read = self.peek32(map.reg_cmd_read) & CMD_RING_MASK;
            let write = self.peek32(map.reg_cmd_write) & CMD_RING_MASK;
            let step = self.read_advance.min(write.wrapping_sub(read) & CMD_RING_MASK);
            self.poke32(map.reg_cmd_read, (read + step) & CMD_RING_MASK);
        } else if Some(addr) == map.reg_cmdb_space {
            let space = self.cmdb_space.pop_front().unwrap_or(CMDB_SPACE_IDLE);
            self.poke32(addr, space);
        } else if addr == map.reg_touch_tag {
            let tag = self.tags.pop_front().unwrap_or(0);
            self.poke(addr, &[tag]);
        }
    }

    fn on_write(&mut self, addr: u32, payload: &[u8]) {
        let map = self.map;
        if Some(addr) == map.reg_cmdb_write {
            self.pending.extend_from_slice(payload);
            self.interpret();
            let advance = payload.len() as u32;
            let write = (self.peek32(map.reg_cmd_write) + advance) & CMD_RING_MASK;
            self.poke32(map.reg_cmd_write, write);
            self.poke32(map.reg_cmd_read, write);
            return;
        }

        self.poke(addr, payload);
        let in_reset = self.peek(map.reg_cpureset) & 1 != 0;
        if addr == map.reg_cmd_write && self.auto_consume && !in_reset {
            self.consume();
        }
    }

    /// Run the coprocessor up to the published write pointer
    fn consume(&mut self) {
        let map = self.map;
        let mut read = self.peek32(map.reg_cmd_read) & CMD_RING_MASK;
        let write = self.peek32(map.reg_cmd_write) & CMD_RING_MASK;
        while read != write {
            let byte = self.peek(map.ram_cmd + read);
            self.pending.push(byte);
            read = (read + 1) & CMD_RING_MASK;
        }
        self.poke32(map.reg_cmd_read, write);
        self.interpret();
    }

    fn interpret(&mut self) {
        while let Some(used) = self.step() {
            self.pending.drain(..used);
        }
    }

    /// Execute the command at the head of `pending`, `None` if incomplete
    fn step(&mut self) -> Option<usize> {
        let word = |bytes: &[u8], i: usize| -> Option<u32> {
            let b = bytes.get(i * 4..i * 4 + 4)?;
            Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        };
        let pending = self.pending.clone();
        let op = word(&pending, 0)?;
        if !opcode::is_command(op) {
            self.dl_write(&op.to_le_bytes());
            return Some(4);
        }

        let fixed = fixed_words(op);
        let mut words = Vec::with_capacity(fixed);
        for i in 0..fixed {
            words.push(word(&pending, i)?);
        }
        let head = fixed * 4;

        let used = match op {
            opcode::TEXT | opcode::BUTTON | opcode::KEYS | opcode::TOGGLE => {
                let rest = &pending[head..];
                let nul = rest.iter().position(|b| *b == 0)?;
                let used = head + padded_len(nul + 1);
                if used > pending.len() {
                    return None;
                }
                self.strings
                    .push(String::from_utf8_lossy(&rest[..nul]).into_owned());
                used
            }
            opcode::MEMWRITE => {
                let num = words[2] as usize;
                let used = head + padded_len(num);
                if used > pending.len() {
                    return None;
                }
                let data = pending[head..head + num].to_vec();
                self.poke(words[1], &data);
                used
            }
            opcode::INFLATE | opcode::LOADIMAGE => pending.len(),
            _ => head,
        };

        match op {
            opcode::DLSTART => self.set_dl_ptr(0),
            opcode::SWAP => self.swaps += 1,
            opcode::MEMCPY => {
                let data = self.bytes(words[2], words[3]);
                self.poke(words[1], &data);
            }
            opcode::MEMSET => {
                let data = std::vec![words[2] as u8; words[3] as usize];
                self.poke(words[1], &data);
            }
            opcode::MEMZERO => {
                let data = std::vec![0; words[2] as usize];
                self.poke(words[1], &data);
            }
            opcode::APPEND => {
                let data = self.bytes(words[1], words[2]);
                self.dl_write(&data);
            }
            _ => {}
        }
        self.commands.push(words);
        Some(used)
    }

    fn bytes(&self, addr: u32, len: u32) -> Vec<u8> {
        (0..len).map(|i| self.peek(addr + i)).collect()
    }

    fn dl_write(&mut self, bytes: &[u8]) {
        let base = self.map.ram_dl + self.dl_ptr;
        self.poke(base, bytes);
        self.set_dl_ptr((self.dl_ptr + bytes.len() as u32) & CMD_DL_MASK);
    }

    fn set_dl_ptr(&mut self, ptr: u32) {
        self.dl_ptr = ptr;
        self.poke32(self.map.reg_cmd_dl, ptr);
    }
}

fn header_addr(frame: &[u8]) -> u32 {
    ((frame[0] as u32 & 0x3F) << 16) | ((frame[1] as u32) << 8) | frame[2] as u32
}

/// Words in the fixed part of a command, opcode included
fn fixed_words(op: u32) -> usize {
    let rec = match op {
        opcode::INTERRUPT => Record::interrupt(0),
        opcode::BGCOLOR => Record::bgcolor(0),
        opcode::FGCOLOR => Record::fgcolor(0),
        opcode::GRADCOLOR => Record::gradcolor(0),
        opcode::GRADIENT => Record::gradient(0, 0, 0, 0, 0, 0),
        opcode::TRANSLATE => Record::translate(0, 0),
        opcode::SCALE => Record::scale(0, 0),
        opcode::ROTATE => Record::rotate(0),
        opcode::GETMATRIX => Record::getmatrix(),
        opcode::SETFONT => Record::setfont(0, 0),
        opcode::SETFONT2 => Record::setfont2(0, 0, 0),
        opcode::SETSCRATCH => Record::setscratch(0),
        opcode::ROMFONT => Record::romfont(0, 0),
        opcode::TEXT => Record::text(0, 0, 0, 0),
        opcode::BUTTON => Record::button(0, 0, 0, 0, 0, 0),
        opcode::KEYS => Record::keys(0, 0, 0, 0, 0, 0),
        opcode::NUMBER => Record::number(0, 0, 0, 0, 0),
        opcode::TOGGLE => Record::toggle(0, 0, 0, 0, 0, false),
        opcode::PROGRESS => Record::progress(0, 0, 0, 0, 0, 0, 0),
        opcode::SLIDER => Record::slider(0, 0, 0, 0, 0, 0, 0),
        opcode::SCROLLBAR => Record::scrollbar(0, 0, 0, 0, 0, 0, 0, 0),
        opcode::GAUGE => Record::gauge(0, 0, 0, 0, 0, 0, 0, 0),
        opcode::DIAL => Record::dial(0, 0, 0, 0, 0),
        opcode::CLOCK => Record::clock(0, 0, 0, 0, 0, 0, 0, 0),
        opcode::SPINNER => Record::spinner(0, 0, 0, 0),
        opcode::SKETCH => Record::sketch(0, 0, 0, 0, 0, 0),
        opcode::TRACK => Record::track(0, 0, 0, 0, 0),
        opcode::CALIBRATE => Record::calibrate(),
        opcode::MEMCRC => Record::memcrc(0, 0),
        opcode::REGREAD => Record::regread(0),
        opcode::MEMWRITE => Record::memwrite(0, 0),
        opcode::MEMSET => Record::memset(0, 0, 0),
        opcode::MEMZERO => Record::memzero(0, 0),
        opcode::MEMCPY => Record::memcpy(0, 0, 0),
        opcode::APPEND => Record::append(0, 0),
        opcode::INFLATE => Record::inflate(0),
        opcode::GETPTR => Record::getptr(),
        opcode::LOADIMAGE => Record::loadimage(0, 0),
        opcode::GETPROPS => Record::getprops(),
        opcode::SNAPSHOT => Record::snapshot(0),
        opcode::SNAPSHOT2 => Record::snapshot2(0, 0, 0, 0, 0, 0),
        opcode::SETROTATE => Record::setrotate(0),
        opcode::SETBASE => Record::setbase(0),
        opcode::SETBITMAP => Record::setbitmap(0, 0, 0, 0),
        opcode::MEDIAFIFO => Record::mediafifo(0, 0),
        opcode::PLAYVIDEO => Record::playvideo(0),
        opcode::VIDEOFRAME => Record::videoframe(0, 0),
        _ => return 1,
    };
    padded_len(rec.len()) / 4
}

/// Handle to a simulated module; clones share the same device
#[derive(Clone)]
pub struct FakeEve {
    state: Rc<RefCell<State>>,
    clock: FakeClock,
}

impl FakeEve {
    pub fn new(map: MemoryMap) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::new(map))),
            clock: FakeClock::new(),
        }
    }

    /// Register transport wired to this device
    pub fn interface(&self) -> FakeInterface {
        SpiInterface::new(FakeSpi(self.state.clone()), FakeCs(self.state.clone()))
    }

    /// Module handle driven by the shared clock
    pub fn lcd<B: crate::fifo::FifoBackend>(&self, fifo: B, config: LcdConfig) -> FakeLcd<B> {
        let map = self.state.borrow().map;
        Lcd::new(self.interface(), fifo, self.clock(), map, config)
    }

    pub fn clock(&self) -> FakeClock {
        self.clock.clone()
    }

    pub fn poke32(&self, addr: u32, value: u32) {
        self.state.borrow_mut().poke32(addr, value);
    }

    pub fn peek8(&self, addr: u32) -> u8 {
        self.state.borrow().peek(addr)
    }

    pub fn peek16(&self, addr: u32) -> u16 {
        let state = self.state.borrow();
        u16::from_le_bytes([state.peek(addr), state.peek(addr + 1)])
    }

    pub fn peek32(&self, addr: u32) -> u32 {
        self.state.borrow().peek32(addr)
    }

    pub fn peek_bytes(&self, addr: u32, len: usize) -> Vec<u8> {
        self.state.borrow().bytes(addr, len as u32)
    }

    /// Every completed write transaction, in order
    pub fn writes(&self) -> Vec<(u32, Vec<u8>)> {
        self.state.borrow().writes.clone()
    }

    pub fn last_write(&self) -> (u32, Vec<u8>) {
        self.state
            .borrow()
            .writes
            .last()
            .cloned()
            .unwrap_or((0, Vec::new()))
    }

    pub fn last_header(&self) -> Vec<u8> {
        self.state.borrow().last_header.clone()
    }

    pub fn host_commands(&self) -> Vec<[u8; 3]> {
        self.state.borrow().host.clone()
    }

    pub fn is_selected(&self) -> bool {
        self.state.borrow().selected
    }

    /// Whether publishing `REG_CMD_WRITE` runs the coprocessor at once
    pub fn set_auto_consume(&self, on: bool) {
        self.state.borrow_mut().auto_consume = on;
    }

    /// Bytes the coprocessor drains each time `REG_CMD_READ` is read
    pub fn set_read_advance(&self, bytes: u32) {
        self.state.borrow_mut().read_advance = bytes;
    }

    /// Run the coprocessor over everything published so far
    pub fn consume(&self) {
        self.state.borrow_mut().consume();
    }

    /// Values returned by successive `REG_CMDB_SPACE` reads
    pub fn script_cmdb_space(&self, values: &[u32]) {
        self.state.borrow_mut().cmdb_space.extend(values.iter().copied());
    }

    /// Values returned by successive `REG_TOUCH_TAG` reads, then 0
    pub fn script_tags(&self, tags: &[u8]) {
        self.state.borrow_mut().tags.extend(tags.iter().copied());
    }

    pub fn read_count(&self, addr: u32) -> usize {
        self.state.borrow().reads.get(&addr).copied().unwrap_or(0)
    }

    pub fn transaction_count(&self) -> usize {
        self.state.borrow().transactions
    }

    /// Fixed words of each executed coprocessor command
    pub fn commands(&self) -> Vec<Vec<u32>> {
        self.state.borrow().commands.clone()
    }

    pub fn strings(&self) -> Vec<String> {
        self.state.borrow().strings.clone()
    }

    /// Display list built by the coprocessor since the last `DLSTART`
    pub fn dl_words(&self) -> Vec<u32> {
        let state = self.state.borrow();
        (0..state.dl_ptr / 4)
            .map(|i| state.peek32(state.map.ram_dl + i * 4))
            .collect()
    }

    pub fn swaps(&self) -> usize {
        self.state.borrow().swaps
    }

    /// Every bus clock the driver asked for, in order
    pub fn bus_frequencies(&self) -> Vec<u32> {
        self.state.borrow().frequencies.clone()
    }

    /// Fail the next bus operation
    pub fn fail_next_transfer(&self) {
        self.state.borrow_mut().fail_next = true;
    }

    /// Fail the transaction `n` transactions from now, counting from 0
    pub fn fail_transaction(&self, n: usize) {
        let mut state = self.state.borrow_mut();
        state.fail_at = Some(state.transactions + n);
    }
}

pub struct FakeSpi(Rc<RefCell<State>>);

impl SpiBus for FakeSpi {
    type Error = FakeError;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), FakeError> {
        self.write(write)?;
        read.fill(0);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), FakeError> {
        let mut state = self.0.borrow_mut();
        state.check_failure()?;
        state.frame.extend_from_slice(data);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), FakeError> {
        self.0.borrow_mut().read(buf)
    }

    fn set_frequency(&mut self, hz: u32) -> Result<(), FakeError> {
        self.0.borrow_mut().frequencies.push(hz);
        Ok(())
    }
}

/// Chip select; a low-to-high cycle delimits one transaction
pub struct FakeCs(Rc<RefCell<State>>);

impl OutputPin for FakeCs {
    fn set_high(&mut self) {
        self.0.borrow_mut().end();
    }

    fn set_low(&mut self) {
        self.0.borrow_mut().begin();
    }

    fn is_set_high(&self) -> bool {
        !self.0.borrow().selected
    }
}

/// Manually advanced millisecond clock; clones share the same time
#[derive(Clone, Default)]
pub struct FakeClock {
    now: Rc<Cell<u32>>,
    step: Rc<Cell<u32>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    /// Advance by `ms` after every reading
    pub fn set_step(&self, ms: u32) {
        self.step.set(ms);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.step.get()));
        now
    }
}

/// Delay that only accumulates the requested time
#[derive(Default)]
pub struct NoDelay {
    ns: u64,
}

impl NoDelay {
    pub fn total_ms(&self) -> u32 {
        (self.ns / 1_000_000) as u32
    }
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += ns as u64;
    }
}

#[derive(Default)]
pub struct FakePin {
    high: bool,
    pub history: Vec<bool>,
}

impl OutputPin for FakePin {
    fn set_high(&mut self) {
        self.high = true;
        self.history.push(true);
    }

    fn set_low(&mut self) {
        self.high = false;
        self.history.push(false);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
