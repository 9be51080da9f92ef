//! Coprocessor register access
//!
//! The coprocessor exposes registers, graphics RAM, display-list RAM and
//! command RAM in one 22-bit address space. Every access uses the same
//! framing, so one trait covers all of them.

use clcd_protocol::HostCommand;

/// Addressed access to the coprocessor memory space
///
/// Implementors provide the three bus primitives; the fixed-width helpers
/// are built on top of them. All values are little-endian on the wire.
pub trait RegisterAccess {
    /// Bus error type
    type Error;

    /// Read `buf.len()` bytes starting at `addr`
    fn read_bulk(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `chunks` back to back starting at `addr`, followed by
    /// `padding` zero bytes, in a single transaction
    fn write_chunks(
        &mut self,
        addr: u32,
        chunks: &[&[u8]],
        padding: usize,
    ) -> Result<(), Self::Error>;

    /// Send a 3-byte host command
    fn host_command(&mut self, cmd: HostCommand, param: u8) -> Result<(), Self::Error>;

    /// Change the bus clock, where the transport supports it
    fn set_bus_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        let _ = hz;
        Ok(())
    }

    /// Write `data` at `addr` followed by `padding` zero bytes
    fn write_bulk(&mut self, addr: u32, data: &[u8], padding: usize) -> Result<(), Self::Error> {
        self.write_chunks(addr, &[data], padding)
    }

    fn read8(&mut self, addr: u32) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_bulk(addr, &mut buf)?;
        Ok(buf[0])
    }

    fn read16(&mut self, addr: u32) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.read_bulk(addr, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read32(&mut self, addr: u32) -> Result<u32, Self::Error> {
        let mut buf = [0u8; 4];
        self.read_bulk(addr, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn write8(&mut self, addr: u32, value: u8) -> Result<(), Self::Error> {
        self.write_bulk(addr, &[value], 0)
    }

    fn write16(&mut self, addr: u32, value: u16) -> Result<(), Self::Error> {
        self.write_bulk(addr, &value.to_le_bytes(), 0)
    }

    fn write32(&mut self, addr: u32, value: u32) -> Result<(), Self::Error> {
        self.write_bulk(addr, &value.to_le_bytes(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat 64 KiB memory, no framing
    struct FlatMemory {
        mem: [u8; 0x1_0000],
        host: Option<(HostCommand, u8)>,
    }

    impl RegisterAccess for FlatMemory {
        type Error = ();

        fn read_bulk(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), ()> {
            let start = addr as usize;
            buf.copy_from_slice(&self.mem[start..start + buf.len()]);
            Ok(())
        }

        fn write_chunks(&mut self, addr: u32, chunks: &[&[u8]], padding: usize) -> Result<(), ()> {
            let mut at = addr as usize;
            for chunk in chunks {
                self.mem[at..at + chunk.len()].copy_from_slice(chunk);
                at += chunk.len();
            }
            for byte in &mut self.mem[at..at + padding] {
                *byte = 0;
            }
            Ok(())
        }

        fn host_command(&mut self, cmd: HostCommand, param: u8) -> Result<(), ()> {
            self.host = Some((cmd, param));
            Ok(())
        }
    }

    fn memory() -> FlatMemory {
        FlatMemory {
            mem: [0xAA; 0x1_0000],
            host: None,
        }
    }

    #[test]
    fn test_fixed_width_little_endian() {
        let mut m = memory();
        m.write32(0x100, 0x1234_5678).unwrap();
        assert_eq!(&m.mem[0x100..0x104], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(m.read16(0x100).unwrap(), 0x5678);
        assert_eq!(m.read8(0x103).unwrap(), 0x12);

        m.write16(0x200, 0xBEEF).unwrap();
        assert_eq!(m.read32(0x200).unwrap(), 0xAAAA_BEEF);
    }

    #[test]
    fn test_write_bulk_pads_with_zeros() {
        let mut m = memory();
        m.write_bulk(0x10, &[1, 2, 3], 1).unwrap();
        assert_eq!(&m.mem[0x10..0x15], &[1, 2, 3, 0, 0xAA]);
    }

    #[test]
    fn test_host_command_passthrough() {
        let mut m = memory();
        m.host_command(HostCommand::ClockExternal, 0).unwrap();
        assert_eq!(m.host, Some((HostCommand::ClockExternal, 0)));
    }
}
