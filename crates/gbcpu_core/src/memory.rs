use crate::cpu::Bus;
use crate::error::{CpuError, Result};

/// Size of the flat address space, 0x0000..=0xFFFF.
pub const ADDRESS_SPACE: usize = 0x1_0000;
/// First address of the memory-mapped IO page.
pub const IO_BASE: u16 = 0xFF00;

/// Address of `offset` within the IO page, as used by LDH and LD (C).
#[inline]
pub fn io_address(offset: u8) -> u16 {
    IO_BASE + offset as u16
}

/// Flat 64 KiB memory.
///
/// ROM is loaded at address 0 and stays writable, mirroring plain-array
/// semantics. The IO page at 0xFF00 is ordinary storage here; peripherals
/// that want side effects wrap `Memory` in their own `Bus`.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8; ADDRESS_SPACE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("len", &ADDRESS_SPACE)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..] == other.bytes[..]
    }
}

impl Eq for Memory {}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; ADDRESS_SPACE]),
        }
    }

    /// Memory with `image` copied in from address 0.
    pub fn with_image(image: &[u8]) -> Result<Self> {
        let mut memory = Self::new();
        memory.load_image(image)?;
        Ok(memory)
    }

    /// Copy `image` into memory starting at address 0.
    ///
    /// Images larger than the address space are rejected rather than
    /// truncated.
    pub fn load_image(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > ADDRESS_SPACE {
            return Err(CpuError::AddressOutOfRange { addr: image.len() - 1 });
        }
        self.bytes[..image.len()].copy_from_slice(image);
        log::debug!("loaded {} byte image at 0x0000", image.len());
        Ok(())
    }

    #[inline]
    pub fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    #[inline]
    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }

    /// Little-endian word: the byte at `addr` is the least significant.
    #[inline]
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    #[inline]
    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl Bus for Memory {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.read_byte(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.write_byte(addr, value);
    }
}
