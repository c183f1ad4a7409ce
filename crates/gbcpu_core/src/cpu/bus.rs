/// Abstraction over the Game Boy bus (memory and IO).
///
/// The CPU only ever sees bytes at 16-bit addresses. Whether an address in
/// the 0xFF00 page is plain storage or a peripheral register is the bus
/// implementation's business, not the CPU's.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Little-endian 16-bit read: the byte at `addr` is the low byte.
    fn read16(&mut self, addr: u16) -> u16 {
        let lo = self.read8(addr);
        let hi = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Little-endian 16-bit write, mirroring `read16`.
    fn write16(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr, lo);
        self.write8(addr.wrapping_add(1), hi);
    }
}
