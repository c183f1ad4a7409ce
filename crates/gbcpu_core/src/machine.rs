use crate::cpu::Cpu;
use crate::error::Result;
use crate::memory::Memory;

/// CPU plus the memory it runs against.
///
/// This is the unit of ownership for a run: the scheduler holds one
/// `Machine` for the lifetime of the loop and snapshots capture one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Machine {
    pub cpu: Cpu,
    pub memory: Memory,
}

impl Machine {
    pub fn new(cpu: Cpu, memory: Memory) -> Self {
        Self { cpu, memory }
    }

    /// Machine for a ROM image mapped at 0x0000.
    ///
    /// A 256-byte image is treated as the DMG boot ROM and started at
    /// 0x0000 with cleared registers; anything larger starts at 0x0100 in
    /// the post-boot register state.
    pub fn from_rom(rom: &[u8]) -> Result<Self> {
        let memory = Memory::with_image(rom)?;
        let cpu = if rom.len() <= BOOT_ROM_SIZE {
            Cpu::new()
        } else {
            Cpu::post_boot()
        };
        Ok(Self { cpu, memory })
    }

    /// Execute one instruction (or interrupt entry) and return its T-cycles.
    pub fn step(&mut self) -> Result<u32> {
        self.cpu.step(&mut self.memory)
    }
}

/// Size of the DMG boot ROM.
pub const BOOT_ROM_SIZE: usize = 0x100;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::io_address;

    #[test]
    fn boot_rom_sized_image_starts_at_zero() {
        let machine = Machine::from_rom(&[0x31; BOOT_ROM_SIZE]).unwrap();
        assert_eq!(machine.cpu.regs.pc, 0x0000);
        assert_eq!(machine.cpu.regs.sp, 0x0000);
    }

    #[test]
    fn cartridge_image_starts_in_post_boot_state() {
        let machine = Machine::from_rom(&[0u8; 0x8000]).unwrap();
        assert_eq!(machine.cpu.regs.pc, 0x0100);
        assert_eq!(machine.cpu.regs.sp, 0xFFFE);
        assert_eq!(machine.cpu.regs.af(), 0x01B0);
    }

    #[test]
    fn ldh_lands_in_the_io_page() {
        // LD A,0x91; LDH (0x47),A
        let mut machine = Machine::new(
            Cpu::new(),
            Memory::with_image(&[0x3E, 0x91, 0xE0, 0x47]).unwrap(),
        );
        machine.step().unwrap();
        machine.step().unwrap();
        assert_eq!(machine.memory.read_byte(io_address(0x47)), 0x91);
    }
}
