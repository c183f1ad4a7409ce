use super::table::{Cond, Indirect, Target};
use super::{Bus, Cpu, Flag};

impl Cpu {
    /// Read an 8-bit register or the byte at (HL).
    #[inline]
    pub(super) fn read_target<B: Bus>(&self, bus: &mut B, target: Target) -> u8 {
        match target {
            Target::Reg(reg) => self.regs.get8(reg),
            Target::IndHL => bus.read8(self.regs.hl()),
        }
    }

    /// Write an 8-bit register or the byte at (HL).
    #[inline]
    pub(super) fn write_target<B: Bus>(&mut self, bus: &mut B, target: Target, value: u8) {
        match target {
            Target::Reg(reg) => self.regs.set8(reg, value),
            Target::IndHL => bus.write8(self.regs.hl(), value),
        }
    }

    /// Immediate byte following the opcode at PC.
    #[inline]
    pub(super) fn imm8<B: Bus>(&self, bus: &mut B) -> u8 {
        bus.read8(self.regs.pc.wrapping_add(1))
    }

    /// Little-endian immediate word following the opcode at PC.
    #[inline]
    pub(super) fn imm16<B: Bus>(&self, bus: &mut B) -> u16 {
        bus.read16(self.regs.pc.wrapping_add(1))
    }

    /// Resolve an `(rr)` operand, applying the HL post-increment or
    /// post-decrement of the `(HL+)`/`(HL-)` forms.
    pub(super) fn indirect_addr(&mut self, ind: Indirect) -> u16 {
        match ind {
            Indirect::BC => self.regs.bc(),
            Indirect::DE => self.regs.de(),
            Indirect::HLInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Indirect::HLDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    #[inline]
    pub(super) fn condition(&self, cc: Option<Cond>) -> bool {
        match cc {
            None => true,
            Some(Cond::NZ) => !self.get_flag(Flag::Z),
            Some(Cond::Z) => self.get_flag(Flag::Z),
            Some(Cond::NC) => !self.get_flag(Flag::C),
            Some(Cond::C) => self.get_flag(Flag::C),
        }
    }

    /// Push a word: high byte at SP-1, low byte at SP-2, SP ends 2 lower
    /// and points at the low byte.
    #[inline]
    pub fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    /// Pop a word pushed by `push_u16`: low byte at SP, high byte at SP+1.
    #[inline]
    pub fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let value = bus.read16(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }
}
