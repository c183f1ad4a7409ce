mod alu;
mod bus;
mod cb;
mod exec;
mod helpers;
mod interrupts;
mod regs;
pub mod table;


use std::fmt;

pub use bus::Bus;
pub use interrupts::{Interrupt, IE_ADDR, IF_ADDR};
pub use regs::{Flag, FlagBit, Reg16, Reg8, Registers};

use crate::error::{CpuError, Result};

/// Game Boy CPU core.
///
/// Holds the register file plus the control state that survives between
/// instructions (`ime`, `halted`, `stopped` and the delayed EI latch).
/// Memory is not owned here: every operation takes a `Bus`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cpu {
    pub regs: Registers,
    pub ime: bool,
    pub halted: bool,
    /// STOP low-power state. Treated like HALT: cleared by the next
    /// pending interrupt.
    pub stopped: bool,
    /// EI seen; IME turns on after the following instruction.
    pub(crate) ime_enable_pending: bool,
    pub(crate) ime_enable_delay: bool,
}

impl Cpu {
    /// A CPU with every register cleared and PC at 0x0000, ready to run a
    /// boot ROM mapped at the bottom of memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A CPU in the state the DMG boot ROM leaves behind, PC at 0x0100.
    pub fn post_boot() -> Self {
        Self {
            regs: Registers::dmg_post_boot(),
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        let bit = flag as u8;
        (self.regs.f & (1 << bit)) != 0
    }

    #[inline]
    pub fn set_flag<V: FlagBit>(&mut self, flag: Flag, value: V) {
        let bit = flag as u8;
        if value.flag_bit() {
            self.regs.f |= 1 << bit;
        } else {
            self.regs.f &= !(1 << bit);
        }
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.f = 0;
    }

    #[inline]
    pub fn get8(&self, reg: Reg8) -> u8 {
        self.regs.get8(reg)
    }

    #[inline]
    pub fn set8(&mut self, reg: Reg8, value: u8) {
        self.regs.set8(reg, value);
    }

    #[inline]
    pub fn get16(&self, reg: Reg16) -> u16 {
        self.regs.get16(reg)
    }

    #[inline]
    pub fn set16(&mut self, reg: Reg16, value: u16) {
        self.regs.set16(reg, value);
    }

    /// Read a register by its textual name ("A", "hl", "SP", ...).
    pub fn get_by_name(&self, name: &str) -> Result<u16> {
        if let Ok(reg) = name.parse::<Reg8>() {
            return Ok(self.get8(reg) as u16);
        }
        let reg = name
            .parse::<Reg16>()
            .map_err(|_| CpuError::InvalidRegisterName(name.to_string()))?;
        Ok(self.get16(reg))
    }

    /// Write a register by its textual name. 8-bit registers keep the low
    /// byte of `value`.
    pub fn set_by_name(&mut self, name: &str, value: u16) -> Result<()> {
        if let Ok(reg) = name.parse::<Reg8>() {
            self.set8(reg, value as u8);
            return Ok(());
        }
        let reg = name
            .parse::<Reg16>()
            .map_err(|_| CpuError::InvalidRegisterName(name.to_string()))?;
        self.set16(reg, value);
        Ok(())
    }

    /// Move PC by a signed amount, wrapping at 16 bits.
    #[inline]
    pub fn advance_pc(&mut self, delta: i32) {
        self.regs.pc = self.regs.pc.wrapping_add(delta as u16);
    }

    #[inline]
    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    /// Move SP by a signed amount, wrapping at 16 bits.
    #[inline]
    pub fn advance_sp(&mut self, delta: i32) {
        self.regs.sp = self.regs.sp.wrapping_add(delta as u16);
    }

    #[inline]
    pub fn set_sp(&mut self, value: u16) {
        self.regs.sp = value;
    }

    /// Execute a single instruction (or interrupt entry) and return the
    /// number of T-cycles taken.
    ///
    /// An opcode hole is reported as `UnimplementedOpcode` before anything
    /// is mutated, so the state seen by the caller is the state at the
    /// offending fetch.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32> {
        if let Some(cycles) = self.handle_interrupts(bus) {
            return Ok(cycles);
        }

        if self.halted || self.stopped {
            // Idle until an interrupt becomes pending.
            return Ok(4);
        }

        let pc = self.regs.pc;
        let opcode = bus.read8(pc);
        let Some(instr) = table::lookup(opcode) else {
            return Err(CpuError::UnimplementedOpcode { opcode, pc });
        };

        log::trace!(
            "PC: 0x{pc:04X} OPCODE: 0x{opcode:02X} {mnemonic}",
            mnemonic = instr.mnemonic
        );

        let cycles = self.execute(bus, instr);
        self.apply_ime_delay();
        Ok(cycles)
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.regs;
        writeln!(
            f,
            "A=0x{:02X} F=0x{:02X} B=0x{:02X} C=0x{:02X} D=0x{:02X} E=0x{:02X} H=0x{:02X} L=0x{:02X}",
            r.a, r.f, r.b, r.c, r.d, r.e, r.h, r.l
        )?;
        writeln!(
            f,
            "AF=0x{:04X} BC=0x{:04X} DE=0x{:04X} HL=0x{:04X}",
            r.af(),
            r.bc(),
            r.de(),
            r.hl()
        )?;
        writeln!(
            f,
            "Z={} N={} H={} C={}",
            self.get_flag(Flag::Z) as u8,
            self.get_flag(Flag::N) as u8,
            self.get_flag(Flag::H) as u8,
            self.get_flag(Flag::C) as u8
        )?;
        write!(
            f,
            "PC=0x{:04X} SP=0x{:04X} IME={} HALTED={} STOPPED={}",
            r.pc, r.sp, self.ime, self.halted, self.stopped
        )
    }
}
