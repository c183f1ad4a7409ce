use bitflags::bitflags;

use super::{Bus, Cpu};

/// Interrupt flag register (IF) address.
pub const IF_ADDR: u16 = 0xFF0F;
/// Interrupt enable register (IE) address.
pub const IE_ADDR: u16 = 0xFFFF;

bitflags! {
    /// Interrupt lines as laid out in IE and IF, lowest bit = highest
    /// priority.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Interrupt: u8 {
        const VBLANK = 0x01;
        const LCD_STAT = 0x02;
        const TIMER = 0x04;
        const SERIAL = 0x08;
        const JOYPAD = 0x10;
    }
}

impl Interrupt {
    /// Entry vector of a single interrupt line (0x40, 0x48, ... 0x60).
    pub fn vector(self) -> u16 {
        0x0040 + (self.bits().trailing_zeros() as u16) * 8
    }

    /// Highest-priority line in the set, if any.
    pub fn highest(self) -> Option<Self> {
        let bits = self.bits();
        if bits == 0 {
            None
        } else {
            Some(Self::from_bits_truncate(bits & bits.wrapping_neg()))
        }
    }
}

impl Cpu {
    /// Lines that are both requested (IF) and enabled (IE).
    pub fn pending_interrupts<B: Bus>(&self, bus: &mut B) -> Interrupt {
        let ie = bus.read8(IE_ADDR);
        let iflags = bus.read8(IF_ADDR);
        Interrupt::from_bits_truncate(ie & iflags)
    }

    /// Handle maskable interrupts if IME is set and a pending interrupt exists.
    ///
    /// Any pending line wakes the CPU from HALT/STOP, even with IME clear.
    /// Returns `Some(cycles)` if an interrupt was taken, or `None` otherwise.
    pub(super) fn handle_interrupts<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        let irq = self.pending_interrupts(bus).highest()?;

        self.halted = false;
        self.stopped = false;
        if !self.ime {
            return None;
        }

        self.ime = false;
        let iflags = bus.read8(IF_ADDR);
        bus.write8(IF_ADDR, iflags & !irq.bits());

        let pc = self.regs.pc;
        self.push_u16(bus, pc);
        self.regs.pc = irq.vector();
        log::debug!(
            "interrupt {:?}: vector=0x{:04X} return=0x{:04X} sp=0x{:04X}",
            irq,
            self.regs.pc,
            pc,
            self.regs.sp
        );

        Some(20)
    }

    /// Apply delayed IME change requested by EI.
    #[inline]
    pub(super) fn apply_ime_delay(&mut self) {
        if self.ime_enable_delay {
            // Second step after EI: actually enable IME.
            self.ime = true;
            self.ime_enable_delay = false;
        } else if self.ime_enable_pending {
            // First step after EI: arm the delayed enable.
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }
}
