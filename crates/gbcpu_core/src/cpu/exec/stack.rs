use crate::cpu::exec::Flow;
use crate::cpu::{Bus, Cpu, Reg16};

impl Cpu {
    pub(super) fn exec_push<B: Bus>(&mut self, bus: &mut B, rr: Reg16) -> Flow {
        let value = self.regs.get16(rr);
        self.push_u16(bus, value);
        Flow::Next
    }

    /// POP AF drops the low nibble of F through `Registers::set16`.
    pub(super) fn exec_pop<B: Bus>(&mut self, bus: &mut B, rr: Reg16) -> Flow {
        let value = self.pop_u16(bus);
        self.regs.set16(rr, value);
        Flow::Next
    }
}
