use crate::cpu::exec::Flow;
use crate::cpu::table::Target;
use crate::cpu::{Bus, Cpu, Reg16};

impl Cpu {
    pub(super) fn exec_inc8<B: Bus>(&mut self, bus: &mut B, target: Target) -> Flow {
        let value = self.read_target(bus, target);
        let result = self.alu_inc8(value);
        self.write_target(bus, target, result);
        Flow::Next
    }

    pub(super) fn exec_dec8<B: Bus>(&mut self, bus: &mut B, target: Target) -> Flow {
        let value = self.read_target(bus, target);
        let result = self.alu_dec8(value);
        self.write_target(bus, target, result);
        Flow::Next
    }

    /// 16-bit INC never touches the flags.
    pub(super) fn exec_inc16(&mut self, rr: Reg16) -> Flow {
        let value = self.regs.get16(rr).wrapping_add(1);
        self.regs.set16(rr, value);
        Flow::Next
    }

    pub(super) fn exec_dec16(&mut self, rr: Reg16) -> Flow {
        let value = self.regs.get16(rr).wrapping_sub(1);
        self.regs.set16(rr, value);
        Flow::Next
    }
}
