use crate::cpu::exec::Flow;
use crate::cpu::table::Cond;
use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// JR e8 / JR cc,e8. The offset is relative to the end of the 2-byte
    /// instruction, which `Flow::Relative` accounts for.
    pub(super) fn exec_jr<B: Bus>(&mut self, bus: &mut B, cc: Option<Cond>) -> Flow {
        let offset = self.imm8(bus) as i8;
        if self.condition(cc) {
            Flow::Relative(offset)
        } else {
            Flow::Next
        }
    }

    pub(super) fn exec_jp<B: Bus>(&mut self, bus: &mut B, cc: Option<Cond>) -> Flow {
        let addr = self.imm16(bus);
        if self.condition(cc) {
            Flow::Jump(addr)
        } else {
            Flow::Next
        }
    }

    pub(super) fn exec_call<B: Bus>(&mut self, bus: &mut B, cc: Option<Cond>, length: u8) -> Flow {
        let addr = self.imm16(bus);
        if !self.condition(cc) {
            return Flow::Next;
        }
        let ret = self.regs.pc.wrapping_add(length as u16);
        self.push_u16(bus, ret);
        Flow::Jump(addr)
    }

    pub(super) fn exec_ret<B: Bus>(&mut self, bus: &mut B, cc: Option<Cond>) -> Flow {
        if !self.condition(cc) {
            return Flow::Next;
        }
        Flow::Jump(self.pop_u16(bus))
    }

    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) -> Flow {
        self.ime = true;
        Flow::Jump(self.pop_u16(bus))
    }

    /// RST pushes the address of the next instruction, like a one-byte CALL.
    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, vector: u16, length: u8) -> Flow {
        let ret = self.regs.pc.wrapping_add(length as u16);
        self.push_u16(bus, ret);
        Flow::Jump(vector)
    }
}
