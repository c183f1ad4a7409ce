use crate::cpu::exec::Flow;
use crate::cpu::table::{AluOp, ShiftOp, Target};
use crate::cpu::{Bus, Cpu, Flag, Reg16};

impl Cpu {
    pub(super) fn exec_alu<B: Bus>(&mut self, bus: &mut B, op: AluOp, src: Target) -> Flow {
        let value = self.read_target(bus, src);
        self.alu(op, value);
        Flow::Next
    }

    pub(super) fn exec_alu_imm<B: Bus>(&mut self, bus: &mut B, op: AluOp) -> Flow {
        let value = self.imm8(bus);
        self.alu(op, value);
        Flow::Next
    }

    /// RLCA/RRCA/RLA/RRA: the CB rotates applied to A, except that Z is
    /// always cleared.
    pub(super) fn exec_rotate_a(&mut self, op: ShiftOp) -> Flow {
        self.regs.a = self.alu_shift(op, self.regs.a);
        self.set_flag(Flag::Z, false);
        Flow::Next
    }

    pub(super) fn exec_add_hl(&mut self, rr: Reg16) -> Flow {
        let value = self.regs.get16(rr);
        self.alu_add16_hl(value);
        Flow::Next
    }

    pub(super) fn exec_add_sp_offset<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let imm = self.imm8(bus);
        self.regs.sp = self.alu_add16_signed(self.regs.sp, imm);
        Flow::Next
    }

    pub(super) fn exec_daa(&mut self) -> Flow {
        self.alu_daa();
        Flow::Next
    }

    pub(super) fn exec_cpl(&mut self) -> Flow {
        self.regs.a = !self.regs.a;
        self.set_flag(Flag::H, true);
        self.set_flag(Flag::N, true);
        Flow::Next
    }

    pub(super) fn exec_scf(&mut self) -> Flow {
        self.set_flag(Flag::C, true);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::N, false);
        Flow::Next
    }

    pub(super) fn exec_ccf(&mut self) -> Flow {
        let carry = self.get_flag(Flag::C);
        self.set_flag(Flag::C, !carry);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::N, false);
        Flow::Next
    }
}
