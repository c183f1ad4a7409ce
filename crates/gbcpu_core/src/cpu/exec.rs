mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use super::table::{Instruction, Op};
use super::{Bus, Cpu};

/// How PC moves once an instruction's effects have been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Flow {
    /// Fall through: PC += length.
    Next,
    /// Taken relative branch: PC += length + offset.
    Relative(i8),
    /// Absolute transfer: PC = target.
    Jump(u16),
}

impl Cpu {
    /// Execute a decoded instruction whose opcode sits at PC and return the
    /// number of T-cycles taken.
    ///
    /// Operands are read relative to the unmodified PC; PC itself is only
    /// moved at the very end, according to the returned `Flow`.
    pub(super) fn execute<B: Bus>(&mut self, bus: &mut B, instr: &Instruction) -> u32 {
        let mut extra = 0u32;

        let flow = match instr.op {
            Op::Nop => Flow::Next,
            Op::Stop => self.exec_stop(),
            Op::Halt => self.exec_halt(),
            Op::Di => self.exec_di(),
            Op::Ei => self.exec_ei(),

            Op::Ld { dst, src } => self.exec_ld(bus, dst, src),
            Op::LdImm8(target) => self.exec_ld_imm8(bus, target),
            Op::LdImm16(rr) => self.exec_ld_imm16(bus, rr),
            Op::StoreSp => self.exec_store_sp(bus),
            Op::StoreA(ind) => self.exec_store_a(bus, ind),
            Op::LoadA(ind) => self.exec_load_a(bus, ind),
            Op::StoreHighImm => self.exec_store_high_imm(bus),
            Op::LoadHighImm => self.exec_load_high_imm(bus),
            Op::StoreHighC => self.exec_store_high_c(bus),
            Op::LoadHighC => self.exec_load_high_c(bus),
            Op::StoreAbs => self.exec_store_abs(bus),
            Op::LoadAbs => self.exec_load_abs(bus),
            Op::LdSpHl => self.exec_ld_sp_hl(),
            Op::LdHlSpOffset => self.exec_ld_hl_sp_offset(bus),

            Op::Inc8(target) => self.exec_inc8(bus, target),
            Op::Dec8(target) => self.exec_dec8(bus, target),
            Op::Inc16(rr) => self.exec_inc16(rr),
            Op::Dec16(rr) => self.exec_dec16(rr),

            Op::AddHl(rr) => self.exec_add_hl(rr),
            Op::AddSpOffset => self.exec_add_sp_offset(bus),
            Op::Alu(op, src) => self.exec_alu(bus, op, src),
            Op::AluImm(op) => self.exec_alu_imm(bus, op),
            Op::RotateA(op) => self.exec_rotate_a(op),
            Op::Daa => self.exec_daa(),
            Op::Cpl => self.exec_cpl(),
            Op::Scf => self.exec_scf(),
            Op::Ccf => self.exec_ccf(),

            Op::Jr(cc) => self.exec_jr(bus, cc),
            Op::Jp(cc) => self.exec_jp(bus, cc),
            Op::JpHl => Flow::Jump(self.regs.hl()),
            Op::Call(cc) => self.exec_call(bus, cc, instr.length),
            Op::Ret(cc) => self.exec_ret(bus, cc),
            Op::Reti => self.exec_reti(bus),
            Op::Rst(vector) => self.exec_rst(bus, vector, instr.length),

            Op::Push(rr) => self.exec_push(bus, rr),
            Op::Pop(rr) => self.exec_pop(bus, rr),

            Op::PrefixCb => {
                let cb = self.imm8(bus);
                extra = self.step_cb(bus, cb);
                Flow::Next
            }
        };

        let cycles = match flow {
            Flow::Next => {
                self.advance_pc(instr.length as i32);
                instr.cycles
            }
            Flow::Relative(offset) => {
                self.advance_pc(instr.length as i32 + offset as i32);
                instr.cycles_taken
            }
            Flow::Jump(target) => {
                self.set_pc(target);
                instr.cycles_taken
            }
        };

        cycles as u32 + extra
    }
}
