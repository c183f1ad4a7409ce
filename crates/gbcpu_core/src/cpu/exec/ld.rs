use crate::cpu::exec::Flow;
use crate::cpu::table::{Indirect, Target};
use crate::cpu::{Bus, Cpu, Reg16};
use crate::memory::io_address;

impl Cpu {
    pub(super) fn exec_ld<B: Bus>(&mut self, bus: &mut B, dst: Target, src: Target) -> Flow {
        let value = self.read_target(bus, src);
        self.write_target(bus, dst, value);
        Flow::Next
    }

    pub(super) fn exec_ld_imm8<B: Bus>(&mut self, bus: &mut B, target: Target) -> Flow {
        let value = self.imm8(bus);
        self.write_target(bus, target, value);
        Flow::Next
    }

    pub(super) fn exec_ld_imm16<B: Bus>(&mut self, bus: &mut B, rr: Reg16) -> Flow {
        let value = self.imm16(bus);
        self.regs.set16(rr, value);
        Flow::Next
    }

    pub(super) fn exec_store_sp<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let addr = self.imm16(bus);
        bus.write16(addr, self.regs.sp);
        Flow::Next
    }

    pub(super) fn exec_store_a<B: Bus>(&mut self, bus: &mut B, ind: Indirect) -> Flow {
        let addr = self.indirect_addr(ind);
        bus.write8(addr, self.regs.a);
        Flow::Next
    }

    pub(super) fn exec_load_a<B: Bus>(&mut self, bus: &mut B, ind: Indirect) -> Flow {
        let addr = self.indirect_addr(ind);
        self.regs.a = bus.read8(addr);
        Flow::Next
    }

    pub(super) fn exec_store_high_imm<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let addr = io_address(self.imm8(bus));
        bus.write8(addr, self.regs.a);
        Flow::Next
    }

    pub(super) fn exec_load_high_imm<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let addr = io_address(self.imm8(bus));
        self.regs.a = bus.read8(addr);
        Flow::Next
    }

    pub(super) fn exec_store_high_c<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let addr = io_address(self.regs.c);
        bus.write8(addr, self.regs.a);
        Flow::Next
    }

    pub(super) fn exec_load_high_c<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let addr = io_address(self.regs.c);
        self.regs.a = bus.read8(addr);
        Flow::Next
    }

    pub(super) fn exec_store_abs<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let addr = self.imm16(bus);
        bus.write8(addr, self.regs.a);
        Flow::Next
    }

    pub(super) fn exec_load_abs<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let addr = self.imm16(bus);
        self.regs.a = bus.read8(addr);
        Flow::Next
    }

    pub(super) fn exec_ld_sp_hl(&mut self) -> Flow {
        self.regs.sp = self.regs.hl();
        Flow::Next
    }

    pub(super) fn exec_ld_hl_sp_offset<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let imm = self.imm8(bus);
        let result = self.alu_add16_signed(self.regs.sp, imm);
        self.regs.set_hl(result);
        Flow::Next
    }
}
