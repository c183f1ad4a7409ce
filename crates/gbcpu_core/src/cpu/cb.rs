use super::table::{self, CbOp};
use super::{Bus, Cpu, Flag};

impl Cpu {
    /// Handle the byte following a 0xCB prefix (bit operations, shifts, and
    /// rotates) and return its T-cycle cost.
    ///
    /// PC is left alone: the prefix entry of the primary table advances it
    /// over both bytes.
    pub(super) fn step_cb<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let instr = table::lookup_cb(opcode);
        let target = instr.target;
        log::trace!("CB 0x{opcode:02X} {}", instr.mnemonic);

        match instr.op {
            CbOp::Shift(op) => {
                let value = self.read_target(bus, target);
                let result = self.alu_shift(op, value);
                self.write_target(bus, target, result);
            }
            CbOp::Bit(bit) => {
                let value = self.read_target(bus, target);
                // Preserve C, set H=1, N=0.
                self.set_flag(Flag::Z, value & (1 << bit) == 0);
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, true);
            }
            CbOp::Res(bit) => {
                let value = self.read_target(bus, target) & !(1 << bit);
                self.write_target(bus, target, value);
            }
            CbOp::Set(bit) => {
                let value = self.read_target(bus, target) | (1 << bit);
                self.write_target(bus, target, value);
            }
        }

        instr.cycles as u32
    }
}
