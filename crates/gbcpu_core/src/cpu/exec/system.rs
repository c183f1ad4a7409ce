use crate::cpu::exec::Flow;
use crate::cpu::Cpu;

impl Cpu {
    /// STOP is a 2-byte instruction; the padding byte is skipped through
    /// the table length.
    pub(super) fn exec_stop(&mut self) -> Flow {
        self.stopped = true;
        self.halted = false;
        Flow::Next
    }

    pub(super) fn exec_halt(&mut self) -> Flow {
        self.halted = true;
        Flow::Next
    }

    pub(super) fn exec_di(&mut self) -> Flow {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        Flow::Next
    }

    pub(super) fn exec_ei(&mut self) -> Flow {
        // IME becomes 1 after the *next* instruction completes.
        self.ime_enable_pending = true;
        Flow::Next
    }
}
