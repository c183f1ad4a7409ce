pub mod cpu;
pub mod error;
pub mod machine;
pub mod memory;
pub mod scheduler;
pub mod signal;
pub mod snapshot;

pub use cpu::Cpu;
pub use error::{CpuError, Result};
pub use machine::Machine;
pub use memory::Memory;
pub use scheduler::{RunOutcome, RunReport, Scheduler, SchedulerConfig};
pub use signal::{Gate, RunSignal};
