use thiserror::Error;

/// Fatal faults raised by the CPU core.
///
/// None of these are recoverable inside an emulated session: the run loop
/// stops at the first error and the host reports a state dump.
#[derive(Debug, Error)]
pub enum CpuError {
    #[error("unimplemented opcode 0x{opcode:02X} at PC=0x{pc:04X}")]
    UnimplementedOpcode { opcode: u8, pc: u16 },
    #[error("address 0x{addr:X} is outside the 16-bit address space")]
    AddressOutOfRange { addr: usize },
    #[error("invalid register name '{0}'")]
    InvalidRegisterName(String),
    #[error("snapshot error: {0}")]
    InvalidSnapshot(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CpuError>;
