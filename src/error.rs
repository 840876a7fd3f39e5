//! Runtime error types

use pulse_asm::{PanicReason, ResultCode};

use thiserror::Error;

/// Failure modes of the engine entry points.
///
/// Errors surface unchanged to the outermost entry point; the interpreter
/// performs no local recovery. Each variant maps onto the one-byte
/// [`ResultCode`] acknowledged to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// The program executed an explicit `Abort` instruction.
    #[error("execution aborted by the program")]
    Aborted,
    /// An engine invariant was violated by the instruction stream.
    #[error("invariant violation: {0}")]
    Panic(#[from] PanicReason),
    /// The fetched byte is not in the instruction table.
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),
    /// An allocation exceeded the memory budget.
    #[error("memory budget exhausted")]
    OutOfMemory,
}

impl VmError {
    /// The wire status byte reported for this error.
    pub const fn code(&self) -> ResultCode {
        match self {
            Self::Aborted => ResultCode::RuntimeError,
            Self::Panic(_) => ResultCode::Panic,
            Self::UnknownOpcode(_) => ResultCode::UnknownOpcode,
            Self::OutOfMemory => ResultCode::OutOfMemory,
        }
    }
}

/// The status byte for an entry-point outcome.
pub fn result_code<T>(res: &Result<T, VmError>) -> ResultCode {
    match res {
        Ok(_) => ResultCode::Success,
        Err(e) => e.code(),
    }
}
