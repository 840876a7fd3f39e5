//! Wire-level primitives of the Pulse reactive bytecode machine.
//!
//! The crate defines everything the host compiler and the on-device engine
//! must agree on: the opcode byte table ([`OpcodeRepr`]), an assembly-level
//! instruction type with encoder ([`Opcode`]), the 32-bit heap object header
//! layout ([`Header`]), the frame acknowledgement bytes ([`ResultCode`]) and
//! the diagnosable invariant violations ([`PanicReason`]).

mod header;
mod opcode;
mod panic_reason;
mod status;

pub use header::Header;
pub use opcode::{InvalidOpcode, Opcode, OpcodeRepr};
pub use panic_reason::PanicReason;
pub use status::ResultCode;
