//! Jumps, calls and returns.

use super::Interpreter;
use crate::call::CallFrame;
use crate::code::{CodeAddr, CodeSeg};
use crate::error::VmError;

use pulse_asm::PanicReason;

use std::mem;

impl<T> Interpreter<T> {
    /// Resolve a conditional jump. A taken branch reads its displacement
    /// and jumps relative to the byte after it; a fall-through skips
    /// exactly the operand bytes.
    pub(crate) fn branch(&mut self, taken: bool, width: u32) {
        if taken {
            let disp = match width {
                1 => i32::from(self.read_i8()),
                2 => i32::from(self.read_i16()),
                _ => self.read_i32(),
            };

            self.jump(disp);
        } else {
            self.jump(width as i32);
        }
    }

    /// Enter function `func` with `nargs` arguments already on the stack.
    /// The arguments become locals 0..nargs of the callee.
    pub(crate) fn call(&mut self, nargs: usize, func: u32) -> Result<(), VmError> {
        #[cfg(feature = "debug")]
        if self.sp < nargs {
            return Err(PanicReason::StackUnderflow.into());
        }

        self.meter.charge(mem::size_of::<CallFrame>())?;

        let frame = CallFrame::new(self.pc, self.bp, self.sp - nargs);
        self.frames.push(frame);

        self.bp = self.sp - nargs;
        self.pc = CodeAddr::entry(CodeSeg::Func(func));

        Ok(())
    }

    /// Pop the result, restore the caller's context (discarding the
    /// arguments) and push the result back for the caller.
    pub(crate) fn ret(&mut self) -> Result<(), VmError> {
        let result = self.pop()?;
        let frame = self.frames.pop().ok_or(PanicReason::CallFrameMissing)?;

        self.pc = frame.return_addr();
        self.bp = frame.bp();
        self.sp = frame.sp();
        self.meter.credit(mem::size_of::<CallFrame>());

        self.push(result)
    }
}
