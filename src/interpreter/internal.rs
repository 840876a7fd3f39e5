//! Stack, operand and code-fetch primitives shared by the opcode handlers.

use super::Interpreter;
use crate::code::{CodeAddr, CodeSeg};
use crate::error::VmError;
use crate::value::Value;

#[cfg(feature = "debug")]
use crate::consts::STACK_SIZE;
#[cfg(feature = "debug")]
use pulse_asm::PanicReason;

impl<T> Interpreter<T> {
    /// The bytecode body an address points into. Bodies can be replaced by
    /// the loader, but never while an execution is in flight.
    pub(crate) fn code_slice(&self, seg: CodeSeg) -> &[u8] {
        match seg {
            CodeSeg::Update => self.update.as_deref().unwrap_or(&[]),
            CodeSeg::Scratch => &self.scratch,
            CodeSeg::Node(ix) => self.nodes.body(ix as usize).unwrap_or(&[]),
            CodeSeg::Func(ix) => self.funcs.body(ix as usize),
        }
    }

    pub(crate) fn fetch(&mut self) -> u8 {
        let b = self.code_slice(self.pc.seg)[self.pc.offset as usize];
        self.pc.offset += 1;

        b
    }

    pub(crate) fn read_u8(&mut self) -> u8 {
        self.fetch()
    }

    pub(crate) fn read_i8(&mut self) -> i8 {
        self.fetch() as i8
    }

    pub(crate) fn read_u16(&mut self) -> u16 {
        let lo = self.fetch();
        let hi = self.fetch();

        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn read_i16(&mut self) -> i16 {
        self.read_u16() as i16
    }

    pub(crate) fn read_u32(&mut self) -> u32 {
        let bytes = [self.fetch(), self.fetch(), self.fetch(), self.fetch()];

        u32::from_le_bytes(bytes)
    }

    pub(crate) fn read_i32(&mut self) -> i32 {
        self.read_u32() as i32
    }

    /// Displace the instruction pointer relative to the byte after the
    /// operand just read.
    pub(crate) fn jump(&mut self, disp: i32) {
        self.pc = CodeAddr {
            seg: self.pc.seg,
            offset: (i64::from(self.pc.offset) + i64::from(disp)) as u32,
        };
    }

    pub(crate) fn push(&mut self, v: Value) -> Result<(), VmError> {
        #[cfg(feature = "debug")]
        if self.sp >= STACK_SIZE {
            return Err(PanicReason::StackOverflow.into());
        }

        self.stack[self.sp] = v;
        self.sp += 1;

        if self.sp > self.stack_high_water {
            self.stack_high_water = self.sp;
        }

        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Value, VmError> {
        #[cfg(feature = "debug")]
        if self.sp == 0 {
            return Err(PanicReason::StackUnderflow.into());
        }

        self.sp -= 1;

        Ok(self.stack[self.sp])
    }

    pub(crate) fn pop_int(&mut self) -> Result<i32, VmError> {
        Ok(self.pop()?.as_int()?)
    }

    /// The top stack word, left in place.
    pub(crate) fn top(&self) -> Result<Value, VmError> {
        #[cfg(feature = "debug")]
        if self.sp == 0 {
            return Err(PanicReason::StackUnderflow.into());
        }

        Ok(self.stack[self.sp - 1])
    }

    /// Reserve `n` local slots by advancing the stack pointer. The slots
    /// keep whatever stale words they held; the program initialises them
    /// before reading.
    pub(crate) fn alloc_locals(&mut self, n: usize) -> Result<(), VmError> {
        #[cfg(feature = "debug")]
        if self.sp + n > STACK_SIZE {
            return Err(PanicReason::StackOverflow.into());
        }

        self.sp += n;

        if self.sp > self.stack_high_water {
            self.stack_high_water = self.sp;
        }

        Ok(())
    }

    pub(crate) fn pop_n(&mut self, n: usize) -> Result<(), VmError> {
        #[cfg(feature = "debug")]
        if self.sp < n {
            return Err(PanicReason::StackUnderflow.into());
        }

        self.sp -= n;

        Ok(())
    }

    fn local_ix(&self, off: i32) -> usize {
        (self.bp as i64 + i64::from(off)) as usize
    }

    /// Read the local at signed offset `off` from the base pointer.
    pub(crate) fn local(&self, off: i32) -> Value {
        self.stack[self.local_ix(off)]
    }

    pub(crate) fn set_local_slot(&mut self, off: i32, v: Value) {
        let ix = self.local_ix(off);
        self.stack[ix] = v;
    }

    pub(crate) fn get_local(&mut self, off: i32) -> Result<(), VmError> {
        let v = self.local(off);

        self.push(v)
    }

    pub(crate) fn set_local(&mut self, off: i32) -> Result<(), VmError> {
        let v = self.pop()?;
        self.set_local_slot(off, v);

        Ok(())
    }

    /// Duplicate the top stack word.
    pub(crate) fn dup(&mut self) -> Result<(), VmError> {
        let v = self.top()?;

        self.push(v)
    }
}
