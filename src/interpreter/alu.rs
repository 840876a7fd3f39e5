//! Integer arithmetic, logic and comparison helpers.
//!
//! All arithmetic is 32-bit two's complement with wrap-on-overflow;
//! comparisons and division are signed. Binary forms consume the top two
//! stack words with the right operand on top.

use super::Interpreter;
use crate::error::VmError;
use crate::value::Value;

use pulse_asm::PanicReason;

impl<T> Interpreter<T> {
    pub(crate) fn alu_unary<F>(&mut self, f: F) -> Result<(), VmError>
    where
        F: FnOnce(i32) -> i32,
    {
        let a = self.pop_int()?;

        self.push(Value::int(f(a)))
    }

    pub(crate) fn alu_binary<F>(&mut self, f: F) -> Result<(), VmError>
    where
        F: FnOnce(i32, i32) -> i32,
    {
        let b = self.pop_int()?;
        let a = self.pop_int()?;

        self.push(Value::int(f(a, b)))
    }

    /// Binary operation that is meaningless for a zero right operand. The
    /// compiler must never emit one, so hitting it is an invariant
    /// violation rather than arithmetic.
    pub(crate) fn alu_checked<F>(&mut self, f: F) -> Result<(), VmError>
    where
        F: FnOnce(i32, i32) -> i32,
    {
        let b = self.pop_int()?;
        let a = self.pop_int()?;

        if b == 0 {
            return Err(PanicReason::DivisionByZero.into());
        }

        self.push(Value::int(f(a, b)))
    }

    pub(crate) fn alu_cmp<F>(&mut self, f: F) -> Result<(), VmError>
    where
        F: FnOnce(i32, i32) -> bool,
    {
        let b = self.pop_int()?;
        let a = self.pop_int()?;

        self.push(Value::boolean(f(a, b)))
    }
}
