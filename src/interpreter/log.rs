//! Diagnostic output towards the host.

use super::Interpreter;
use crate::consts::WORD_SIZE;
use crate::error::VmError;
use crate::transport::Transport;

use pulse_asm::ResultCode;

impl<T> Interpreter<T>
where
    T: Transport,
{
    /// Pop an integer and emit `{len=4, int32-LE}`.
    pub(crate) fn print_int(&mut self) -> Result<(), VmError> {
        let v = self.pop()?.as_int()?;

        self.transport.write(&[WORD_SIZE as u8]);
        self.transport.write(&v.to_le_bytes());
        self.transport.flush();

        Ok(())
    }

    /// Pop an object, emit `{size-byte, serialised object}` and release
    /// the popped reference.
    pub(crate) fn print_obj(&mut self) -> Result<(), VmError> {
        let v = self.pop()?;
        v.as_obj()?;

        let size = self.heap.serialized_size(v);
        let mut payload = Vec::with_capacity(size + 1);
        payload.push(size as u8);
        self.heap.serialize(v, &mut payload);

        self.transport.write(&payload);
        self.transport.flush();

        self.heap.drop_value(&mut self.meter, v);

        Ok(())
    }

    /// Acknowledge a processed frame with its one-byte status.
    pub(crate) fn write_status(&mut self, code: ResultCode) {
        self.transport.write(&[u8::from(code)]);
    }
}
