//! Heap object opcodes: allocation, field reads, tag dispatch and the
//! reference-count maintenance variants on locals.

use super::Interpreter;
use crate::error::VmError;
use crate::value::Value;

use pulse_asm::Header;

impl<T> Interpreter<T> {
    /// Allocate an object from the 32-bit header immediate at the current
    /// instruction pointer. The header is stored verbatim (the compiler
    /// encodes reference count 1) and the fields are popped in reverse, so
    /// the source-order push sequence lays them out left to right.
    pub(crate) fn alloc_obj(&mut self) -> Result<(), VmError> {
        let header = Header::from(self.read_u32());
        let id = self.heap.alloc(&mut self.meter, header)?;

        for i in (0..header.entries()).rev() {
            let v = self.pop()?;
            self.heap.set_field(id, i, v);
        }

        self.push(Value::Obj(id))
    }

    /// Read field `i` of the object on top of the stack. The container is
    /// popped but not dropped; a program that is done with it must drop it
    /// explicitly.
    pub(crate) fn obj_field(&mut self, i: usize, track: bool) -> Result<(), VmError> {
        let id = self.pop()?.as_obj()?;
        let v = self.heap.field(id, i);

        if track {
            self.heap.inc(v);
        }

        self.push(v)
    }

    /// Pop an object and push its variant tag as an integer. Like the
    /// field reads, the container is not dropped.
    pub(crate) fn obj_tag(&mut self) -> Result<(), VmError> {
        let id = self.pop()?.as_obj()?;
        let tag = self.heap.header(id).tag();

        self.push(Value::int(i32::from(tag)))
    }

    pub(crate) fn get_local_ref(&mut self, off: i32) -> Result<(), VmError> {
        let v = self.local(off);
        self.heap.inc(v);

        self.push(v)
    }

    /// Drop the previous occupant of the local, then move the popped value
    /// in.
    pub(crate) fn set_local_ref(&mut self, off: i32) -> Result<(), VmError> {
        let old = self.local(off);
        self.heap.drop_value(&mut self.meter, old);

        let v = self.pop()?;
        self.set_local_slot(off, v);

        Ok(())
    }

    pub(crate) fn drop_local(&mut self, off: i32) {
        let v = self.local(off);
        self.heap.drop_value(&mut self.meter, v);
    }
}
