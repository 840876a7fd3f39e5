//! Reference-counted object heap
//!
//! Objects are contiguous runs of a header word plus up to seven field
//! words. The heap stores them as cells in a slab addressed by [`ObjId`]
//! handles, with a free list so cell storage is reused deterministically.
//! Lifetime is managed by the reference count in the header: `inc` is a
//! shallow increment, `drop` recurses through the fields the header bitmap
//! marks as managed. No tracing collector exists; the compiler guarantees
//! object graphs are acyclic.

use crate::consts::WORD_SIZE;
use crate::error::VmError;
use crate::meter::MemoryMeter;
use crate::value::{ObjId, Value};

use pulse_asm::Header;

use std::mem;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    header: Header,
    fields: Vec<Value>,
}

/// Slab of live object cells.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Heap {
    cells: Vec<Option<Cell>>,
    free: Vec<u32>,
    live: usize,
}

impl Heap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocate a cell for `header`, with all fields null. The header word
    /// is stored verbatim, so the reference count starts at whatever the
    /// immediate encodes; `AllocObj*` immediates carry count 1.
    pub(crate) fn alloc(&mut self, meter: &mut MemoryMeter, header: Header) -> Result<ObjId, VmError> {
        meter.charge((header.entries() + 1) * mem::size_of::<Value>())?;

        let cell = Cell {
            header,
            fields: vec![Value::NIL; header.entries()],
        };

        let id = match self.free.pop() {
            Some(ix) => {
                self.cells[ix as usize] = Some(cell);
                ObjId(ix)
            }
            None => {
                self.cells.push(Some(cell));
                ObjId((self.cells.len() - 1) as u32)
            }
        };

        self.live += 1;

        Ok(id)
    }

    fn cell(&self, id: ObjId) -> Option<&Cell> {
        self.cells.get(id.index()).and_then(Option::as_ref)
    }

    /// Shallow reference count increment. Non-object values are the null
    /// reference and are left alone.
    pub(crate) fn inc(&mut self, v: Value) {
        if let Value::Obj(id) = v {
            if let Some(cell) = self.cells.get_mut(id.index()).and_then(Option::as_mut) {
                cell.header.increment();
            }
        }
    }

    /// Release one reference. At count zero the cell is freed after
    /// recursively dropping every field the bitmap marks as an object.
    pub(crate) fn drop_value(&mut self, meter: &mut MemoryMeter, v: Value) {
        let id = match v {
            Value::Obj(id) => id,
            _ => return,
        };

        let freed = match self.cells.get_mut(id.index()).and_then(Option::as_mut) {
            Some(cell) => {
                cell.header.decrement();
                cell.header.refcount() == 0
            }
            None => false,
        };

        if !freed {
            return;
        }

        if let Some(cell) = self.cells[id.index()].take() {
            for (i, field) in cell.fields.iter().enumerate() {
                if cell.header.field_is_obj(i) {
                    self.drop_value(meter, *field);
                }
            }

            meter.credit((cell.header.entries() + 1) * mem::size_of::<Value>());
            self.free.push(id.0);
            self.live -= 1;
        }
    }

    pub(crate) fn header(&self, id: ObjId) -> Header {
        self.cell(id).map(|c| c.header).unwrap_or_else(|| Header::new(0, 0, 0, 0))
    }

    pub(crate) fn field(&self, id: ObjId, i: usize) -> Value {
        self.cell(id).map(|c| c.fields[i]).unwrap_or(Value::NIL)
    }

    pub(crate) fn set_field(&mut self, id: ObjId, i: usize, v: Value) {
        if let Some(cell) = self.cells.get_mut(id.index()).and_then(Option::as_mut) {
            cell.fields[i] = v;
        }
    }

    /// Number of objects currently allocated.
    pub fn live_objects(&self) -> usize {
        self.live
    }

    /// Reference count of the object `v` points at, if it is a live object
    /// reference.
    pub fn refcount(&self, v: Value) -> Option<u16> {
        match v {
            Value::Obj(id) => self.cell(id).map(|c| c.header.refcount()),
            _ => None,
        }
    }

    /// Byte length of the depth-first serialisation of `v`.
    pub(crate) fn serialized_size(&self, v: Value) -> usize {
        match v {
            Value::Obj(id) => match self.cell(id) {
                Some(cell) => {
                    let mut size = WORD_SIZE;

                    for (i, field) in cell.fields.iter().enumerate() {
                        size += if cell.header.field_is_obj(i) {
                            self.serialized_size(*field)
                        } else {
                            WORD_SIZE
                        };
                    }

                    size
                }
                None => WORD_SIZE,
            },
            _ => WORD_SIZE,
        }
    }

    /// Depth-first pre-order serialisation: the header word, then each
    /// field either as its raw word or recursively as an object.
    pub(crate) fn serialize(&self, v: Value, out: &mut Vec<u8>) {
        match v {
            Value::Obj(id) => match self.cell(id) {
                Some(cell) => {
                    out.extend_from_slice(&cell.header.to_u32().to_le_bytes());

                    for (i, field) in cell.fields.iter().enumerate() {
                        if cell.header.field_is_obj(i) {
                            self.serialize(*field, out);
                        } else {
                            out.extend_from_slice(&field.raw_word().to_le_bytes());
                        }
                    }
                }
                None => out.extend_from_slice(&0u32.to_le_bytes()),
            },
            _ => out.extend_from_slice(&v.raw_word().to_le_bytes()),
        }
    }
}
