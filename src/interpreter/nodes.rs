//! Registry access and reactive update dispatch.
//!
//! `get`/`set` families move values between the stack and the node, data
//! and last-value registries; the `Ref` variants maintain reference counts
//! on the way through. Node update dispatch is a lightweight coroutine:
//! `UpdNode*` saves the instruction pointer on the value stack and jumps
//! into the node's body, `EndUpd*` stores the computed value and resumes.

use super::Interpreter;
use crate::code::{CodeAddr, CodeSeg};
use crate::error::VmError;
use crate::prelude::Value;

use pulse_asm::PanicReason;

impl<T> Interpreter<T> {
    pub(crate) fn get_node(&mut self, ix: usize, track: bool) -> Result<(), VmError> {
        let v = self.nodes.value(ix);

        if track {
            self.heap.inc(v);
        }

        self.push(v)
    }

    pub(crate) fn set_node(&mut self, ix: usize, drop_old: bool) -> Result<(), VmError> {
        let v = self.pop()?;

        if drop_old {
            let old = self.nodes.value(ix);
            self.heap.drop_value(&mut self.meter, old);
        }

        self.nodes.set_value(ix, v);

        Ok(())
    }

    pub(crate) fn get_data(&mut self, ix: usize, track: bool) -> Result<(), VmError> {
        let v = self.data.value(ix);

        if track {
            self.heap.inc(v);
        }

        self.push(v)
    }

    pub(crate) fn set_data(&mut self, ix: usize, drop_old: bool) -> Result<(), VmError> {
        let v = self.pop()?;

        if drop_old {
            let old = self.data.value(ix);
            self.heap.drop_value(&mut self.meter, old);
        }

        self.data.set_value(ix, v);

        Ok(())
    }

    pub(crate) fn get_last(&mut self, ix: usize, track: bool) -> Result<(), VmError> {
        let v = self.last.value(ix);

        if track {
            self.heap.inc(v);
        }

        self.push(v)
    }

    pub(crate) fn set_last(&mut self, ix: usize, drop_old: bool) -> Result<(), VmError> {
        let v = self.pop()?;

        if drop_old {
            let old = self.last.value(ix);
            self.heap.drop_value(&mut self.meter, old);
        }

        self.last.set_value(ix, v);

        Ok(())
    }

    /// Release the object held in a last-value slot. The slot itself keeps
    /// its stale word; the program overwrites it before the next read.
    pub(crate) fn drop_last(&mut self, ix: usize) {
        let v = self.last.value(ix);
        self.heap.drop_value(&mut self.meter, v);
    }

    /// Run the device-input callback of node `ix` against its value slot.
    pub(crate) fn sample_device(&mut self, ix: usize) -> Result<(), VmError> {
        self.nodes.sample_input(ix)?;

        Ok(())
    }

    /// Suspend the current body and enter the updater of node `ix`.
    pub(crate) fn begin_node_update(&mut self, ix: u32) -> Result<(), VmError> {
        if self.nodes.body(ix as usize).is_none() {
            return Err(PanicReason::NodeBodyMissing.into());
        }

        let resume = Value::Ip(self.pc);
        self.push(resume)?;
        self.pc = CodeAddr::entry(CodeSeg::Node(ix));

        Ok(())
    }

    /// Store the computed value into node `ix` and resume the suspended
    /// body. The object variant drops the node's previous value first.
    pub(crate) fn end_node_update(&mut self, ix: usize, drop_old: bool) -> Result<(), VmError> {
        let v = self.pop()?;

        if drop_old {
            let old = self.nodes.value(ix);
            self.heap.drop_value(&mut self.meter, old);
        }

        self.nodes.set_value(ix, v);
        self.pc = self.pop()?.as_ip()?;

        Ok(())
    }

    /// Hand the top stack word to output action `ix`. The value stays on
    /// the stack; the callback reads it without consuming.
    pub(crate) fn output_action(&mut self, ix: usize) -> Result<(), VmError> {
        let v = self.top()?;
        (self.outputs[ix])(&v);

        Ok(())
    }
}
