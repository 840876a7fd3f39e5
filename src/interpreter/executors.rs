//! Entry points and the central dispatch loop.

use super::Interpreter;
use crate::code::{CodeAddr, CodeSeg};
use crate::error::VmError;
use crate::state::ExecuteState;
use crate::transport::Transport;
use crate::value::Value;

use pulse_asm::OpcodeRepr;

use std::convert::TryFrom;
use std::mem;

use tracing::trace;

#[cfg(feature = "debug")]
use pulse_asm::PanicReason;

impl<T> Interpreter<T>
where
    T: Transport,
{
    /// Run the stored update program for one tick.
    ///
    /// Succeeds immediately while no update program has been loaded. The
    /// program itself samples the inputs, recomputes user nodes in
    /// topological order and drives the output actions; the engine imposes
    /// no ordering of its own.
    pub fn update(&mut self) -> Result<(), VmError> {
        if self.update.is_none() {
            return Ok(());
        }

        trace!("update tick");

        self.run(CodeAddr::entry(CodeSeg::Update))
    }

    /// Execute a transient body: an immediate-eval frame or an init
    /// expression.
    pub(crate) fn exec_scratch(&mut self, code: Box<[u8]>) -> Result<(), VmError> {
        self.scratch = code;

        self.run(CodeAddr::entry(CodeSeg::Scratch))
    }

    /// Run bytecode from `entry` to completion. Executions never overlap,
    /// so the value stack and frame stack are reset wholesale.
    pub(crate) fn run(&mut self, entry: CodeAddr) -> Result<(), VmError> {
        self.sp = 0;
        self.bp = 0;
        self.meter.credit(self.frames.len() * mem::size_of::<crate::call::CallFrame>());
        self.frames.clear();
        self.pc = entry;

        loop {
            if !self.step()?.should_continue() {
                return Ok(());
            }
        }
    }

    fn step(&mut self) -> Result<ExecuteState, VmError> {
        let byte = self.fetch();
        let op = OpcodeRepr::try_from(byte).map_err(|_| VmError::UnknownOpcode(byte))?;

        match op {
            OpcodeRepr::Nil => self.push(Value::NIL)?,
            OpcodeRepr::PushTrue => self.push(Value::boolean(true))?,
            OpcodeRepr::PushFalse => self.push(Value::boolean(false))?,
            OpcodeRepr::Dup => self.dup()?,

            OpcodeRepr::Not => self.alu_unary(|a| i32::from(a == 0))?,
            OpcodeRepr::Neg => self.alu_unary(i32::wrapping_neg)?,
            OpcodeRepr::Add => self.alu_binary(i32::wrapping_add)?,
            OpcodeRepr::Sub => self.alu_binary(i32::wrapping_sub)?,
            OpcodeRepr::Mul => self.alu_binary(i32::wrapping_mul)?,
            OpcodeRepr::Div => self.alu_checked(i32::wrapping_div)?,
            OpcodeRepr::Mod => self.alu_checked(i32::wrapping_rem)?,
            OpcodeRepr::Shl => self.alu_binary(|a, b| a.wrapping_shl(b as u32))?,
            OpcodeRepr::Shr => self.alu_binary(|a, b| a.wrapping_shr(b as u32))?,
            OpcodeRepr::Lt => self.alu_cmp(|a, b| a < b)?,
            OpcodeRepr::Le => self.alu_cmp(|a, b| a <= b)?,
            OpcodeRepr::Gt => self.alu_cmp(|a, b| a > b)?,
            OpcodeRepr::Ge => self.alu_cmp(|a, b| a >= b)?,
            OpcodeRepr::Eq => self.alu_cmp(|a, b| a == b)?,
            OpcodeRepr::Ne => self.alu_cmp(|a, b| a != b)?,
            OpcodeRepr::And => self.alu_binary(|a, b| a & b)?,
            OpcodeRepr::Or => self.alu_binary(|a, b| a | b)?,
            OpcodeRepr::Xor => self.alu_binary(|a, b| a ^ b)?,

            OpcodeRepr::Int0 => self.push(Value::int(0))?,
            OpcodeRepr::Int1 => self.push(Value::int(1))?,
            OpcodeRepr::Int2 => self.push(Value::int(2))?,
            OpcodeRepr::Int3 => self.push(Value::int(3))?,
            OpcodeRepr::Int4 => self.push(Value::int(4))?,
            OpcodeRepr::Int5 => self.push(Value::int(5))?,
            OpcodeRepr::Int6 => self.push(Value::int(6))?,
            OpcodeRepr::IntI8 => {
                let v = i32::from(self.read_i8());
                self.push(Value::int(v))?;
            }
            OpcodeRepr::IntI16 => {
                let v = i32::from(self.read_i16());
                self.push(Value::int(v))?;
            }
            OpcodeRepr::IntI32 => {
                let v = self.read_i32();
                self.push(Value::int(v))?;
            }

            OpcodeRepr::GetLocal0 => self.get_local(0)?,
            OpcodeRepr::GetLocal1 => self.get_local(1)?,
            OpcodeRepr::GetLocal2 => self.get_local(2)?,
            OpcodeRepr::GetLocal3 => self.get_local(3)?,
            OpcodeRepr::GetLocal4 => self.get_local(4)?,
            OpcodeRepr::GetLocal5 => self.get_local(5)?,
            OpcodeRepr::GetLocal6 => self.get_local(6)?,
            OpcodeRepr::GetLocalI8 => {
                let off = i32::from(self.read_i8());
                self.get_local(off)?;
            }
            OpcodeRepr::GetLocalI16 => {
                let off = i32::from(self.read_i16());
                self.get_local(off)?;
            }
            OpcodeRepr::GetLocalI32 => {
                let off = self.read_i32();
                self.get_local(off)?;
            }

            OpcodeRepr::SetLocal0 => self.set_local(0)?,
            OpcodeRepr::SetLocal1 => self.set_local(1)?,
            OpcodeRepr::SetLocal2 => self.set_local(2)?,
            OpcodeRepr::SetLocal3 => self.set_local(3)?,
            OpcodeRepr::SetLocal4 => self.set_local(4)?,
            OpcodeRepr::SetLocal5 => self.set_local(5)?,
            OpcodeRepr::SetLocal6 => self.set_local(6)?,
            OpcodeRepr::SetLocalI8 => {
                let off = i32::from(self.read_i8());
                self.set_local(off)?;
            }
            OpcodeRepr::SetLocalI16 => {
                let off = i32::from(self.read_i16());
                self.set_local(off)?;
            }
            OpcodeRepr::SetLocalI32 => {
                let off = self.read_i32();
                self.set_local(off)?;
            }

            OpcodeRepr::AllocLocal1 => self.alloc_locals(1)?,
            OpcodeRepr::AllocLocal2 => self.alloc_locals(2)?,
            OpcodeRepr::AllocLocal3 => self.alloc_locals(3)?,
            OpcodeRepr::AllocLocal4 => self.alloc_locals(4)?,
            OpcodeRepr::AllocLocal5 => self.alloc_locals(5)?,
            OpcodeRepr::AllocLocal6 => self.alloc_locals(6)?,
            OpcodeRepr::AllocLocalU8 => {
                let n = usize::from(self.read_u8());
                self.alloc_locals(n)?;
            }
            OpcodeRepr::AllocLocalU16 => {
                let n = usize::from(self.read_u16());
                self.alloc_locals(n)?;
            }
            OpcodeRepr::AllocLocalU32 => {
                let n = self.read_u32() as usize;
                self.alloc_locals(n)?;
            }

            OpcodeRepr::Pop1 => self.pop_n(1)?,
            OpcodeRepr::Pop2 => self.pop_n(2)?,
            OpcodeRepr::Pop3 => self.pop_n(3)?,
            OpcodeRepr::Pop4 => self.pop_n(4)?,
            OpcodeRepr::Pop5 => self.pop_n(5)?,
            OpcodeRepr::Pop6 => self.pop_n(6)?,
            OpcodeRepr::PopU8 => {
                let n = usize::from(self.read_u8());
                self.pop_n(n)?;
            }
            OpcodeRepr::PopU16 => {
                let n = usize::from(self.read_u16());
                self.pop_n(n)?;
            }
            OpcodeRepr::PopU32 => {
                let n = self.read_u32() as usize;
                self.pop_n(n)?;
            }

            OpcodeRepr::J8 => self.branch(true, 1),
            OpcodeRepr::J16 => self.branch(true, 2),
            OpcodeRepr::J32 => self.branch(true, 4),
            OpcodeRepr::Je8 => {
                let taken = self.pop_int()? != 0;
                self.branch(taken, 1);
            }
            OpcodeRepr::Je16 => {
                let taken = self.pop_int()? != 0;
                self.branch(taken, 2);
            }
            OpcodeRepr::Je32 => {
                let taken = self.pop_int()? != 0;
                self.branch(taken, 4);
            }
            OpcodeRepr::Jne8 => {
                let taken = self.pop_int()? == 0;
                self.branch(taken, 1);
            }
            OpcodeRepr::Jne16 => {
                let taken = self.pop_int()? == 0;
                self.branch(taken, 2);
            }
            OpcodeRepr::Jne32 => {
                let taken = self.pop_int()? == 0;
                self.branch(taken, 4);
            }

            // Degenerate widths for peephole encodings: displacement fixed
            // at zero or one.
            OpcodeRepr::J0 => (),
            OpcodeRepr::J1 => self.jump(1),
            OpcodeRepr::Je0 | OpcodeRepr::Jne0 => {
                self.pop()?;
            }
            OpcodeRepr::Je1 => {
                if self.pop_int()? != 0 {
                    self.jump(1);
                }
            }
            OpcodeRepr::Jne1 => {
                if self.pop_int()? == 0 {
                    self.jump(1);
                }
            }

            OpcodeRepr::CallU8 => {
                let nargs = usize::from(self.read_u8());
                let func = u32::from(self.read_u8());
                self.call(nargs, func)?;
            }
            OpcodeRepr::CallU16 => {
                let nargs = usize::from(self.read_u8());
                let func = u32::from(self.read_u16());
                self.call(nargs, func)?;
            }
            OpcodeRepr::CallU32 => {
                let nargs = usize::from(self.read_u8());
                let func = self.read_u32();
                self.call(nargs, func)?;
            }
            OpcodeRepr::Ret => self.ret()?,

            OpcodeRepr::GetNodeU8 => {
                let ix = usize::from(self.read_u8());
                self.get_node(ix, false)?;
            }
            OpcodeRepr::GetNodeU16 => {
                let ix = usize::from(self.read_u16());
                self.get_node(ix, false)?;
            }
            OpcodeRepr::GetNodeU32 => {
                let ix = self.read_u32() as usize;
                self.get_node(ix, false)?;
            }
            OpcodeRepr::GetNodeRefU8 => {
                let ix = usize::from(self.read_u8());
                self.get_node(ix, true)?;
            }
            OpcodeRepr::GetNodeRefU16 => {
                let ix = usize::from(self.read_u16());
                self.get_node(ix, true)?;
            }
            OpcodeRepr::GetNodeRefU32 => {
                let ix = self.read_u32() as usize;
                self.get_node(ix, true)?;
            }
            OpcodeRepr::SetNodeU8 => {
                let ix = usize::from(self.read_u8());
                self.set_node(ix, false)?;
            }
            OpcodeRepr::SetNodeU16 => {
                let ix = usize::from(self.read_u16());
                self.set_node(ix, false)?;
            }
            OpcodeRepr::SetNodeU32 => {
                let ix = self.read_u32() as usize;
                self.set_node(ix, false)?;
            }
            OpcodeRepr::SetNodeRefU8 => {
                let ix = usize::from(self.read_u8());
                self.set_node(ix, true)?;
            }
            OpcodeRepr::SetNodeRefU16 => {
                let ix = usize::from(self.read_u16());
                self.set_node(ix, true)?;
            }
            OpcodeRepr::SetNodeRefU32 => {
                let ix = self.read_u32() as usize;
                self.set_node(ix, true)?;
            }

            OpcodeRepr::GetDataU8 => {
                let ix = usize::from(self.read_u8());
                self.get_data(ix, false)?;
            }
            OpcodeRepr::GetDataU16 => {
                let ix = usize::from(self.read_u16());
                self.get_data(ix, false)?;
            }
            OpcodeRepr::GetDataU32 => {
                let ix = self.read_u32() as usize;
                self.get_data(ix, false)?;
            }
            OpcodeRepr::GetDataRefU8 => {
                let ix = usize::from(self.read_u8());
                self.get_data(ix, true)?;
            }
            OpcodeRepr::GetDataRefU16 => {
                let ix = usize::from(self.read_u16());
                self.get_data(ix, true)?;
            }
            OpcodeRepr::GetDataRefU32 => {
                let ix = self.read_u32() as usize;
                self.get_data(ix, true)?;
            }
            OpcodeRepr::SetDataU8 => {
                let ix = usize::from(self.read_u8());
                self.set_data(ix, false)?;
            }
            OpcodeRepr::SetDataU16 => {
                let ix = usize::from(self.read_u16());
                self.set_data(ix, false)?;
            }
            OpcodeRepr::SetDataU32 => {
                let ix = self.read_u32() as usize;
                self.set_data(ix, false)?;
            }
            OpcodeRepr::SetDataRefU8 => {
                let ix = usize::from(self.read_u8());
                self.set_data(ix, true)?;
            }
            OpcodeRepr::SetDataRefU16 => {
                let ix = usize::from(self.read_u16());
                self.set_data(ix, true)?;
            }
            OpcodeRepr::SetDataRefU32 => {
                let ix = self.read_u32() as usize;
                self.set_data(ix, true)?;
            }

            OpcodeRepr::GetLast0 => self.get_last(0, false)?,
            OpcodeRepr::GetLast1 => self.get_last(1, false)?,
            OpcodeRepr::GetLast2 => self.get_last(2, false)?,
            OpcodeRepr::GetLast3 => self.get_last(3, false)?,
            OpcodeRepr::GetLastU8 => {
                let ix = usize::from(self.read_u8());
                self.get_last(ix, false)?;
            }
            OpcodeRepr::GetLastU16 => {
                let ix = usize::from(self.read_u16());
                self.get_last(ix, false)?;
            }
            OpcodeRepr::GetLastU32 => {
                let ix = self.read_u32() as usize;
                self.get_last(ix, false)?;
            }
            OpcodeRepr::GetLastRef0 => self.get_last(0, true)?,
            OpcodeRepr::GetLastRef1 => self.get_last(1, true)?,
            OpcodeRepr::GetLastRef2 => self.get_last(2, true)?,
            OpcodeRepr::GetLastRef3 => self.get_last(3, true)?,
            OpcodeRepr::GetLastRefU8 => {
                let ix = usize::from(self.read_u8());
                self.get_last(ix, true)?;
            }
            OpcodeRepr::GetLastRefU16 => {
                let ix = usize::from(self.read_u16());
                self.get_last(ix, true)?;
            }
            OpcodeRepr::GetLastRefU32 => {
                let ix = self.read_u32() as usize;
                self.get_last(ix, true)?;
            }
            OpcodeRepr::SetLast0 => self.set_last(0, false)?,
            OpcodeRepr::SetLast1 => self.set_last(1, false)?,
            OpcodeRepr::SetLast2 => self.set_last(2, false)?,
            OpcodeRepr::SetLast3 => self.set_last(3, false)?,
            OpcodeRepr::SetLastU8 => {
                let ix = usize::from(self.read_u8());
                self.set_last(ix, false)?;
            }
            OpcodeRepr::SetLastU16 => {
                let ix = usize::from(self.read_u16());
                self.set_last(ix, false)?;
            }
            OpcodeRepr::SetLastU32 => {
                let ix = self.read_u32() as usize;
                self.set_last(ix, false)?;
            }
            OpcodeRepr::SetLastRef0 => self.set_last(0, true)?,
            OpcodeRepr::SetLastRef1 => self.set_last(1, true)?,
            OpcodeRepr::SetLastRef2 => self.set_last(2, true)?,
            OpcodeRepr::SetLastRef3 => self.set_last(3, true)?,
            OpcodeRepr::SetLastRefU8 => {
                let ix = usize::from(self.read_u8());
                self.set_last(ix, true)?;
            }
            OpcodeRepr::SetLastRefU16 => {
                let ix = usize::from(self.read_u16());
                self.set_last(ix, true)?;
            }
            OpcodeRepr::SetLastRefU32 => {
                let ix = self.read_u32() as usize;
                self.set_last(ix, true)?;
            }
            OpcodeRepr::DropLastU8 => {
                let ix = usize::from(self.read_u8());
                self.drop_last(ix);
            }
            OpcodeRepr::DropLastU16 => {
                let ix = usize::from(self.read_u16());
                self.drop_last(ix);
            }
            OpcodeRepr::DropLastU32 => {
                let ix = self.read_u32() as usize;
                self.drop_last(ix);
            }

            OpcodeRepr::ObjField0 => self.obj_field(0, false)?,
            OpcodeRepr::ObjField1 => self.obj_field(1, false)?,
            OpcodeRepr::ObjField2 => self.obj_field(2, false)?,
            OpcodeRepr::ObjField3 => self.obj_field(3, false)?,
            OpcodeRepr::ObjField4 => self.obj_field(4, false)?,
            OpcodeRepr::ObjField5 => self.obj_field(5, false)?,
            OpcodeRepr::ObjField6 => self.obj_field(6, false)?,
            OpcodeRepr::ObjFieldRef0 => self.obj_field(0, true)?,
            OpcodeRepr::ObjFieldRef1 => self.obj_field(1, true)?,
            OpcodeRepr::ObjFieldRef2 => self.obj_field(2, true)?,
            OpcodeRepr::ObjFieldRef3 => self.obj_field(3, true)?,
            OpcodeRepr::ObjFieldRef4 => self.obj_field(4, true)?,
            OpcodeRepr::ObjFieldRef5 => self.obj_field(5, true)?,
            OpcodeRepr::ObjFieldRef6 => self.obj_field(6, true)?,
            OpcodeRepr::ObjTag => self.obj_tag()?,

            OpcodeRepr::AllocObj0
            | OpcodeRepr::AllocObj1
            | OpcodeRepr::AllocObj2
            | OpcodeRepr::AllocObj3
            | OpcodeRepr::AllocObj4
            | OpcodeRepr::AllocObj5
            | OpcodeRepr::AllocObj6 => self.alloc_obj()?,
            OpcodeRepr::AllocObjU8 => {
                // The explicit size operand duplicates the header's entry
                // count; the header is authoritative.
                let _entries = self.read_u8();
                self.alloc_obj()?;
            }

            OpcodeRepr::DropLocal0 => self.drop_local(0),
            OpcodeRepr::DropLocal1 => self.drop_local(1),
            OpcodeRepr::DropLocal2 => self.drop_local(2),
            OpcodeRepr::DropLocal3 => self.drop_local(3),
            OpcodeRepr::DropLocal4 => self.drop_local(4),
            OpcodeRepr::DropLocal5 => self.drop_local(5),
            OpcodeRepr::DropLocal6 => self.drop_local(6),
            OpcodeRepr::DropLocalI8 => {
                let off = i32::from(self.read_i8());
                self.drop_local(off);
            }
            OpcodeRepr::DropLocalI16 => {
                let off = i32::from(self.read_i16());
                self.drop_local(off);
            }
            OpcodeRepr::DropLocalI32 => {
                let off = self.read_i32();
                self.drop_local(off);
            }

            OpcodeRepr::GetLocalRef0 => self.get_local_ref(0)?,
            OpcodeRepr::GetLocalRef1 => self.get_local_ref(1)?,
            OpcodeRepr::GetLocalRef2 => self.get_local_ref(2)?,
            OpcodeRepr::GetLocalRef3 => self.get_local_ref(3)?,
            OpcodeRepr::GetLocalRef4 => self.get_local_ref(4)?,
            OpcodeRepr::GetLocalRef5 => self.get_local_ref(5)?,
            OpcodeRepr::GetLocalRef6 => self.get_local_ref(6)?,
            OpcodeRepr::GetLocalRefI8 => {
                let off = i32::from(self.read_i8());
                self.get_local_ref(off)?;
            }
            OpcodeRepr::GetLocalRefI16 => {
                let off = i32::from(self.read_i16());
                self.get_local_ref(off)?;
            }
            OpcodeRepr::GetLocalRefI32 => {
                let off = self.read_i32();
                self.get_local_ref(off)?;
            }
            OpcodeRepr::SetLocalRef0 => self.set_local_ref(0)?,
            OpcodeRepr::SetLocalRef1 => self.set_local_ref(1)?,
            OpcodeRepr::SetLocalRef2 => self.set_local_ref(2)?,
            OpcodeRepr::SetLocalRef3 => self.set_local_ref(3)?,
            OpcodeRepr::SetLocalRef4 => self.set_local_ref(4)?,
            OpcodeRepr::SetLocalRef5 => self.set_local_ref(5)?,
            OpcodeRepr::SetLocalRef6 => self.set_local_ref(6)?,
            OpcodeRepr::SetLocalRefI8 => {
                let off = i32::from(self.read_i8());
                self.set_local_ref(off)?;
            }
            OpcodeRepr::SetLocalRefI16 => {
                let off = i32::from(self.read_i16());
                self.set_local_ref(off)?;
            }
            OpcodeRepr::SetLocalRefI32 => {
                let off = self.read_i32();
                self.set_local_ref(off)?;
            }

            OpcodeRepr::UpdDev0 => self.sample_device(0)?,
            OpcodeRepr::UpdDev1 => self.sample_device(1)?,
            OpcodeRepr::UpdDev2 => self.sample_device(2)?,
            OpcodeRepr::UpdDev3 => self.sample_device(3)?,
            OpcodeRepr::UpdDevU8 => {
                let ix = usize::from(self.read_u8());
                self.sample_device(ix)?;
            }
            OpcodeRepr::UpdNodeU8 => {
                let ix = u32::from(self.read_u8());
                self.begin_node_update(ix)?;
            }
            OpcodeRepr::UpdNodeU16 => {
                let ix = u32::from(self.read_u16());
                self.begin_node_update(ix)?;
            }
            OpcodeRepr::UpdNodeU32 => {
                let ix = self.read_u32();
                self.begin_node_update(ix)?;
            }
            OpcodeRepr::EndUpdU8 => {
                let ix = usize::from(self.read_u8());
                self.end_node_update(ix, false)?;
            }
            OpcodeRepr::EndUpdU16 => {
                let ix = usize::from(self.read_u16());
                self.end_node_update(ix, false)?;
            }
            OpcodeRepr::EndUpdU32 => {
                let ix = self.read_u32() as usize;
                self.end_node_update(ix, false)?;
            }
            OpcodeRepr::EndUpdObjU8 => {
                let ix = usize::from(self.read_u8());
                self.end_node_update(ix, true)?;
            }
            OpcodeRepr::EndUpdObjU16 => {
                let ix = usize::from(self.read_u16());
                self.end_node_update(ix, true)?;
            }
            OpcodeRepr::EndUpdObjU32 => {
                let ix = self.read_u32() as usize;
                self.end_node_update(ix, true)?;
            }
            OpcodeRepr::Output0 => self.output_action(0)?,
            OpcodeRepr::Output1 => self.output_action(1)?,
            OpcodeRepr::Output2 => self.output_action(2)?,
            OpcodeRepr::Output3 => self.output_action(3)?,
            OpcodeRepr::OutputU8 => {
                let ix = usize::from(self.read_u8());
                self.output_action(ix)?;
            }

            OpcodeRepr::Print => self.print_int()?,
            OpcodeRepr::PrintObj => self.print_obj()?,

            OpcodeRepr::Halt => {
                #[cfg(feature = "debug")]
                if self.sp != 0 {
                    return Err(PanicReason::UnbalancedStack.into());
                }

                return Ok(ExecuteState::Halted);
            }
            OpcodeRepr::Abort => return Err(VmError::Aborted),
        }

        Ok(ExecuteState::Proceed)
    }
}
