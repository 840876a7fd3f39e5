//! Exposed constructors API for the [`Interpreter`]

use super::Interpreter;
use crate::code::{CodeAddr, CodeSeg};
use crate::consts::{DEFAULT_MEM_LIMIT, STACK_SIZE};
use crate::error::VmError;
use crate::heap::Heap;
use crate::meter::MemoryMeter;
use crate::registry::{DataList, FuncList, InputAction, LastValues, NodeList, OutputAction};
use crate::value::Value;

use std::mem;

impl<T> Interpreter<T> {
    /// Create a machine with the default memory budget.
    ///
    /// `n_inputs` and `n_outputs` size the node registry for the nodes the
    /// glue registers at boot; frames loaded later may extend it further.
    pub fn new(transport: T, n_inputs: usize, n_outputs: usize) -> Result<Self, VmError> {
        Self::with_memory_limit(transport, n_inputs, n_outputs, DEFAULT_MEM_LIMIT)
    }

    /// Create a machine with an explicit memory budget, in bytes.
    ///
    /// The value stack and the initial registry capacity are charged here;
    /// failure means the budget cannot even host an empty machine.
    pub fn with_memory_limit(
        transport: T,
        n_inputs: usize,
        n_outputs: usize,
        limit: usize,
    ) -> Result<Self, VmError> {
        let mut meter = MemoryMeter::new(limit);

        meter.charge(STACK_SIZE * mem::size_of::<Value>())?;
        let nodes = NodeList::with_capacity(&mut meter, n_inputs + n_outputs)?;
        meter.charge(n_outputs * mem::size_of::<OutputAction>())?;

        Ok(Self {
            stack: vec![Value::NIL; STACK_SIZE],
            sp: 0,
            bp: 0,
            pc: CodeAddr::entry(CodeSeg::Scratch),
            frames: Vec::new(),
            heap: Heap::new(),
            meter,
            nodes,
            funcs: FuncList::default(),
            data: DataList::default(),
            last: LastValues::default(),
            outputs: Vec::with_capacity(n_outputs),
            update: None,
            scratch: Box::default(),
            transport,
            stack_high_water: 0,
        })
    }

    /// Register a device-input node. Input nodes must all be registered
    /// before the first program frame arrives, so they precede user nodes.
    pub fn add_input_node(&mut self, initial: Value, action: InputAction) {
        self.nodes.push_input(initial, action);
    }

    /// Register an output node: a user node whose computed value is handed
    /// to `action` by the update program's output dispatch.
    pub fn add_output_node(&mut self, initial: Value, action: OutputAction) {
        self.outputs.push(action);
        self.nodes.push_user(initial, None);
    }
}
