//! Reactive registries
//!
//! Four grow-only vectors hold the program's persistent state: nodes
//! (current value plus updater), functions (bytecode bodies), data slots
//! (global constants and persistent state) and last-values (the previous
//! cycle's node values). The loader extends them in place; indices handed
//! out to running bytecode stay valid for the life of the machine.

use crate::error::VmError;
use crate::meter::MemoryMeter;
use crate::value::Value;

use pulse_asm::PanicReason;

use std::mem;

/// Device-input callback: samples the hardware and writes the result into
/// the node's value slot. Must not block; runs on the main thread inside
/// the update program.
pub type InputAction = Box<dyn FnMut(&mut Value)>;

/// Output callback: reads the value it is handed and drives the actuator.
/// Must not retain the reference past the call.
pub type OutputAction = Box<dyn FnMut(&Value)>;

/// How a node's value is recomputed each cycle.
pub enum UpdateAction {
    /// Sampled from the device by a callback.
    Input(InputAction),
    /// Computed by a bytecode body, once the loader installs one.
    User(Option<Box<[u8]>>),
}

/// Parallel vectors of node values and their update actions.
///
/// Input nodes always precede user nodes; the loader only ever appends user
/// nodes.
pub struct NodeList {
    values: Vec<Value>,
    actions: Vec<UpdateAction>,
}

impl NodeList {
    const ENTRY_SIZE: usize = mem::size_of::<Value>() + mem::size_of::<UpdateAction>();

    pub(crate) fn with_capacity(meter: &mut MemoryMeter, cap: usize) -> Result<Self, VmError> {
        meter.charge(cap * Self::ENTRY_SIZE)?;

        Ok(Self {
            values: Vec::with_capacity(cap),
            actions: Vec::with_capacity(cap),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn value(&self, ix: usize) -> Value {
        self.values[ix]
    }

    pub(crate) fn set_value(&mut self, ix: usize, v: Value) {
        self.values[ix] = v;
    }

    pub(crate) fn push_input(&mut self, initial: Value, action: InputAction) {
        self.values.push(initial);
        self.actions.push(UpdateAction::Input(action));
    }

    pub(crate) fn push_user(&mut self, initial: Value, body: Option<Box<[u8]>>) {
        self.values.push(initial);
        self.actions.push(UpdateAction::User(body));
    }

    pub(crate) fn reserve(&mut self, meter: &mut MemoryMeter, additional: usize) -> Result<(), VmError> {
        meter.charge(additional * Self::ENTRY_SIZE)?;
        self.values.reserve(additional);
        self.actions.reserve(additional);

        Ok(())
    }

    /// The updater bytecode of a user node, if one has been installed.
    pub(crate) fn body(&self, ix: usize) -> Option<&[u8]> {
        match &self.actions[ix] {
            UpdateAction::User(Some(body)) => Some(body),
            _ => None,
        }
    }

    /// Install or replace a user node's updater, returning the body it
    /// displaced.
    pub(crate) fn install_body(&mut self, ix: usize, body: Box<[u8]>) -> Result<Option<Box<[u8]>>, PanicReason> {
        match &mut self.actions[ix] {
            UpdateAction::User(slot) => Ok(slot.replace(body)),
            UpdateAction::Input(_) => Err(PanicReason::UserNodeExpected),
        }
    }

    /// Run the device-input callback of node `ix` against its value slot.
    pub(crate) fn sample_input(&mut self, ix: usize) -> Result<(), PanicReason> {
        let Self { values, actions } = self;

        match &mut actions[ix] {
            UpdateAction::Input(sample) => {
                sample(&mut values[ix]);
                Ok(())
            }
            UpdateAction::User(_) => Err(PanicReason::DeviceInputExpected),
        }
    }
}

/// Function bodies, indexed by function id.
#[derive(Default)]
pub struct FuncList {
    bodies: Vec<Box<[u8]>>,
}

impl FuncList {
    const ENTRY_SIZE: usize = mem::size_of::<Box<[u8]>>();

    pub(crate) fn len(&self) -> usize {
        self.bodies.len()
    }

    pub(crate) fn body(&self, ix: usize) -> &[u8] {
        &self.bodies[ix]
    }

    pub(crate) fn reserve(&mut self, meter: &mut MemoryMeter, additional: usize) -> Result<(), VmError> {
        meter.charge(additional * Self::ENTRY_SIZE)?;
        self.bodies.reserve(additional);

        Ok(())
    }

    pub(crate) fn push(&mut self, body: Box<[u8]>) {
        self.bodies.push(body);
    }

    pub(crate) fn replace(&mut self, ix: usize, body: Box<[u8]>) -> Box<[u8]> {
        mem::replace(&mut self.bodies[ix], body)
    }
}

/// Global data slots.
#[derive(Default)]
pub struct DataList {
    values: Vec<Value>,
}

impl DataList {
    pub(crate) fn value(&self, ix: usize) -> Value {
        self.values[ix]
    }

    pub(crate) fn set_value(&mut self, ix: usize, v: Value) {
        self.values[ix] = v;
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Extend by `additional` zero-initialised slots.
    pub(crate) fn grow(&mut self, meter: &mut MemoryMeter, additional: usize) -> Result<(), VmError> {
        meter.charge(additional * mem::size_of::<Value>())?;
        self.values.resize(self.values.len() + additional, Value::NIL);

        Ok(())
    }
}

/// Previous-cycle node values, indexed by per-program slot number.
#[derive(Default)]
pub struct LastValues {
    values: Vec<Value>,
}

impl LastValues {
    pub(crate) fn value(&self, ix: usize) -> Value {
        self.values[ix]
    }

    pub(crate) fn set_value(&mut self, ix: usize, v: Value) {
        self.values[ix] = v;
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Discard the slots of the previous program and allocate `count` fresh
    /// zero-initialised ones.
    pub(crate) fn replace(&mut self, meter: &mut MemoryMeter, count: usize) -> Result<(), VmError> {
        meter.credit(self.values.len() * mem::size_of::<Value>());
        meter.charge(count * mem::size_of::<Value>())?;
        self.values = vec![Value::NIL; count];

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_MEM_LIMIT;

    #[test]
    fn node_list_keeps_inputs_before_users() {
        let mut meter = MemoryMeter::new(DEFAULT_MEM_LIMIT);
        let mut nodes = NodeList::with_capacity(&mut meter, 2).unwrap();

        nodes.push_input(Value::int(1), Box::new(|_| {}));
        nodes.push_user(Value::int(2), None);

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes.value(0), Value::int(1));
        assert!(nodes.body(1).is_none());
        assert!(nodes.sample_input(1).is_err());
    }

    #[test]
    fn install_body_returns_the_displaced_one() {
        let mut meter = MemoryMeter::new(DEFAULT_MEM_LIMIT);
        let mut nodes = NodeList::with_capacity(&mut meter, 1).unwrap();
        nodes.push_user(Value::NIL, Some(vec![1, 2].into()));

        let old = nodes.install_body(0, vec![3].into()).unwrap();

        assert_eq!(old.as_deref(), Some(&[1u8, 2][..]));
        assert_eq!(nodes.body(0), Some(&[3u8][..]));
    }

    #[test]
    fn patching_an_input_node_is_rejected() {
        let mut meter = MemoryMeter::new(DEFAULT_MEM_LIMIT);
        let mut nodes = NodeList::with_capacity(&mut meter, 1).unwrap();
        nodes.push_input(Value::NIL, Box::new(|_| {}));

        assert_eq!(nodes.install_body(0, vec![1].into()), Err(PanicReason::UserNodeExpected));
    }

    #[test]
    fn data_grows_with_zeroed_slots() {
        let mut meter = MemoryMeter::new(DEFAULT_MEM_LIMIT);
        let mut data = DataList::default();

        data.grow(&mut meter, 3).unwrap();

        assert_eq!(data.len(), 3);
        assert_eq!(data.value(2), Value::NIL);
    }

    #[test]
    fn last_values_are_replaced_not_extended() {
        let mut meter = MemoryMeter::new(DEFAULT_MEM_LIMIT);
        let mut last = LastValues::default();

        last.replace(&mut meter, 2).unwrap();
        last.set_value(1, Value::int(9));
        last.replace(&mut meter, 1).unwrap();

        assert_eq!(last.len(), 1);
        assert_eq!(last.value(0), Value::NIL);
    }
}
