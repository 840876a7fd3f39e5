use pulse_vm::prelude::*;
use pulse_vm::util::test_helpers::{test_machine, ImageBuilder};

use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn one_tick_moves_a_sample_from_input_to_output() {
    let mut vm = test_machine(1, 1);

    let reading = Rc::new(RefCell::new(5));
    let source = Rc::clone(&reading);
    vm.add_input_node(
        Value::int(0),
        Box::new(move |slot| *slot = Value::int(*source.borrow())),
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    vm.add_output_node(Value::int(0), Box::new(move |v| sink.borrow_mut().push(*v)));

    // Node 0 is the input; node 1 mirrors it and feeds output action 0.
    let image = ImageBuilder::new()
        .node(1, &[Opcode::GetNodeU8(0), Opcode::EndUpdU8(1)])
        .update(&[
            Opcode::UpdDev0,
            Opcode::UpdNodeU8(1),
            Opcode::GetNodeU8(1),
            Opcode::Output0,
            Opcode::Pop1,
            Opcode::Halt,
        ])
        .finish();
    vm.new_bytecode(&image).unwrap();

    vm.update().unwrap();
    assert_eq!(vm.node_value(1), Value::int(5));
    assert_eq!(*seen.borrow(), vec![Value::int(5)]);

    *reading.borrow_mut() = 9;
    vm.update().unwrap();
    assert_eq!(*seen.borrow(), vec![Value::int(5), Value::int(9)]);
}

#[test]
fn last_values_carry_state_between_ticks() {
    let mut vm = test_machine(0, 0);

    // counter = last(counter) + 1
    let image = ImageBuilder::new()
        .grow_nodes(1)
        .last_values(1)
        .node(0, &[Opcode::GetLastU8(0), Opcode::Int1, Opcode::Add, Opcode::EndUpdU8(0)])
        .update(&[
            Opcode::GetNodeU8(0),
            Opcode::SetLastU8(0),
            Opcode::UpdNodeU8(0),
            Opcode::Halt,
        ])
        .finish();
    vm.new_bytecode(&image).unwrap();

    for _ in 0..3 {
        vm.update().unwrap();
    }

    assert_eq!(vm.node_value(0), Value::int(3));
    assert_eq!(vm.last_value(0), Value::int(2));
}

#[test]
fn a_well_formed_cycle_leaves_the_heap_balanced() {
    let mut vm = test_machine(0, 0);
    let header = Header::new(0, 2, 0, 1);

    // The node builds a pair, reads one field out of it and releases it
    // before the epilogue.
    let image = ImageBuilder::new()
        .grow_nodes(1)
        .node(
            0,
            &[
                Opcode::IntI8(5),
                Opcode::IntI8(6),
                Opcode::AllocObj2(header.to_u32()),
                Opcode::SetLocal0,
                Opcode::GetLocal0,
                Opcode::ObjField1,
                Opcode::DropLocal0,
                Opcode::EndUpdU8(0),
            ],
        )
        .update(&[Opcode::AllocLocal1, Opcode::UpdNodeU8(0), Opcode::Pop1, Opcode::Halt])
        .finish();
    vm.new_bytecode(&image).unwrap();

    let before = vm.heap().live_objects();
    vm.update().unwrap();

    assert_eq!(vm.heap().live_objects(), before);
    assert_eq!(vm.node_value(0), Value::int(6));
}

#[test]
fn object_valued_nodes_drop_the_previous_cycle_value() {
    let mut vm = test_machine(0, 0);
    let header = Header::new(4, 1, 0, 1);

    let image = ImageBuilder::new()
        .grow_nodes(1)
        .node(0, &[Opcode::Int1, Opcode::AllocObj1(header.to_u32()), Opcode::EndUpdObjU8(0)])
        .update(&[Opcode::UpdNodeU8(0), Opcode::Halt])
        .finish();
    vm.new_bytecode(&image).unwrap();

    vm.update().unwrap();
    assert_eq!(vm.heap().live_objects(), 1);

    vm.update().unwrap();
    vm.update().unwrap();

    assert_eq!(vm.heap().live_objects(), 1);
    assert_eq!(vm.heap().refcount(vm.node_value(0)), Some(1));
}

#[test]
fn updating_a_node_with_no_body_panics() {
    let mut vm = test_machine(0, 1);
    vm.add_output_node(Value::int(0), Box::new(|_| {}));

    let image = ImageBuilder::new()
        .update(&[Opcode::UpdNodeU8(0), Opcode::Halt])
        .finish();
    vm.new_bytecode(&image).unwrap();

    assert_eq!(vm.update(), Err(VmError::Panic(PanicReason::NodeBodyMissing)));
}

#[test]
fn device_dispatch_on_a_user_node_panics() {
    let mut vm = test_machine(0, 0);

    let image = ImageBuilder::new()
        .grow_nodes(1)
        .node(0, &[Opcode::Int1, Opcode::EndUpdU8(0)])
        .update(&[Opcode::UpdDev0, Opcode::Halt])
        .finish();
    vm.new_bytecode(&image).unwrap();

    assert_eq!(vm.update(), Err(VmError::Panic(PanicReason::DeviceInputExpected)));
}

#[test]
fn the_stack_high_water_mark_tracks_the_deepest_push() {
    let mut vm = test_machine(0, 0);

    let image = ImageBuilder::new()
        .update(&[
            Opcode::Int1,
            Opcode::Int2,
            Opcode::Int3,
            Opcode::Pop3,
            Opcode::Halt,
        ])
        .finish();
    vm.new_bytecode(&image).unwrap();
    vm.update().unwrap();

    assert_eq!(vm.stack_high_water(), 3);
}
