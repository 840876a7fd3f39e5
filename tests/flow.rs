use pulse_vm::prelude::*;
use pulse_vm::util::test_helpers::{eval_frame, test_machine, ImageBuilder};

#[test]
fn calls_a_two_argument_function() {
    let mut vm = test_machine(0, 0);

    let image = ImageBuilder::new()
        .grow_funcs(1)
        .func(0, &[Opcode::GetLocal0, Opcode::GetLocal1, Opcode::Add, Opcode::Ret])
        .finish();
    vm.new_bytecode(&image).unwrap();

    vm.new_bytecode(&eval_frame(&[
        Opcode::IntI8(10),
        Opcode::IntI8(20),
        Opcode::CallU8(2, 0),
        Opcode::Print,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.transport().bytes(), &[0x00, 0x04, 0x1e, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn nested_calls_restore_each_caller() {
    let mut vm = test_machine(0, 0);

    // func 0 doubles its argument; func 1 composes it twice.
    let image = ImageBuilder::new()
        .grow_funcs(2)
        .func(0, &[Opcode::GetLocal0, Opcode::Int2, Opcode::Mul, Opcode::Ret])
        .func(
            1,
            &[Opcode::GetLocal0, Opcode::CallU8(1, 0), Opcode::CallU8(1, 0), Opcode::Ret],
        )
        .finish();
    vm.new_bytecode(&image).unwrap();

    vm.new_bytecode(&eval_frame(&[
        Opcode::Int5,
        Opcode::CallU16(1, 1),
        Opcode::Print,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.transport().bytes(), &[0x00, 0x04, 0x14, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn recursion_through_the_frame_stack() {
    let mut vm = test_machine(0, 0);

    // factorial(n): n == 0 ? 1 : n * factorial(n - 1)
    let image = ImageBuilder::new()
        .grow_funcs(1)
        .func(
            0,
            &[
                Opcode::GetLocal0,
                Opcode::Je8(2),
                Opcode::Int1,
                Opcode::Ret,
                Opcode::GetLocal0,
                Opcode::Int1,
                Opcode::Sub,
                Opcode::CallU8(1, 0),
                Opcode::Mul,
                Opcode::Ret,
            ],
        )
        .finish();
    vm.new_bytecode(&image).unwrap();

    vm.new_bytecode(&eval_frame(&[
        Opcode::IntI8(5),
        Opcode::CallU8(1, 0),
        Opcode::Print,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.transport().bytes(), &[0x00, 0x04, 0x78, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn arguments_are_the_callee_locals_and_are_discarded_on_return() {
    let mut vm = test_machine(0, 0);

    // Returns only its second argument; the first must vanish with the
    // frame, leaving a balanced stack for Halt's debug check.
    let image = ImageBuilder::new()
        .grow_funcs(1)
        .func(0, &[Opcode::GetLocal1, Opcode::Ret])
        .finish();
    vm.new_bytecode(&image).unwrap();

    vm.new_bytecode(&eval_frame(&[
        Opcode::IntI8(7),
        Opcode::IntI8(8),
        Opcode::CallU8(2, 0),
        Opcode::Print,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.transport().bytes(), &[0x00, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn return_without_a_frame_panics() {
    let mut vm = test_machine(0, 0);

    let res = vm.new_bytecode(&eval_frame(&[Opcode::Int0, Opcode::Ret, Opcode::Halt]));

    assert_eq!(res, Err(VmError::Panic(PanicReason::CallFrameMissing)));
    assert_eq!(vm.transport().bytes(), &[0x02]);
}

#[test]
fn abort_reports_a_runtime_error() {
    let mut vm = test_machine(0, 0);

    let res = vm.new_bytecode(&eval_frame(&[Opcode::Abort]));

    assert_eq!(res, Err(VmError::Aborted));
    assert_eq!(vm.transport().bytes(), &[0x01]);
}

#[test]
fn unbalanced_stack_at_halt_panics_in_debug() {
    let mut vm = test_machine(0, 0);

    let res = vm.new_bytecode(&eval_frame(&[Opcode::Int1, Opcode::Halt]));

    assert_eq!(res, Err(VmError::Panic(PanicReason::UnbalancedStack)));
    assert_eq!(vm.transport().bytes(), &[0x02]);
}

#[test]
fn locals_address_relative_to_the_base_pointer() {
    let mut vm = test_machine(0, 0);

    vm.new_bytecode(&eval_frame(&[
        Opcode::AllocLocal2,
        Opcode::IntI8(11),
        Opcode::SetLocal0,
        Opcode::IntI8(31),
        Opcode::SetLocal1,
        Opcode::GetLocal0,
        Opcode::GetLocalI8(1),
        Opcode::Add,
        Opcode::Print,
        Opcode::Pop2,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.transport().bytes(), &[0x04, 0x2a, 0x00, 0x00, 0x00, 0x00]);
}
