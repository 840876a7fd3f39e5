use pulse_vm::prelude::*;
use pulse_vm::util::test_helpers::{eval_frame, test_machine};

/// Run one immediate-eval frame and return everything the device wrote.
fn eval(ops: &[Opcode]) -> Vec<u8> {
    let mut vm = test_machine(0, 0);
    vm.new_bytecode(&eval_frame(ops)).unwrap();

    vm.transport_mut().take()
}

/// `Print` output for `v` followed by the success acknowledgement.
fn printed(v: i32) -> Vec<u8> {
    let mut out = vec![4u8];
    out.extend_from_slice(&v.to_le_bytes());
    out.push(0);

    out
}

#[test]
fn evaluates_two_plus_three_times_four() {
    let out = eval(&[
        Opcode::Int2,
        Opcode::Int3,
        Opcode::Add,
        Opcode::Int4,
        Opcode::Mul,
        Opcode::Print,
        Opcode::Halt,
    ]);

    assert_eq!(out, vec![0x04, 0x14, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn binary_operands_pop_right_then_left() {
    assert_eq!(eval(&[Opcode::IntI8(10), Opcode::Int4, Opcode::Sub, Opcode::Print, Opcode::Halt]), printed(6));
    assert_eq!(eval(&[Opcode::IntI8(13), Opcode::Int5, Opcode::Div, Opcode::Print, Opcode::Halt]), printed(2));
    assert_eq!(eval(&[Opcode::IntI8(13), Opcode::Int5, Opcode::Mod, Opcode::Print, Opcode::Halt]), printed(3));
}

#[test]
fn division_is_signed_and_truncates_towards_zero() {
    assert_eq!(eval(&[Opcode::IntI8(-7), Opcode::Int2, Opcode::Div, Opcode::Print, Opcode::Halt]), printed(-3));
    assert_eq!(eval(&[Opcode::IntI8(-7), Opcode::Int2, Opcode::Mod, Opcode::Print, Opcode::Halt]), printed(-1));
}

#[test]
fn arithmetic_wraps_two_complement() {
    assert_eq!(
        eval(&[Opcode::IntI32(i32::MAX), Opcode::Int1, Opcode::Add, Opcode::Print, Opcode::Halt]),
        printed(i32::MIN),
    );
    assert_eq!(
        eval(&[Opcode::IntI32(i32::MIN), Opcode::Neg, Opcode::Print, Opcode::Halt]),
        printed(i32::MIN),
    );
}

#[test]
fn comparisons_are_signed_and_push_zero_or_one() {
    assert_eq!(eval(&[Opcode::IntI8(-1), Opcode::Int0, Opcode::Lt, Opcode::Print, Opcode::Halt]), printed(1));
    assert_eq!(eval(&[Opcode::Int3, Opcode::Int3, Opcode::Le, Opcode::Print, Opcode::Halt]), printed(1));
    assert_eq!(eval(&[Opcode::Int2, Opcode::Int3, Opcode::Gt, Opcode::Print, Opcode::Halt]), printed(0));
    assert_eq!(eval(&[Opcode::Int2, Opcode::Int2, Opcode::Ge, Opcode::Print, Opcode::Halt]), printed(1));
    assert_eq!(eval(&[Opcode::Int5, Opcode::Int5, Opcode::Eq, Opcode::Print, Opcode::Halt]), printed(1));
    assert_eq!(eval(&[Opcode::Int5, Opcode::Int4, Opcode::Ne, Opcode::Print, Opcode::Halt]), printed(1));
}

#[test]
fn logical_not_and_booleans() {
    assert_eq!(eval(&[Opcode::PushTrue, Opcode::Not, Opcode::Print, Opcode::Halt]), printed(0));
    assert_eq!(eval(&[Opcode::PushFalse, Opcode::Not, Opcode::Print, Opcode::Halt]), printed(1));
    assert_eq!(eval(&[Opcode::IntI8(42), Opcode::Not, Opcode::Print, Opcode::Halt]), printed(0));
}

#[test]
fn bitwise_and_shift_family() {
    assert_eq!(eval(&[Opcode::IntI8(0b1100), Opcode::IntI8(0b1010), Opcode::And, Opcode::Print, Opcode::Halt]), printed(0b1000));
    assert_eq!(eval(&[Opcode::IntI8(0b1100), Opcode::IntI8(0b1010), Opcode::Or, Opcode::Print, Opcode::Halt]), printed(0b1110));
    assert_eq!(eval(&[Opcode::IntI8(0b1100), Opcode::IntI8(0b1010), Opcode::Xor, Opcode::Print, Opcode::Halt]), printed(0b0110));
    assert_eq!(eval(&[Opcode::Int1, Opcode::Int4, Opcode::Shl, Opcode::Print, Opcode::Halt]), printed(16));
    assert_eq!(eval(&[Opcode::IntI8(-16), Opcode::Int2, Opcode::Shr, Opcode::Print, Opcode::Halt]), printed(-4));
}

#[test]
fn wide_literals_read_little_endian() {
    assert_eq!(eval(&[Opcode::IntI16(-300), Opcode::Print, Opcode::Halt]), printed(-300));
    assert_eq!(eval(&[Opcode::IntI32(0x0102_0304), Opcode::Print, Opcode::Halt]), printed(0x0102_0304));
    assert_eq!(eval(&[Opcode::Int6, Opcode::Print, Opcode::Halt]), printed(6));
}

#[test]
fn dup_copies_the_top_word() {
    assert_eq!(eval(&[Opcode::Int3, Opcode::Dup, Opcode::Add, Opcode::Print, Opcode::Halt]), printed(6));
}

#[test]
fn conditional_jump_taken_skips_the_abort() {
    let out = eval(&[Opcode::PushTrue, Opcode::Je8(1), Opcode::Abort, Opcode::Halt]);

    assert_eq!(out, vec![0x00]);
}

#[test]
fn conditional_jump_falls_through_into_the_abort() {
    let mut vm = test_machine(0, 0);
    let res = vm.new_bytecode(&eval_frame(&[
        Opcode::PushFalse,
        Opcode::Je8(1),
        Opcode::Abort,
        Opcode::Halt,
    ]));

    assert_eq!(res, Err(VmError::Aborted));
    assert_eq!(vm.transport().bytes(), &[0x01]);
}

#[test]
fn jump_if_false_mirrors_jump_if_true() {
    assert_eq!(eval(&[Opcode::PushFalse, Opcode::Jne8(1), Opcode::Abort, Opcode::Halt]), vec![0x00]);
}

#[test]
fn wide_conditionals_skip_their_full_operand_when_not_taken() {
    // Fall-through must resume exactly after the 2- or 4-byte displacement.
    assert_eq!(eval(&[Opcode::PushFalse, Opcode::Je16(100), Opcode::Halt]), vec![0x00]);
    assert_eq!(eval(&[Opcode::PushFalse, Opcode::Je32(100), Opcode::Halt]), vec![0x00]);
    assert_eq!(eval(&[Opcode::PushTrue, Opcode::Jne32(100), Opcode::Halt]), vec![0x00]);
}

#[test]
fn degenerate_jump_widths() {
    // J0 is a no-op; J1 skips one byte; Je1 skips one byte when taken; Je0
    // only discards the condition.
    assert_eq!(eval(&[Opcode::J0, Opcode::Halt]), vec![0x00]);
    assert_eq!(eval(&[Opcode::J1, Opcode::Abort, Opcode::Halt]), vec![0x00]);
    assert_eq!(eval(&[Opcode::PushTrue, Opcode::Je1, Opcode::Abort, Opcode::Halt]), vec![0x00]);
    assert_eq!(eval(&[Opcode::PushFalse, Opcode::Jne1, Opcode::Abort, Opcode::Halt]), vec![0x00]);
    assert_eq!(eval(&[Opcode::PushTrue, Opcode::Je0, Opcode::Halt]), vec![0x00]);
}

#[test]
fn displacements_jump_both_directions() {
    // Forward over the print-and-halt tail, then backward into it.
    let out = eval(&[
        Opcode::J8(4),
        Opcode::IntI8(9),
        Opcode::Print,
        Opcode::Halt,
        Opcode::J8(-6),
    ]);

    assert_eq!(out, printed(9));
}

#[test]
fn unknown_opcode_reports_its_status() {
    let mut vm = test_machine(0, 0);
    let res = vm.new_bytecode(&[1u8, 0x00]);

    assert_eq!(res, Err(VmError::UnknownOpcode(0x00)));
    assert_eq!(vm.transport().bytes(), &[0x03]);
}
