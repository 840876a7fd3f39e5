use pulse_vm::prelude::*;
use pulse_vm::util::test_helpers::{eval_frame, test_machine, ImageBuilder};

/// Host-side view of one serialised object, reparsed from the wire.
#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    Word(i32),
    Obj { header: Header, fields: Vec<Parsed> },
}

/// Reparse a `PrintObj` payload the way the host tooling does.
fn parse_object(bytes: &mut &[u8]) -> Parsed {
    let header = Header::from(u32::from_le_bytes(bytes[..4].try_into().unwrap()));
    *bytes = &bytes[4..];

    let fields = (0..header.entries())
        .map(|i| {
            if header.field_is_obj(i) {
                parse_object(bytes)
            } else {
                let word = i32::from_le_bytes(bytes[..4].try_into().unwrap());
                *bytes = &bytes[4..];
                Parsed::Word(word)
            }
        })
        .collect();

    Parsed::Obj { header, fields }
}

#[test]
fn allocation_pops_fields_in_reverse_and_starts_at_refcount_one() {
    let mut vm = test_machine(0, 0);
    let header = Header::new(5, 2, 0, 1);

    // Field 0 is printed through an un-tracked read, so push order 7, 9
    // must lay the fields out left to right.
    vm.new_bytecode(&eval_frame(&[
        Opcode::IntI8(7),
        Opcode::IntI8(9),
        Opcode::AllocObj2(header.to_u32()),
        Opcode::ObjField0,
        Opcode::Print,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.transport().bytes(), &[0x04, 0x07, 0x00, 0x00, 0x00, 0x00]);
    // The container was popped without a drop, so it stays allocated.
    assert_eq!(vm.heap().live_objects(), 1);
}

#[test]
fn data_slot_holds_a_reference_across_frames() {
    let mut vm = test_machine(0, 0);
    let header = Header::new(5, 2, 0, 1);

    vm.new_bytecode(&ImageBuilder::new().grow_data(1).finish()).unwrap();

    vm.new_bytecode(&eval_frame(&[
        Opcode::AllocLocal1,
        Opcode::IntI8(7),
        Opcode::IntI8(9),
        Opcode::AllocObj2(header.to_u32()),
        Opcode::SetDataRefU8(0),
        Opcode::GetDataRefU8(0),
        Opcode::SetLocal0,
        Opcode::GetLocal0,
        Opcode::ObjFieldRef1,
        Opcode::Print,
        Opcode::DropLocal0,
        Opcode::Pop1,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.transport().bytes(), &[0x00, 0x04, 0x09, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(vm.heap().live_objects(), 1);
    assert_eq!(vm.heap().refcount(vm.data_value(0)), Some(1));

    // A tracked read followed by a tracked write of the same slot must not
    // disturb the count.
    vm.transport_mut().clear();
    vm.new_bytecode(&eval_frame(&[
        Opcode::GetDataRefU8(0),
        Opcode::SetDataRefU8(0),
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.heap().refcount(vm.data_value(0)), Some(1));
    assert_eq!(vm.heap().live_objects(), 1);
}

#[test]
fn tag_dispatch_takes_the_matching_branch() {
    let mut vm = test_machine(0, 0);
    let header = Header::new(2, 1, 0, 1);

    vm.new_bytecode(&eval_frame(&[
        Opcode::IntI8(99),
        Opcode::AllocObj1(header.to_u32()),
        Opcode::ObjTag,
        Opcode::Int2,
        Opcode::Eq,
        Opcode::Je8(1),
        Opcode::Abort,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.transport().bytes(), &[0x00]);
}

#[test]
fn print_obj_serialises_depth_first_and_drops_its_reference() {
    let mut vm = test_machine(0, 0);
    let inner = Header::new(3, 1, 0, 1);
    let outer = Header::new(1, 2, 0b01, 1);

    vm.new_bytecode(&eval_frame(&[
        Opcode::IntI8(7),
        Opcode::AllocObj1(inner.to_u32()),
        Opcode::IntI8(42),
        Opcode::AllocObj2(outer.to_u32()),
        Opcode::PrintObj,
        Opcode::Halt,
    ]))
    .unwrap();

    let mut expected = vec![16u8];
    expected.extend_from_slice(&outer.to_u32().to_le_bytes());
    expected.extend_from_slice(&inner.to_u32().to_le_bytes());
    expected.extend_from_slice(&7i32.to_le_bytes());
    expected.extend_from_slice(&42i32.to_le_bytes());
    expected.push(0);

    assert_eq!(vm.transport().bytes(), expected);
    assert_eq!(vm.heap().live_objects(), 0);
}

#[test]
fn serialised_objects_reparse_structurally_identical() {
    let mut vm = test_machine(0, 0);
    let inner = Header::new(3, 1, 0, 1);
    let outer = Header::new(1, 2, 0b01, 1);

    vm.new_bytecode(&eval_frame(&[
        Opcode::IntI8(7),
        Opcode::AllocObj1(inner.to_u32()),
        Opcode::IntI8(42),
        Opcode::AllocObj2(outer.to_u32()),
        Opcode::PrintObj,
        Opcode::Halt,
    ]))
    .unwrap();

    let written = vm.transport().bytes();
    let size = usize::from(written[0]);
    let mut payload = &written[1..1 + size];

    let parsed = parse_object(&mut payload);
    assert!(payload.is_empty());

    assert_eq!(
        parsed,
        Parsed::Obj {
            header: outer,
            fields: vec![
                Parsed::Obj {
                    header: inner,
                    fields: vec![Parsed::Word(7)],
                },
                Parsed::Word(42),
            ],
        }
    );
}

#[test]
fn tracked_local_reads_and_drops_balance_out() {
    let mut vm = test_machine(0, 0);
    let header = Header::new(0, 1, 0, 1);

    vm.new_bytecode(&eval_frame(&[
        Opcode::AllocLocal1,
        Opcode::Int1,
        Opcode::AllocObj1(header.to_u32()),
        Opcode::SetLocal0,
        Opcode::GetLocalRef0,
        Opcode::Pop1,
        Opcode::DropLocal0,
        Opcode::DropLocal0,
        Opcode::Pop1,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.heap().live_objects(), 0);
}

#[test]
fn set_local_ref_drops_the_previous_occupant() {
    let mut vm = test_machine(0, 0);
    let header = Header::new(0, 0, 0, 1);

    vm.new_bytecode(&eval_frame(&[
        Opcode::AllocLocal1,
        Opcode::AllocObj0(header.to_u32()),
        Opcode::SetLocal0,
        Opcode::AllocObj0(header.to_u32()),
        Opcode::SetLocalRef0,
        Opcode::DropLocal0,
        Opcode::Pop1,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.heap().live_objects(), 0);
}

#[test]
fn nil_is_the_null_reference_for_drops() {
    let mut vm = test_machine(0, 0);

    vm.new_bytecode(&eval_frame(&[
        Opcode::AllocLocal1,
        Opcode::Nil,
        Opcode::SetLocal0,
        Opcode::DropLocal0,
        Opcode::Pop1,
        Opcode::Halt,
    ]))
    .unwrap();

    assert_eq!(vm.transport().bytes(), &[0x00]);
    assert_eq!(vm.heap().live_objects(), 0);
}
