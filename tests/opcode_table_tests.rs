//! Tests du registre des opcodes

use dis_rust::opcode::names::{CURRENT_MNEMONICS, LEGACY_MNEMONICS};
use dis_rust::*;

#[test]
fn test_table_follows_mnemonic_order() {
    let table = OpcodeTable::new(SchemaVersion::Current).unwrap();

    assert_eq!(table.len(), CURRENT_MNEMONICS.len());
    for (index, schema) in table.schemas().enumerate() {
        assert_eq!(schema.opcode, Opcode(index as u16));
        assert_eq!(schema.mnemonic, CURRENT_MNEMONICS[index]);
        assert_eq!(table.lookup(schema.mnemonic), Some(schema.opcode));
    }
}

#[test]
fn test_legacy_table_follows_mnemonic_order() {
    let table = OpcodeTable::new(SchemaVersion::Legacy).unwrap();

    assert_eq!(table.version(), SchemaVersion::Legacy);
    assert_eq!(table.len(), LEGACY_MNEMONICS.len());
    for (index, name) in LEGACY_MNEMONICS.iter().enumerate() {
        assert_eq!(table.mnemonic(Opcode(index as u16)).unwrap(), *name);
    }
}

#[test]
fn test_out_of_range_mnemonic_is_an_error() {
    let table = OpcodeTable::new(SchemaVersion::Current).unwrap();

    let err = table.mnemonic(Opcode(CURRENT_MNEMONICS.len() as u16)).unwrap_err();
    assert!(matches!(err, DisError::UnknownOpcode { opcode: 60, .. }));
    assert!(table.schema_for(Opcode(u16::MAX)).is_err());

    // Hors d'un flux, l'erreur ne prétend pas connaître d'offset
    let err = table.schema_for(Opcode(500)).unwrap_err();
    assert_eq!(
        err,
        DisError::UnknownOpcode {
            opcode: 500,
            offset: None
        }
    );
    assert_eq!(err.to_string(), "opcode inconnu 500");
    assert_eq!(table.lookup("o_does_not_exist"), None);
}

#[test]
fn test_known_schemas() {
    let table = OpcodeTable::new(SchemaVersion::Current).unwrap();

    let load = table
        .schema_for(table.lookup("o_load_integer").unwrap())
        .unwrap();
    assert_eq!(load.opcode, Opcode(42));
    assert_eq!(load.steps.len(), 2);
    assert!(matches!(load.steps[0], DecodeStep::Dispatch { default_width: 1, .. }));
    assert!(matches!(
        load.steps[1],
        DecodeStep::RegisterRef(Direction::Out, Scope::Local)
    ));

    let ret = table
        .schema_for(table.lookup("o_return_value").unwrap())
        .unwrap();
    assert_eq!(ret.opcode, Opcode(31));
    assert!(matches!(
        ret.steps.as_slice(),
        [DecodeStep::RegisterRef(Direction::In, Scope::Local)]
    ));

    let exit = table.schema_for(table.lookup("o_vm_exit").unwrap()).unwrap();
    assert!(exit.is_bare());
}

#[test]
fn test_counter_precedes_counted_inputs() {
    let table = OpcodeTable::new(SchemaVersion::Current).unwrap();
    let call = table
        .schema_for(table.lookup("o_call_native").unwrap())
        .unwrap();

    let counter = call
        .steps
        .iter()
        .position(|step| matches!(step, DecodeStep::Counter("count:")))
        .unwrap();
    let inputs = call
        .steps
        .iter()
        .position(|step| {
            matches!(
                step,
                DecodeStep::RepeatedRegisterRef {
                    count: RepeatCount::Field("count:"),
                    ..
                }
            )
        })
        .unwrap();
    assert!(counter < inputs);
    assert!(call.class.contains(OpcodeClass::CALL));
}

#[test]
fn test_terminator_family() {
    let table = OpcodeTable::new(SchemaVersion::Current).unwrap();
    for name in ["o_return_value", "o_return_unit", "o_vm_exit"] {
        assert!(table.is_terminator(table.lookup(name).unwrap()), "{}", name);
    }
    for name in ["o_jump", "o_exception_raise", "o_call_native"] {
        assert!(!table.is_terminator(table.lookup(name).unwrap()), "{}", name);
    }
    assert!(!table.is_terminator(Opcode(999)));

    let legacy = OpcodeTable::new(SchemaVersion::Legacy).unwrap();
    for name in ["o_return_val", "o_return_noval", "o_return_from_vm"] {
        assert!(legacy.is_terminator(legacy.lookup(name).unwrap()), "{}", name);
    }
}

#[test]
fn test_branch_class_matches_jump_steps() {
    for version in [SchemaVersion::Current, SchemaVersion::Legacy] {
        let table = OpcodeTable::new(version).unwrap();
        for schema in table.schemas() {
            let has_jump = schema.steps.iter().any(|step| {
                matches!(
                    step,
                    DecodeStep::JumpTarget | DecodeStep::RepeatedJumpTarget(_)
                )
            });
            assert_eq!(
                has_jump,
                schema.class.contains(OpcodeClass::BRANCH),
                "{} ({})",
                schema.mnemonic,
                version
            );
        }
    }
}

#[test]
fn test_legacy_schemas_start_with_line_marker_when_tagged() {
    let table = OpcodeTable::new(SchemaVersion::Legacy).unwrap();

    let add = table.schema_for(table.lookup("o_integer_add").unwrap()).unwrap();
    assert!(matches!(add.steps[0], DecodeStep::LineMarker));

    let jump = table.schema_for(table.lookup("o_jump").unwrap()).unwrap();
    assert!(matches!(jump.steps.as_slice(), [DecodeStep::JumpTarget]));
}

#[test]
fn test_shared_table_is_built_once() {
    let first = OpcodeTable::shared(SchemaVersion::Current).unwrap();
    let second = OpcodeTable::shared(SchemaVersion::Current).unwrap();
    assert!(std::ptr::eq(first, second));

    let legacy = OpcodeTable::shared(SchemaVersion::Legacy).unwrap();
    assert!(!std::ptr::eq(first, legacy));
    assert_eq!(legacy.version(), SchemaVersion::Legacy);
}
