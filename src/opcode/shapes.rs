//! Formes des instructions par version de schéma
//!
//! Chaque opcode est décrit par le nombre de mots de chacune de ses sections.
//! La forme historique commence par un marqueur de ligne et possède trois
//! sections spéciales ; la forme actuelle n'en a qu'une.
//!
//! Les arités viennent de la sémantique des opcodes de la VM : une section
//! `Counted` est précédée d'un compteur qui donne le nombre de registres.

use super::schema::{
    DecodeStep, Direction, OpcodeClass, RepeatCount, Scope, COUNT_LABEL,
};

/// Arité d'une section de registres ou de sauts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arity {
    Fixed(usize),
    /// Donnée par le compteur `count:` de la même instruction
    Counted,
}

impl Arity {
    pub(crate) fn repeat_count(self) -> Option<RepeatCount> {
        match self {
            Arity::Fixed(0) => None,
            Arity::Fixed(n) => Some(RepeatCount::Fixed(n)),
            Arity::Counted => Some(RepeatCount::Field(COUNT_LABEL)),
        }
    }
}

/// Nombre de mots de chaque section d'une instruction
#[derive(Debug, Clone, Copy)]
pub(crate) struct Shape {
    pub line: bool,
    pub special_1: usize,
    pub counter: bool,
    pub inputs: Arity,
    pub special_4: usize,
    pub outputs: Arity,
    pub special_6: usize,
    pub jumps: Arity,
    pub class: OpcodeClass,
}

impl Shape {
    pub(crate) const fn new() -> Self {
        Self {
            line: false,
            special_1: 0,
            counter: false,
            inputs: Arity::Fixed(0),
            special_4: 0,
            outputs: Arity::Fixed(0),
            special_6: 0,
            jumps: Arity::Fixed(0),
            class: OpcodeClass::empty(),
        }
    }

    const fn line(self) -> Self {
        Self { line: true, ..self }
    }

    const fn special(self, words: usize) -> Self {
        Self {
            special_1: words,
            ..self
        }
    }

    const fn counter(self) -> Self {
        Self {
            counter: true,
            ..self
        }
    }

    const fn inputs(self, n: usize) -> Self {
        Self {
            inputs: Arity::Fixed(n),
            ..self
        }
    }

    const fn counted_inputs(self) -> Self {
        Self {
            inputs: Arity::Counted,
            ..self
        }
    }

    const fn special_4(self, words: usize) -> Self {
        Self {
            special_4: words,
            ..self
        }
    }

    const fn outputs(self, n: usize) -> Self {
        Self {
            outputs: Arity::Fixed(n),
            ..self
        }
    }

    const fn counted_outputs(self) -> Self {
        Self {
            outputs: Arity::Counted,
            ..self
        }
    }

    const fn special_6(self, words: usize) -> Self {
        Self {
            special_6: words,
            ..self
        }
    }

    const fn jumps(self, n: usize) -> Self {
        Self {
            jumps: Arity::Fixed(n),
            class: self.class.union(OpcodeClass::BRANCH),
            ..self
        }
    }

    const fn counted_jumps(self) -> Self {
        Self {
            jumps: Arity::Counted,
            class: self.class.union(OpcodeClass::BRANCH),
            ..self
        }
    }

    const fn call(self) -> Self {
        Self {
            class: self.class.union(OpcodeClass::CALL),
            ..self
        }
    }

    const fn terminator(self) -> Self {
        Self {
            class: self.class.union(OpcodeClass::TERMINATOR),
            ..self
        }
    }
}

/// Bras des sections spéciales, indexés par mnémonique
#[derive(Debug, Default)]
pub(crate) struct SpecialArms {
    pub first: Vec<(&'static str, Vec<DecodeStep>)>,
    pub fourth: Vec<(&'static str, Vec<DecodeStep>)>,
    pub sixth: Vec<(&'static str, Vec<DecodeStep>)>,
}

fn scalar(label: &'static str) -> Vec<DecodeStep> {
    vec![DecodeStep::Scalar(label)]
}

fn register(direction: Direction, scope: Scope) -> Vec<DecodeStep> {
    vec![DecodeStep::RegisterRef(direction, scope)]
}

// ================================================================
// Forme actuelle : spéciale, compteur, entrées, sorties, sauts
// ================================================================

const BINARY: Shape = Shape::new().inputs(2).outputs(1);
const UNARY: Shape = Shape::new().inputs(1).outputs(1);
const LOAD: Shape = Shape::new().special(1).outputs(1);
const BUILD: Shape = Shape::new().counter().counted_inputs().outputs(1);
const CALL: Shape = Shape::new()
    .special(1)
    .counter()
    .counted_inputs()
    .outputs(1)
    .call();

pub(crate) const CURRENT_SHAPES: [(&str, Shape); 60] = [
    ("o_assign", UNARY),
    ("o_assign_noref", UNARY),
    ("o_int_add", BINARY),
    ("o_int_minus", BINARY),
    ("o_int_modulo", BINARY),
    ("o_int_multiply", BINARY),
    ("o_int_divide", BINARY),
    ("o_int_left_shift", BINARY),
    ("o_int_right_shift", BINARY),
    ("o_int_bitwise_and", BINARY),
    ("o_int_bitwise_or", BINARY),
    ("o_int_bitwise_xor", BINARY),
    ("o_number_add", BINARY),
    ("o_number_minus", BINARY),
    ("o_number_multiply", BINARY),
    ("o_number_divide", BINARY),
    ("o_compare_eq", BINARY),
    ("o_compare_not_eq", BINARY),
    ("o_compare_greater", BINARY),
    ("o_compare_greater_eq", BINARY),
    ("o_unary_not", UNARY),
    ("o_unary_minus", UNARY),
    ("o_unary_bitwise_not", UNARY),
    ("o_jump", Shape::new().jumps(1)),
    ("o_jump_if", Shape::new().special(1).inputs(1).jumps(1)),
    // Identifiant de classe non étiqueté : sauté en silence
    ("o_jump_if_not_class", Shape::new().special(1).inputs(1).jumps(1)),
    ("o_for_integer", Shape::new().inputs(3).outputs(1).jumps(1)),
    ("o_for_setup", Shape::new().inputs(3).outputs(1)),
    ("o_call_foreign", CALL),
    ("o_call_native", CALL),
    ("o_call_register", CALL),
    ("o_return_value", Shape::new().inputs(1).terminator()),
    ("o_return_unit", Shape::new().terminator()),
    ("o_build_list", BUILD),
    ("o_build_tuple", BUILD),
    ("o_build_hash", BUILD),
    (
        "o_build_variant",
        Shape::new().special(1).counter().counted_inputs().outputs(1),
    ),
    ("o_subscript_get", BINARY),
    ("o_subscript_set", Shape::new().inputs(3)),
    ("o_global_get", LOAD),
    ("o_global_set", Shape::new().special(1).inputs(1)),
    ("o_load_readonly", LOAD),
    ("o_load_integer", LOAD),
    ("o_load_boolean", LOAD),
    ("o_load_byte", LOAD),
    ("o_load_empty_variant", LOAD),
    ("o_instance_new", LOAD),
    ("o_property_get", Shape::new().special(1).inputs(1).outputs(1)),
    ("o_property_set", Shape::new().special(1).inputs(2)),
    ("o_catch_push", Shape::new().jumps(1)),
    ("o_catch_pop", Shape::new()),
    ("o_exception_catch", Shape::new().special(1).jumps(1)),
    ("o_exception_store", Shape::new().outputs(1)),
    ("o_exception_raise", Shape::new().inputs(1)),
    ("o_closure_get", LOAD),
    ("o_closure_set", Shape::new().special(1).inputs(1)),
    ("o_closure_new", LOAD),
    // Indice du littéral de fonction non étiqueté
    ("o_closure_function", LOAD),
    ("o_interpolation", BUILD),
    ("o_vm_exit", Shape::new().terminator()),
];

pub(crate) fn current_arms() -> SpecialArms {
    use Direction::{In, Out};

    let first = vec![
        ("o_jump_if", scalar("truthy:")),
        ("o_load_integer", scalar("value:")),
        ("o_load_boolean", scalar("value:")),
        ("o_load_byte", scalar("value:")),
        ("o_global_set", register(In, Scope::Global)),
        ("o_global_get", register(Out, Scope::Global)),
        ("o_call_register", register(In, Scope::Local)),
        ("o_call_foreign", scalar("func:")),
        ("o_call_native", scalar("func:")),
        ("o_build_variant", scalar("variant:")),
        ("o_load_empty_variant", scalar("variant:")),
        ("o_exception_catch", scalar("class:")),
        ("o_instance_new", scalar("class:")),
        ("o_load_readonly", scalar("literal:")),
        ("o_property_get", scalar("index:")),
        ("o_property_set", scalar("index:")),
        ("o_closure_set", register(In, Scope::Upvalue)),
        ("o_closure_get", register(Out, Scope::Upvalue)),
        ("o_closure_new", scalar("size:")),
    ];

    SpecialArms {
        first,
        ..SpecialArms::default()
    }
}

// ================================================================
// Forme historique : ligne, spéciale, compteur, entrées, spéciale,
// sorties, spéciale, sauts
// ================================================================

const L_BINARY: Shape = Shape::new().line().inputs(2).outputs(1);
const L_UNARY: Shape = Shape::new().line().inputs(1).outputs(1);
const L_LOAD: Shape = Shape::new().line().special(1).outputs(1);
const L_BUILD: Shape = Shape::new().line().counter().counted_inputs().outputs(1);
// Le résultat précède les arguments, placés dans la sixième section
const L_CALL: Shape = Shape::new()
    .line()
    .special(1)
    .counter()
    .outputs(1)
    .special_6(1)
    .call();

pub(crate) const LEGACY_SHAPES: [(&str, Shape); 66] = [
    ("o_fast_assign", L_UNARY),
    ("o_assign", L_UNARY),
    ("o_integer_add", L_BINARY),
    ("o_integer_minus", L_BINARY),
    ("o_modulo", L_BINARY),
    ("o_integer_mul", L_BINARY),
    ("o_integer_div", L_BINARY),
    ("o_left_shift", L_BINARY),
    ("o_right_shift", L_BINARY),
    ("o_bitwise_and", L_BINARY),
    ("o_bitwise_or", L_BINARY),
    ("o_bitwise_xor", L_BINARY),
    ("o_double_add", L_BINARY),
    ("o_double_minus", L_BINARY),
    ("o_double_mul", L_BINARY),
    ("o_double_div", L_BINARY),
    ("o_is_equal", L_BINARY),
    ("o_not_eq", L_BINARY),
    ("o_less", L_BINARY),
    ("o_less_eq", L_BINARY),
    ("o_greater", L_BINARY),
    ("o_greater_eq", L_BINARY),
    ("o_unary_not", L_UNARY),
    ("o_unary_minus", L_UNARY),
    ("o_jump", Shape::new().jumps(1)),
    ("o_jump_if", Shape::new().special(1).inputs(1).jumps(1)),
    ("o_integer_for", Shape::new().line().inputs(3).outputs(1).jumps(1)),
    ("o_for_setup", Shape::new().line().inputs(3).outputs(1)),
    ("o_foreign_call", L_CALL),
    ("o_native_call", L_CALL),
    ("o_function_call", L_CALL),
    ("o_return_val", Shape::new().line().inputs(1).terminator()),
    ("o_return_noval", Shape::new().line().terminator()),
    ("o_build_list", L_BUILD),
    ("o_build_tuple", L_BUILD),
    ("o_build_hash", L_BUILD),
    (
        "o_build_enum",
        Shape::new()
            .line()
            .special(1)
            .counter()
            .counted_inputs()
            .outputs(1),
    ),
    ("o_get_item", L_BINARY),
    ("o_set_item", Shape::new().line().inputs(3)),
    ("o_get_global", L_LOAD),
    ("o_set_global", Shape::new().line().special(1).inputs(1)),
    ("o_get_readonly", L_LOAD),
    ("o_get_integer", L_LOAD),
    ("o_get_boolean", L_LOAD),
    ("o_new_instance_basic", L_LOAD),
    ("o_new_instance_speculative", L_LOAD),
    ("o_new_instance_tagged", L_LOAD),
    ("o_get_property", Shape::new().line().special(1).inputs(1).outputs(1)),
    ("o_set_property", Shape::new().line().special(1).inputs(2)),
    ("o_push_try", Shape::new().line().jumps(1)),
    ("o_pop_try", Shape::new()),
    ("o_except_ignore", Shape::new().line().special(2).jumps(1)),
    ("o_except_catch", Shape::new().line().special(1).outputs(1).jumps(1)),
    ("o_raise", Shape::new().line().inputs(1)),
    (
        "o_match_dispatch",
        Shape::new().line().special(3).counter().counted_jumps(),
    ),
    (
        "o_variant_decompose",
        Shape::new().line().counter().inputs(1).counted_outputs(),
    ),
    ("o_get_upvalue", L_LOAD),
    ("o_set_upvalue", Shape::new().line().special(1).inputs(1)),
    ("o_create_closure", L_LOAD),
    (
        "o_create_function",
        Shape::new().line().inputs(1).special_4(1).outputs(1),
    ),
    // Indice de classe non étiqueté
    ("o_load_class_closure", L_LOAD),
    (
        "o_load_closure",
        Shape::new().line().counter().special_4(1).outputs(1),
    ),
    ("o_dynamic_cast", Shape::new().line().special(1).inputs(1).outputs(1)),
    ("o_interpolation", L_BUILD),
    ("o_optarg_dispatch", Shape::new().special(1).counter().counted_jumps()),
    ("o_return_from_vm", Shape::new().terminator()),
];

pub(crate) fn legacy_arms() -> SpecialArms {
    use Direction::{In, Out};

    let first = vec![
        ("o_jump_if", scalar("truthy:")),
        ("o_get_integer", scalar("value:")),
        ("o_get_boolean", scalar("value:")),
        ("o_set_global", register(In, Scope::Global)),
        ("o_get_global", register(Out, Scope::Global)),
        ("o_function_call", register(In, Scope::Local)),
        (
            "o_match_dispatch",
            // Le troisième mot est réservé
            vec![
                DecodeStep::RegisterRef(In, Scope::Local),
                DecodeStep::Scalar("class:"),
                DecodeStep::OpaqueSkip(1),
            ],
        ),
        ("o_foreign_call", scalar("func:")),
        ("o_native_call", scalar("func:")),
        ("o_build_enum", scalar("variant:")),
        ("o_dynamic_cast", scalar("class:")),
        ("o_except_catch", scalar("class:")),
        ("o_new_instance_basic", scalar("class:")),
        ("o_new_instance_speculative", scalar("class:")),
        ("o_new_instance_tagged", scalar("class:")),
        ("o_get_readonly", scalar("literal:")),
        ("o_get_property", scalar("index:")),
        ("o_set_property", scalar("index:")),
        (
            "o_except_ignore",
            vec![DecodeStep::Scalar("class:"), DecodeStep::Scalar("pad:")],
        ),
        ("o_optarg_dispatch", scalar("start:")),
        ("o_set_upvalue", register(In, Scope::Upvalue)),
        ("o_get_upvalue", register(Out, Scope::Upvalue)),
        ("o_create_closure", scalar("size:")),
    ];

    let fourth = vec![
        ("o_create_function", scalar("literal:")),
        (
            "o_load_closure",
            vec![DecodeStep::RepeatedScalar {
                label: "zap:",
                count: RepeatCount::Field(COUNT_LABEL),
            }],
        ),
    ];

    let call_args = || {
        vec![DecodeStep::RepeatedRegisterRef {
            direction: In,
            scope: Scope::Local,
            count: RepeatCount::Field(COUNT_LABEL),
        }]
    };
    let sixth = vec![
        ("o_foreign_call", call_args()),
        ("o_native_call", call_args()),
        ("o_function_call", call_args()),
    ];

    SpecialArms {
        first,
        fourth,
        sixth,
    }
}
