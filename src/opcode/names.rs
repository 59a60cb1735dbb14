//! Tables des mnémoniques, indexées par identifiant d'opcode
//!
//! Ces tables doivent rester alignées sur l'énumération des opcodes de la VM
//! qui a produit le code. Si la VM renumérote ses opcodes sans que ces tables
//! et les formes de `shapes` soient mises à jour en même temps, la sortie est
//! silencieusement mal étiquetée. `OpcodeTable::new` vérifie l'alignement.

/// Mnémoniques du jeu d'instructions à cinq sections
pub const CURRENT_MNEMONICS: [&str; 60] = [
    "o_assign",
    "o_assign_noref",
    "o_int_add",
    "o_int_minus",
    "o_int_modulo",
    "o_int_multiply",
    "o_int_divide",
    "o_int_left_shift",
    "o_int_right_shift",
    "o_int_bitwise_and",
    "o_int_bitwise_or",
    "o_int_bitwise_xor",
    "o_number_add",
    "o_number_minus",
    "o_number_multiply",
    "o_number_divide",
    "o_compare_eq",
    "o_compare_not_eq",
    "o_compare_greater",
    "o_compare_greater_eq",
    "o_unary_not",
    "o_unary_minus",
    "o_unary_bitwise_not",
    "o_jump",
    "o_jump_if",
    "o_jump_if_not_class",
    "o_for_integer",
    "o_for_setup",
    "o_call_foreign",
    "o_call_native",
    "o_call_register",
    "o_return_value",
    "o_return_unit",
    "o_build_list",
    "o_build_tuple",
    "o_build_hash",
    "o_build_variant",
    "o_subscript_get",
    "o_subscript_set",
    "o_global_get",
    "o_global_set",
    "o_load_readonly",
    "o_load_integer",
    "o_load_boolean",
    "o_load_byte",
    "o_load_empty_variant",
    "o_instance_new",
    "o_property_get",
    "o_property_set",
    "o_catch_push",
    "o_catch_pop",
    "o_exception_catch",
    "o_exception_store",
    "o_exception_raise",
    "o_closure_get",
    "o_closure_set",
    "o_closure_new",
    "o_closure_function",
    "o_interpolation",
    "o_vm_exit",
];

/// Mnémoniques du jeu d'instructions historique (marqueur de ligne en tête)
pub const LEGACY_MNEMONICS: [&str; 66] = [
    "o_fast_assign",
    "o_assign",
    "o_integer_add",
    "o_integer_minus",
    "o_modulo",
    "o_integer_mul",
    "o_integer_div",
    "o_left_shift",
    "o_right_shift",
    "o_bitwise_and",
    "o_bitwise_or",
    "o_bitwise_xor",
    "o_double_add",
    "o_double_minus",
    "o_double_mul",
    "o_double_div",
    "o_is_equal",
    "o_not_eq",
    "o_less",
    "o_less_eq",
    "o_greater",
    "o_greater_eq",
    "o_unary_not",
    "o_unary_minus",
    "o_jump",
    "o_jump_if",
    "o_integer_for",
    "o_for_setup",
    "o_foreign_call",
    "o_native_call",
    "o_function_call",
    "o_return_val",
    "o_return_noval",
    "o_build_list",
    "o_build_tuple",
    "o_build_hash",
    "o_build_enum",
    "o_get_item",
    "o_set_item",
    "o_get_global",
    "o_set_global",
    "o_get_readonly",
    "o_get_integer",
    "o_get_boolean",
    "o_new_instance_basic",
    "o_new_instance_speculative",
    "o_new_instance_tagged",
    "o_get_property",
    "o_set_property",
    "o_push_try",
    "o_pop_try",
    "o_except_ignore",
    "o_except_catch",
    "o_raise",
    "o_match_dispatch",
    "o_variant_decompose",
    "o_get_upvalue",
    "o_set_upvalue",
    "o_create_closure",
    "o_create_function",
    "o_load_class_closure",
    "o_load_closure",
    "o_dynamic_cast",
    "o_interpolation",
    "o_optarg_dispatch",
    "o_return_from_vm",
];
