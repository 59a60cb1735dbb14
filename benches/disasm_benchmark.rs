use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dis_rust::{
    cursor::InstructionCursor,
    disasm::{CodeFunction, Disassembler},
    opcode::{OpcodeTable, SchemaVersion},
};

/// Construit une fonction factice : chargements, additions, appels
fn sample_code(table: &OpcodeTable, rounds: usize) -> Vec<u16> {
    let op = |name: &str| table.lookup(name).map(|o| o.0).unwrap_or(0);
    let mut code = Vec::new();
    for i in 0..rounds as u16 {
        code.extend_from_slice(&[op("o_load_integer"), i, 0]);
        code.extend_from_slice(&[op("o_int_add"), 0, 1, 2]);
        code.extend_from_slice(&[op("o_call_native"), 3, 3, 0, 1, 2, 4]);
        code.extend_from_slice(&[op("o_jump_if"), 1, 4, 0xFFF0]);
    }
    code.push(op("o_return_unit"));
    code
}

fn benchmark_cursor(c: &mut Criterion) {
    let table = OpcodeTable::new(SchemaVersion::Current).unwrap();
    let code = sample_code(&table, 1000);

    c.bench_function("cursor_walk_1000", |b| {
        b.iter(|| InstructionCursor::over(&table, black_box(&code)).count())
    });
}

fn benchmark_disassembly(c: &mut Criterion) {
    let table = OpcodeTable::new(SchemaVersion::Current).unwrap();
    let disassembler = Disassembler::new(&table);
    let code = sample_code(&table, 1000);

    c.bench_function("disassemble_1000", |b| {
        b.iter(|| disassembler.disassemble(black_box(code.as_slice())).unwrap())
    });

    let functions: Vec<CodeFunction> = (0..64)
        .map(|i| CodeFunction::native(format!("f{i}"), sample_code(&table, 100)))
        .collect();

    c.bench_function("disassemble_all_64", |b| {
        b.iter(|| disassembler.disassemble_all(black_box(&functions)))
    });
}

criterion_group!(benches, benchmark_cursor, benchmark_disassembly);
criterion_main!(benches);
