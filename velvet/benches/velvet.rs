use criterion::{criterion_group, criterion_main, Criterion};
use velvet_lang::{
    common::{file_provider::MemoryFileProvider, Code},
    ir::IrDocument,
    parser::{lex, parse},
    CompileConfig,
};

fn run_code(code: &str) -> IrDocument {
    let mut config = CompileConfig::new(Box::new(MemoryFileProvider::default()));
    let main_file = config.compile_context.add_input_file(Code {
        path: None,
        source: code.into(),
    });
    config.compile(main_file).unwrap()
}

const BENCHES: [(&str, &str); 2] = [
    ("basic", include_str!("benchmarks/basic.vel")),
    ("macros", include_str!("benchmarks/macros.vel")),
];

fn run_lexer_benchmarks(c: &mut Criterion) {
    for (name, bench) in BENCHES {
        c.bench_function(&format!("lex {name}"), |b| b.iter(|| lex(bench)));
    }
}

fn run_parser_benchmarks(c: &mut Criterion) {
    for (name, bench) in BENCHES {
        c.bench_function(&format!("parse {name}"), |b| b.iter(|| parse(bench)));
    }
}

fn run_compiler_benchmarks(c: &mut Criterion) {
    for (name, bench) in BENCHES {
        c.bench_function(&format!("ir {name}"), |b| b.iter(|| run_code(bench)));
    }
}

criterion_group!(lexer_benchmarks, run_lexer_benchmarks);
criterion_group!(parser_benchmarks, run_parser_benchmarks);
criterion_group!(compiler_benchmarks, run_compiler_benchmarks);
criterion_main!(lexer_benchmarks, parser_benchmarks, compiler_benchmarks);
