//! Performance benchmarks for the exploded graph walker
//!
//! - Branch ladder: path count doubles per diamond (state dedup, persistent states)
//! - Counting loop: unrolling bound vs visit budget
//! - Batch: many independent methods through the analyzer (rayon)

use codegraph_symexec::config::{Preset, SymexConfig};
use codegraph_symexec::features::checks::CheckRegistry;
use codegraph_symexec::features::exploded_graph::ExplodedGraphWalker;
use codegraph_symexec::shared::models::{
    BlockId, CfgBuilder, CfgEdgeKind, Instruction, MethodBody, MethodRef, Nullability, SymbolId, SymbolTable,
    Terminator, Visibility,
};
use codegraph_symexec::SymbolicExecutionAnalyzer;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// Fixtures
// ============================================================================

/// `depth` sequential `if (p_k == null) { p_k.M(); }` over distinct parameters
fn branch_ladder(depth: usize) -> MethodBody {
    let mut symbols = SymbolTable::new();
    let parameters: Vec<SymbolId> = (0..depth)
        .map(|k| symbols.parameter(&format!("p{k}"), Nullability::Unknown))
        .collect();

    let mut b = CfgBuilder::new();
    let mut previous: Option<BlockId> = None;
    for p in &parameters {
        let test = b.block(
            vec![Instruction::load(*p), Instruction::null(), Instruction::ne()],
            Terminator::Conditional,
        );
        if let Some(prev) = previous {
            b.jump(prev, test);
        }
        let then = b.block(
            vec![
                Instruction::load(*p),
                Instruction::call(MethodRef::new("M"), 0),
                Instruction::pop(),
            ],
            Terminator::Jump,
        );
        let join = b.block(vec![], Terminator::Jump);
        b.branch(test, then, join).jump(then, join);
        previous = Some(join);
    }
    let exit = b.block(vec![], Terminator::Exit);
    if let Some(prev) = previous {
        b.jump(prev, exit);
    }

    MethodBody::new(format!("Ladder{depth}"), b.build().unwrap(), symbols)
        .with_visibility(Visibility::Public)
        .with_parameters(parameters)
}

/// `for (i = 0; i != n; i++) { }`
fn counting_loop() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let n = symbols.parameter("n", Nullability::Unknown);
    let i = symbols.local("i");

    let mut b = CfgBuilder::new();
    let init = b.block(vec![Instruction::number(0.0), Instruction::assign(i)], Terminator::Jump);
    let head = b.block(
        vec![Instruction::load(i), Instruction::load(n), Instruction::ne()],
        Terminator::Conditional,
    );
    let body = b.block(
        vec![
            Instruction::load(i),
            Instruction::number(1.0),
            Instruction::binary("+"),
            Instruction::assign(i),
        ],
        Terminator::Jump,
    );
    let exit = b.block(vec![], Terminator::Return { has_value: false });
    b.jump(init, head)
        .branch(head, body, exit)
        .edge(body, head, CfgEdgeKind::LoopBack);

    MethodBody::new("Loop", b.build().unwrap(), symbols).with_parameters(vec![n])
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_branch_ladder(c: &mut Criterion) {
    let mut group = c.benchmark_group("branch_ladder");
    let config = SymexConfig::from_preset(Preset::Thorough);
    let registry = CheckRegistry::from_toggles(&config.checks);

    for depth in [4usize, 8, 12] {
        let method = branch_ladder(depth);
        group.throughput(Throughput::Elements(1 << depth));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &method, |b, method| {
            b.iter(|| {
                let outcome = ExplodedGraphWalker::new(method, config.clone())
                    .with_registry(&registry)
                    .walk();
                black_box(outcome)
            });
        });
    }

    group.finish();
}

fn bench_loop_unrolling(c: &mut Criterion) {
    let mut group = c.benchmark_group("loop_unrolling");
    let method = counting_loop();

    for visits in [1u32, 8, 64] {
        let config = SymexConfig::default().max_block_visits_per_path(visits);
        group.bench_with_input(BenchmarkId::from_parameter(visits), &config, |b, config| {
            b.iter(|| black_box(ExplodedGraphWalker::new(&method, config.clone()).walk()));
        });
    }

    group.finish();
}

fn bench_batch_analysis(c: &mut Criterion) {
    let analyzer = SymbolicExecutionAnalyzer::new(SymexConfig::default()).unwrap();
    let methods: Vec<MethodBody> = (0..64).map(|k| branch_ladder(2 + k % 6)).collect();

    let mut group = c.benchmark_group("batch_analysis");
    group.throughput(Throughput::Elements(methods.len() as u64));
    group.bench_function("64_methods", |b| {
        b.iter(|| black_box(analyzer.analyze_all(&methods)));
    });
    group.finish();
}

criterion_group!(benches, bench_branch_ladder, bench_loop_unrolling, bench_batch_analysis);
criterion_main!(benches);
