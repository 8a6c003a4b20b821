//! Steady-state dispatch-loop cost: the per-instruction overhead of
//! fetch-decode-execute once a worker is past setup, mirroring the
//! `mu_hot_path` benchmark group shape in the teacher's benches.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pretvm::config::VmConfig;
use pretvm::instruction::Instruction;
use pretvm::platform::StdPlatform;
use pretvm::reaction::ReactionTable;
use pretvm::schedule::Schedule;
use pretvm::vm::VirtualMachine;

fn arithmetic_loop_schedule(iterations: i64) -> Schedule {
    Schedule::new(vec![
        Instruction::Addi { dst: 1, src: 0, imm: 0 },
        Instruction::Addi { dst: 2, src: 0, imm: iterations },
        Instruction::Add { dst: 1, src1: 1, src2: 1 },
        Instruction::Addi { dst: 1, src: 1, imm: 1 },
        Instruction::Blt { op1: Some(1), op2: Some(2), target: 2 },
        Instruction::Stp,
    ])
}

fn bench_arithmetic_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_arithmetic");

    for iterations in [10i64, 100, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("addi_add_blt_loop", iterations),
            &iterations,
            |b, &iterations| {
                b.iter(|| {
                    let vm = VirtualMachine::new(
                        Arc::new(StdPlatform::new()),
                        VmConfig::default(),
                        8,
                        ReactionTable::new(),
                        vec![arithmetic_loop_schedule(iterations)],
                    )
                    .expect("valid schedule");
                    black_box(vm.run_worker_inline(0).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_exe_dispatch(c: &mut Criterion) {
    let mut reactions = ReactionTable::new();
    let id = reactions.register(|arg| {
        black_box(arg);
    });

    let schedule = Schedule::new(vec![
        Instruction::Addi { dst: 1, src: 0, imm: 0 },
        Instruction::Addi { dst: 2, src: 0, imm: 1_000 },
        Instruction::Exe { reaction: id, args: 1 },
        Instruction::Addi { dst: 1, src: 1, imm: 1 },
        Instruction::Blt { op1: Some(1), op2: Some(2), target: 2 },
        Instruction::Stp,
    ]);
    let vm = VirtualMachine::new(
        Arc::new(StdPlatform::new()),
        VmConfig::default(),
        8,
        reactions,
        vec![schedule],
    )
    .expect("valid schedule");

    c.bench_function("dispatch_exe_1000_reactions", |b| {
        b.iter(|| black_box(vm.run_worker_inline(0)));
    });
}

criterion_group!(benches, bench_arithmetic_dispatch, bench_exe_dispatch);
criterion_main!(benches);
