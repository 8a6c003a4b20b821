//! Hand-assembles a two-worker schedule (a counter-incrementing worker and
//! a rendezvous waiter) and runs it to completion against `StdPlatform`,
//! with `tracing` output enabled — the minimal illustration of wiring a
//! `VirtualMachine` end to end, playing the role the satellite-attitude
//! demo plays for the original scheduler (spec.md §1: illustrative, not
//! part of the core).

use std::sync::Arc;

use pretvm::config::VmConfig;
use pretvm::instruction::Instruction;
use pretvm::platform::StdPlatform;
use pretvm::reaction::ReactionTable;
use pretvm::schedule::Schedule;
use pretvm::vm::VirtualMachine;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut reactions = ReactionTable::new();
    let announce = reactions.register(|arg| println!("reaction fired with arg={arg}"));

    let counter_worker = Schedule::new(vec![
        Instruction::Addi { dst: 1, src: 1, imm: 1 },
        Instruction::Exe { reaction: announce, args: 1 },
        Instruction::Stp,
    ]);
    let waiter_worker = Schedule::new(vec![
        Instruction::Wu { var: 1, bound: 1 },
        Instruction::Stp,
    ]);

    let vm = VirtualMachine::new(
        Arc::new(StdPlatform::new()),
        VmConfig::default(),
        8,
        reactions,
        vec![counter_worker, waiter_worker],
    )
    .expect("schedule references only in-range registers and reactions");

    vm.run().expect("no worker hit an unknown opcode or out-of-range pc");
    println!("final counter value: {}", vm.registers().read(1));
}
