//! Throughput harness for the Z80 core.
//!
//! Runs small looping programs on several threads at once and reports
//! retired instructions and T-cycles per second.
//!
//! ## Usage
//!
//! ```sh
//! RUST_LOG=info cargo run --release -p z80-core --example throughput_harness
//! ```
//!
//! ## Metrics
//!
//! - Instructions per second
//! - T-cycles per second
//! - Real-time multiple against a 3.5 MHz part

#![allow(clippy::pedantic)]

use log::{debug, info, warn};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use z80_core::{FlatBus, Processor};

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// T-cycles run between clock checks.
const SLICE_CYCLES: u64 = 70_000;
/// Reference clock used for the real-time multiple.
const REFERENCE_CLOCK_HZ: f64 = 3_500_000.0;
const NUM_THREADS: usize = 4;

/// Straight-line `NOP`s closed by `JP 0x0000`.
const NOP_LOOP: &[u8] = &[0x00, 0x00, 0x00, 0x00, 0xC3, 0x00, 0x00];

/// `ADD A,B / SUB C / AND D / XOR E / OR H / CP L / JP 0x0000`.
const ALU_LOOP: &[u8] = &[0x80, 0x91, 0xA2, 0xAB, 0xB4, 0xBD, 0xC3, 0x00, 0x00];

/// `LD HL,0x4000` then `LD (HL),A / LD A,(HL) / PUSH BC / POP DE / JP 0x0003`.
const MEMORY_LOOP: &[u8] = &[0x21, 0x00, 0x40, 0x77, 0x7E, 0xC5, 0xD1, 0xC3, 0x03, 0x00];

/// `LD B,0x10 / ADD A,B / DJNZ -3 / JP 0x0000`.
const MIXED_LOOP: &[u8] = &[0x06, 0x10, 0x80, 0x10, 0xFD, 0xC3, 0x00, 0x00];

#[derive(Debug, Clone, Copy)]
struct BenchmarkResult {
    name: &'static str,
    instructions_per_second: f64,
    cycles_per_second: f64,
    realtime_multiple: f64,
}

fn run_worker(program: &'static [u8], duration: Duration) -> (u64, u64) {
    let mut bus = FlatBus::new();
    bus.load(0x0000, program);
    let mut cpu = Processor::new(bus);
    cpu.registers_mut().set_sp(0x8000);

    let mut instructions = 0u64;
    let mut cycles = 0u64;
    let start = Instant::now();
    while start.elapsed() < duration {
        match cpu.run_for(SLICE_CYCLES) {
            Ok(outcome) => {
                instructions += outcome.steps;
                cycles += outcome.cycles;
            }
            Err(fault) => {
                warn!("worker stopped: {fault}");
                break;
            }
        }
    }
    (instructions, cycles)
}

fn benchmark(name: &'static str, program: &'static [u8], duration: Duration) -> BenchmarkResult {
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let tx = tx.clone();
            thread::spawn(move || {
                tx.send(run_worker(program, duration)).ok();
            })
        })
        .collect();

    for h in handles {
        h.join().ok();
    }
    drop(tx);

    let (total_instructions, total_cycles) = rx
        .into_iter()
        .fold((0u64, 0u64), |(i, c), (wi, wc)| (i + wi, c + wc));
    debug!("{name}: {total_instructions} steps, {total_cycles} T-cycles");

    let elapsed_secs = duration.as_secs_f64();
    let instructions_per_second = total_instructions as f64 / elapsed_secs;
    let cycles_per_second = total_cycles as f64 / elapsed_secs;

    BenchmarkResult {
        name,
        instructions_per_second,
        cycles_per_second,
        realtime_multiple: cycles_per_second / REFERENCE_CLOCK_HZ,
    }
}

fn format_number(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.2}", n)
    }
}

fn print_results(results: &[BenchmarkResult]) {
    println!("\nZ80 core throughput ({NUM_THREADS} threads)");
    println!(
        "{:12} | {:>15} | {:>15} | {:>10}",
        "Benchmark", "Instr/sec", "T-cycles/sec", "x 3.5MHz"
    );
    println!("{}", "-".repeat(62));
    for result in results {
        println!(
            "{:12} | {:>15} | {:>15} | {:>10}",
            result.name,
            format_number(result.instructions_per_second),
            format_number(result.cycles_per_second),
            format_number(result.realtime_multiple)
        );
    }
}

fn main() {
    env_logger::init();

    let warmup = Duration::from_millis(500);
    let benchmark_duration = Duration::from_secs(3);

    info!("warming up for {warmup:?}");
    let _ = benchmark("nop_loop", NOP_LOOP, warmup);

    info!("running each benchmark for {benchmark_duration:?}");
    let results = [
        benchmark("nop_loop", NOP_LOOP, benchmark_duration),
        benchmark("alu_loop", ALU_LOOP, benchmark_duration),
        benchmark("memory_loop", MEMORY_LOOP, benchmark_duration),
        benchmark("mixed_loop", MIXED_LOOP, benchmark_duration),
    ];

    print_results(&results);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_loop_runs_without_faulting() {
        for program in [NOP_LOOP, ALU_LOOP, MEMORY_LOOP, MIXED_LOOP] {
            let (instructions, cycles) = run_worker(program, Duration::from_millis(20));
            assert!(instructions > 0);
            assert!(cycles >= instructions * 4);
        }
    }
}
