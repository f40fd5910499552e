//! Parallel Sorting Benchmark
//!
//! Times both parallel strategies against `sort_unstable` on random `u64`
//! data for a list of thread counts, verifying every result.
//!
//! Unset arguments fall back to `PARALLEL_SORT_STRATEGY` and
//! `PARALLEL_SORT_THREADS`. Set `RUST_LOG=debug` to see how each sort was
//! split up.

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use parallel_sorting::config::{STRATEGY_ENV, THREADS_ENV};
use parallel_sorting::thread_count::hardware_concurrency;
use parallel_sorting::{sort_with_config, SortConfig, Strategy};

/// Default array size for benchmarking
const DEFAULT_ARRAY_SIZE: usize = 1 << 20;

/// Parallel comparison sort benchmark
#[derive(Parser, Debug)]
#[command(name = "parallel-sorting", version, about)]
struct Args {
    /// Number of elements to sort
    #[arg(long, default_value_t = DEFAULT_ARRAY_SIZE)]
    size: usize,

    /// Thread counts to run (e.g. 1,8,100). Defaults to 1, the hardware count and 100
    #[arg(long, env = THREADS_ENV, value_delimiter = ',')]
    threads: Option<Vec<u32>>,

    /// Strategy to run (introsort or sample). Defaults to both
    #[arg(long, env = STRATEGY_ENV)]
    strategy: Option<Strategy>,

    /// Seed for the input data
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let strategies: Vec<Strategy> = match args.strategy {
        Some(strategy) => vec![strategy],
        None => Strategy::ALL.to_vec(),
    };
    let thread_counts: Vec<u32> = args
        .threads
        .unwrap_or_else(|| vec![1, hardware_concurrency(), 100]);

    println!("Parallel Sorting Benchmark");
    println!("==========================\n");
    println!(
        "Array size: {} elements ({} MB), seed {}, hardware threads {}",
        args.size,
        args.size * 8 / 1_000_000,
        args.seed,
        hardware_concurrency()
    );

    println!("\nGenerating random data...");
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let data: Vec<u64> = (0..args.size).map(|_| rng.gen()).collect();

    let mut reference = data.clone();
    let std_start = Instant::now();
    reference.sort_unstable();
    let std_ms = std_start.elapsed().as_secs_f64() * 1000.0;
    println!("std sort_unstable: {:.3} ms\n", std_ms);

    println!(
        "{:>10} | {:>8} | {:>12} | {:>10} | {:>8}",
        "Strategy", "Threads", "Time (ms)", "vs std", "Result"
    );
    println!("{:-<10}-+-{:-<8}-+-{:-<12}-+-{:-<10}-+-{:-<8}", "", "", "", "", "");

    let mut failures = 0;
    for &strategy in &strategies {
        for &threads in &thread_counts {
            let config = SortConfig::new().with_strategy(strategy).with_threads(threads);
            let mut sorted = data.clone();
            let start = Instant::now();
            sort_with_config(&mut sorted, |a, b| a < b, &config);
            let ms = start.elapsed().as_secs_f64() * 1000.0;

            let result = if sorted == reference {
                "OK"
            } else {
                failures += 1;
                "FAILED"
            };
            println!(
                "{:>10} | {:>8} | {:>12.3} | {:>9.2}x | {:>8}",
                strategy.name(),
                threads,
                ms,
                std_ms / ms,
                result
            );
        }
    }

    println!("\nNote: vs std > 1.0x means the parallel sort is faster");

    if failures > 0 {
        eprintln!("{} run(s) did not match the reference sort", failures);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
