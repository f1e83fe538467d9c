use std::time::{Duration, Instant};

use buffer_strategy::{ReplacementPolicy, StrategyControl};

const NUM_BUFFERS: usize = 1000;
const NUM_ALLOCS: usize = 10_000;

struct BenchmarkResult {
    drain_and_churn: Duration,
}

fn main() {
    println!("Setting up StrategyControl for each replacement policy.");

    let clock_results = run_benchmark(ReplacementPolicy::Clock);
    let lru_results = run_benchmark(ReplacementPolicy::Lru);
    let mru_results = run_benchmark(ReplacementPolicy::Mru);
    let two_q_results = run_benchmark(ReplacementPolicy::TwoQ);

    println!("\n--- Benchmark Results ({} buffers, {} allocs) ---", NUM_BUFFERS, NUM_ALLOCS);
    println!("| Policy | Drain + Churn Time |");
    println!("|--------|--------------------|");
    println!("| clock  | {:<18?} |", clock_results.drain_and_churn);
    println!("| lru    | {:<18?} |", lru_results.drain_and_churn);
    println!("| mru    | {:<18?} |", mru_results.drain_and_churn);
    println!("| 2q     | {:<18?} |", two_q_results.drain_and_churn);
}

/// Drains the pool once, then repeatedly unpins and re-requests victims so
/// every allocation past the first `NUM_BUFFERS` has to walk a real queue
/// instead of just popping the free list.
fn run_benchmark(policy: ReplacementPolicy) -> BenchmarkResult {
    let control = StrategyControl::new(NUM_BUFFERS, policy);

    let start = Instant::now();
    for _ in 0..NUM_BUFFERS {
        drop(control.get_victim(None).unwrap());
    }

    for i in 0..NUM_ALLOCS {
        let frame_id = i % NUM_BUFFERS;
        control.on_unpinned(frame_id);
        drop(control.get_victim(None).unwrap());
    }
    let elapsed = start.elapsed();

    BenchmarkResult { drain_and_churn: elapsed }
}
