//! Decision-latency benchmark.
//!
//! Per-decision wall time over a URL corpus, reported the way the
//! mobile performance budget is tracked: average plus p50/p95/p99.

use std::cmp::Ordering;
use std::fs;
use std::time::Instant;

use serde::Serialize;

use pal_compiler::compile_list;
use pal_core::Engine;

const WARMUP_PASSES: usize = 10;

#[derive(Serialize)]
struct BenchReport {
    urls: usize,
    iterations: usize,
    decisions: usize,
    blocked: u64,
    total_ms: f64,
    avg_us: f64,
    p50_us: f64,
    p95_us: f64,
    p99_us: f64,
    ops_per_sec: u64,
}

pub fn run(input: &str, urls_path: &str, iterations: usize, json: bool) -> Result<(), String> {
    if iterations == 0 {
        return Err("iterations must be at least 1".to_string());
    }

    let list =
        fs::read_to_string(input).map_err(|e| format!("Failed to read '{input}': {e}"))?;
    let url_text = fs::read_to_string(urls_path)
        .map_err(|e| format!("Failed to read '{urls_path}': {e}"))?;
    let urls: Vec<&str> = url_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('!'))
        .collect();
    if urls.is_empty() {
        return Err(format!("'{urls_path}' contains no URLs"));
    }

    let compiled = compile_list(&list).map_err(|e| format!("'{input}': {e}"))?;
    let rule_count = compiled.rules.rule_count();
    let engine = Engine::new();
    engine.install(compiled.rules);

    for _ in 0..WARMUP_PASSES {
        for url in &urls {
            let _ = engine.evaluate(url);
        }
    }
    // Counters should reflect the measured passes only.
    engine.reset_stats();

    let mut latencies = Vec::with_capacity(urls.len() * iterations);
    for _ in 0..iterations {
        for url in &urls {
            let start = Instant::now();
            let _ = engine.evaluate(url);
            latencies.push(start.elapsed().as_secs_f64() * 1_000_000.0);
        }
    }

    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let total_us: f64 = latencies.iter().sum();
    let total_ms = total_us / 1000.0;
    let decisions = latencies.len();
    let stats = engine.stats();

    let report = BenchReport {
        urls: urls.len(),
        iterations,
        decisions,
        blocked: stats.blocked,
        total_ms,
        avg_us: if decisions == 0 {
            0.0
        } else {
            total_us / decisions as f64
        },
        p50_us: percentile(&latencies, 0.50),
        p95_us: percentile(&latencies, 0.95),
        p99_us: percentile(&latencies, 0.99),
        ops_per_sec: if total_ms > 0.0 {
            (decisions as f64 / (total_ms / 1000.0)) as u64
        } else {
            0
        },
    };

    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "Benchmark: {} rules, {} URLs x {} iterations",
        rule_count, report.urls, report.iterations
    );
    println!("  Decisions:   {} ({} blocked)", report.decisions, report.blocked);
    println!("  Total time:  {:.2}ms", report.total_ms);
    println!("  Avg latency: {:.2}μs", report.avg_us);
    println!("  P50 latency: {:.2}μs", report.p50_us);
    println!("  P95 latency: {:.2}μs", report.p95_us);
    println!("  P99 latency: {:.2}μs", report.p99_us);
    println!("  Throughput:  {} ops/sec", report.ops_per_sec);
    Ok(())
}

fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let idx = ((values.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}
