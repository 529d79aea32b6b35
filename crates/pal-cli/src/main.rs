//! Palisade CLI
//!
//! Host-side tooling for filter lists: compile them exactly the way the
//! mobile engine does, evaluate URLs against the result, and measure
//! decision latency.

use std::fs;
use std::time::Instant;

use clap::{Parser, Subcommand};
use serde::Serialize;

use pal_compiler::{compile_list, parse_filter_list, CompiledList};
use pal_core::{Engine, Rule};

mod bench;

#[derive(Parser)]
#[command(name = "palisade")]
#[command(about = "Palisade filter list compiler and tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a filter list and report what the engine would install
    Compile {
        /// Input filter list file
        input: String,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile a list, then evaluate URLs against it
    Check {
        /// Input filter list file
        input: String,

        /// URLs to evaluate
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Parse-only census of a list; nothing gets installed
    Inspect {
        /// Input filter list file
        input: String,
    },

    /// Measure decision latency against a compiled list
    Bench {
        /// Input filter list file
        input: String,

        /// File with URLs to evaluate, one per line
        #[arg(long)]
        urls: String,

        /// Passes over the URL file
        #[arg(long, default_value_t = 100)]
        iterations: usize,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a filter list and keep it only if it compiles
    Fetch {
        /// Source URL
        url: String,

        /// Output path; defaults to the last path segment of the URL
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile { input, json } => cmd_compile(&input, json),
        Commands::Check { input, urls } => cmd_check(&input, &urls),
        Commands::Inspect { input } => cmd_inspect(&input),
        Commands::Bench {
            input,
            urls,
            iterations,
            json,
        } => bench::run(&input, &urls, iterations, json),
        Commands::Fetch { url, output } => cmd_fetch(&url, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[derive(Serialize)]
struct CompileReport {
    lines: usize,
    comments: usize,
    cosmetic: usize,
    skipped: usize,
    parsed_rules: usize,
    installed_rules: usize,
    deduped: usize,
    domain_rules: usize,
    pattern_rules: usize,
    exception_rules: usize,
    compile_ms: f64,
}

fn read_list(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read '{path}': {e}"))
}

fn compile_file(path: &str) -> Result<(CompiledList, f64), String> {
    let text = read_list(path)?;
    let start = Instant::now();
    let compiled = compile_list(&text).map_err(|e| format!("'{path}': {e}"))?;
    Ok((compiled, start.elapsed().as_secs_f64() * 1000.0))
}

fn cmd_compile(input: &str, json: bool) -> Result<(), String> {
    let (compiled, compile_ms) = compile_file(input)?;
    let summary = &compiled.summary;
    let report = CompileReport {
        lines: summary.lines.total,
        comments: summary.lines.comments,
        cosmetic: summary.lines.cosmetic,
        skipped: summary.lines.skipped,
        parsed_rules: summary.parsed_rules,
        installed_rules: compiled.rules.rule_count(),
        deduped: summary.deduped,
        domain_rules: summary.domain_rules,
        pattern_rules: summary.pattern_rules,
        exception_rules: summary.exception_rules,
        compile_ms,
    };

    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Compiled '{input}'");
    println!(
        "  Lines:      {} ({} comments, {} cosmetic, {} skipped)",
        report.lines, report.comments, report.cosmetic, report.skipped
    );
    println!(
        "  Rules:      {} -> {} (dedupe removed {})",
        report.parsed_rules, report.installed_rules, report.deduped
    );
    println!("  Domains:    {}", report.domain_rules);
    println!("  Patterns:   {}", report.pattern_rules);
    println!("  Exceptions: {}", report.exception_rules);
    println!("  Time:       {compile_ms:.1}ms");
    Ok(())
}

fn cmd_check(input: &str, urls: &[String]) -> Result<(), String> {
    let (compiled, _) = compile_file(input)?;
    let engine = Engine::new();
    engine.install(compiled.rules);

    for url in urls {
        let tag = if engine.evaluate(url).is_block() {
            "BLOCK"
        } else {
            "allow"
        };
        println!("{tag}  {url}");
    }

    let stats = engine.stats();
    println!();
    println!(
        "{} blocked, {} allowed, ~{} bytes saved",
        stats.blocked, stats.allowed, stats.saved_bytes
    );
    Ok(())
}

fn cmd_inspect(input: &str) -> Result<(), String> {
    let text = read_list(input)?;
    let outcome = parse_filter_list(&text);

    let domains = outcome
        .rules
        .iter()
        .filter(|rule| matches!(rule, Rule::Domain { .. }))
        .count();
    let patterns = outcome.rules.len() - domains;
    let exceptions = outcome.rules.iter().filter(|rule| rule.is_exception()).count();

    println!("List: {input}");
    println!("  Lines:    {}", outcome.stats.total);
    println!("  Comments: {}", outcome.stats.comments);
    println!("  Cosmetic: {}", outcome.stats.cosmetic);
    println!("  Skipped:  {}", outcome.stats.skipped);
    println!(
        "  Rules:    {} ({} domain, {} pattern, {} exception)",
        outcome.rules.len(),
        domains,
        patterns,
        exceptions
    );
    Ok(())
}

fn cmd_fetch(url: &str, output: Option<&str>) -> Result<(), String> {
    let response = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .map_err(|e| format!("Fetch failed: {e}"))?;
    let text = response.text().map_err(|e| format!("Fetch failed: {e}"))?;

    // Validate before anything touches disk.
    let compiled =
        compile_list(&text).map_err(|e| format!("Downloaded list does not compile: {e}"))?;

    let path = output
        .map(str::to_owned)
        .unwrap_or_else(|| default_output_name(url));
    fs::write(&path, &text).map_err(|e| format!("Failed to write '{path}': {e}"))?;

    println!(
        "Saved '{path}': {} rules from {} lines",
        compiled.rules.rule_count(),
        compiled.summary.lines.total
    );
    Ok(())
}

fn default_output_name(url: &str) -> String {
    let base = url.split(['?', '#']).next().unwrap_or(url);
    base.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .unwrap_or("filters.txt")
        .to_string()
}
