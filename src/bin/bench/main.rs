// Bandit Arena Benchmark Runner
// Averaged strategy comparison over preset scenarios, seedable PRNG, JSON report
//
// Usage:
//   cargo run --release --bin bench                       # All scenarios (10 repeats, 1000 pulls)
//   cargo run --release --bin bench -- --repeats 50       # More repeats per scenario
//   cargo run --release --bin bench -- --pulls 5000       # Longer runs
//   cargo run --release --bin bench -- EPSILON            # Filter by name
//   cargo run --release --bin bench -- --seed 42          # Custom base seed
//   cargo run --release --bin bench -- --timeout-secs 30  # Per-repeat context deadline
//   RUST_LOG=bandit_arena=debug cargo run --bin bench     # Per-run tracing

mod report;
mod scenarios;

use bandit_arena::{chart_tables, MetricKind, OrchestratorConfig, SimulationOrchestrator};
use report::*;
use scenarios::*;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    repeats: usize,
    pulls: u64,
    seed: u64,
    timeout_secs: u64,
    out_dir: PathBuf,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        repeats: 10,
        pulls: 1000,
        seed: 0,
        timeout_secs: 300,
        out_dir: PathBuf::from("benchmark-results"),
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--repeats" => {
                i += 1;
                if i < args.len() {
                    cli.repeats = args[i].parse().unwrap_or(10);
                }
            }
            "--pulls" => {
                i += 1;
                if i < args.len() {
                    cli.pulls = args[i].parse().unwrap_or(1000);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--timeout-secs" => {
                i += 1;
                if i < args.len() {
                    cli.timeout_secs = args[i].parse().unwrap_or(300);
                }
            }
            "--out" => {
                i += 1;
                if i < args.len() {
                    cli.out_dir = PathBuf::from(&args[i]);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    let orchestrator = SimulationOrchestrator::new(OrchestratorConfig {
        base_seed: cli.seed,
        context_timeout: Duration::from_secs(cli.timeout_secs),
    });

    println!("\n  Bandit Arena Benchmark Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Repeats: {} | Pulls/run: {} | Base seed: {}",
        cli.repeats, cli.pulls, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());

    let suite_start = Instant::now();
    let mut reports = Vec::new();
    let mut failed = 0;

    for scenario in &to_run {
        info!(scenario = scenario.name, candidates = scenario.candidates.len(), "starting scenario");
        let start = Instant::now();
        let candidates = match orchestrator.run(&scenario.candidates, cli.repeats, cli.pulls) {
            Ok(results) => results,
            Err(e) => {
                error!(scenario = scenario.name, "scenario failed: {e}");
                failed += 1;
                continue;
            }
        };

        println!("  {}", scenario.label);
        println!("  {:<36} {:>12} {:>12} {:>10} {:>10}",
            "Candidate", "Reward", "Regret", "±CI", "Best%");
        println!("  {}", "-".repeat(84));
        for c in &candidates {
            let regret_ci = (c.final_regret.ci_upper - c.final_regret.ci_lower) / 2.0;
            println!("  {:<36} {:>12.1} {:>12.1} {:>10.1} {:>9.1}%",
                c.label,
                c.final_reward.mean,
                c.final_regret.mean,
                regret_ci,
                c.metrics.final_value(MetricKind::BestArmUsage) * 100.0,
            );
        }

        let charts = chart_tables(&candidates);
        let report = ScenarioReport {
            scenario_name: scenario.name.to_string(),
            label: scenario.label.to_string(),
            repeats: cli.repeats,
            pulls_per_run: cli.pulls,
            elapsed_ms: start.elapsed().as_millis(),
            candidates,
            charts,
        };
        if let Some(leader) = report.leader() {
            println!("  Lowest regret: {}\n", leader.label);
        }
        reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();
    let total = to_run.len();

    println!("  {}", "-".repeat(84));
    println!("  Total: {}  Completed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, reports.len(), failed, suite_elapsed.as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: "0.1.0",
        prng: "ChaCha8Rng",
        base_seed: cli.seed,
        summary: Summary {
            total,
            completed: reports.len(),
            failed,
        },
        scenarios: reports,
    };

    if let Err(e) = write_report(&cli.out_dir, &timestamp, &report) {
        eprintln!("  Failed to write report: {}", e);
        std::process::exit(1);
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn write_report(dir: &std::path::Path, timestamp: &str, report: &BenchReport) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(&path, json)?;
    println!("  Results saved to: {}\n", path.display());
    Ok(())
}
