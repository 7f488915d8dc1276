//! ChemLab Simulator CLI
//!
//! Run deterministic lab scenarios against the simulation core.

use chemlab_sim::scenarios::ScenarioId;
use chemlab_sim::{ScenarioResult, ScenarioRunner, SimConfig, MAX_FRAME_RATE_HZ};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// ChemLab deterministic scenario CLI
#[derive(Parser, Debug)]
#[command(name = "chemlab-sim")]
#[command(about = "Run deterministic lab scenarios for ChemLab", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Scenario to run (standard_titration, over_titration, interrupted_titration,
    /// missing_apparatus, reset_after_cycles, aspirin_synthesis, equilibrium, random_clicks, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Titration frame rate in Hz (1 to 1000)
    #[arg(short, long, value_parser = parse_frame_rate)]
    frame_rate: Option<f64>,

    /// JSON config file (seed, frame_rate_hz, lab tunables)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export lab snapshots of a single scenario to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn parse_frame_rate(s: &str) -> Result<f64, String> {
    let hz: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (1.0..=MAX_FRAME_RATE_HZ).contains(&hz) {
        Ok(hz)
    } else {
        Err(format!("frame rate must be within [1, {}]", MAX_FRAME_RATE_HZ))
    }
}

fn result_json(r: &ScenarioResult) -> serde_json::Value {
    serde_json::json!({
        "scenario": r.scenario.name(),
        "seed": r.seed,
        "passed": r.passed,
        "events": r.total_events,
        "time_secs": r.final_time_secs,
        "failure_reason": r.failure_reason,
        "metrics": r.metrics,
    })
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }),
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(hz) = args.frame_rate {
        config.frame_rate_hz = hz;
    }

    if !args.json {
        info!("ChemLab Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            let names: Vec<_> = ScenarioId::all().iter().map(|s| s.name()).collect();
            eprintln!("Available scenarios: {}, all", names.join(", "));
            std::process::exit(1);
        })]
    };

    // Determine base seed
    let base_seed = if config.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        config.seed
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }

        config.seed = base_seed;
        let (result, export) = ScenarioRunner::from_config(&config).run_with_export(scenarios[0]);
        match export.map(|e| e.write_to_file(export_path).map(|_| e.frames.len())) {
            Some(Ok(frames)) => info!("Exported {} frames to {}", frames, export_path),
            Some(Err(e)) => error!("Failed to write export: {:?}", e),
            None => error!("No frames recorded"),
        }

        if result.passed {
            info!("✓ {} (seed={}) PASSED", result.scenario.name(), result.seed);
        } else {
            error!(
                "✗ {} FAILED: {}",
                result.scenario.name(),
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
            std::process::exit(1);
        }
        return;
    }

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        config.seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::from_config(&config);

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!(
                        "✓ {} (seed={}) PASSED | events={} volume={:.1} mL",
                        scenario.name(),
                        result.seed,
                        result.total_events,
                        result.metrics.final_volume_ml
                    );
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }
            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(result_json).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to encode summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
