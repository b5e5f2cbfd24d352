//! hw: CLI binary for the flood evacuation planner.
//!
//! Subcommands:
//! - run
//! - config

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use hw_core::{Config, Strategy, World};
use hw_mcts::{chooser_for_strategy, run_policy_traced, Engine, SearchRng, StepRecord};
use rand_core::SeedableRng;

fn print_help() {
    eprintln!(
        r#"hw - flood evacuation planner CLI

USAGE:
    hw <COMMAND> [OPTIONS]

COMMANDS:
    run                 Generate a world and run the evacuation policy
    config              Print the default configuration as YAML

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version

Run `hw <COMMAND> --help` for command options.
"#
    );
}

fn print_version() {
    println!("hw {}", env!("CARGO_PKG_VERSION"));
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i + 1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("Invalid {flag} value");
            process::exit(1);
        })
}

fn parse_strategy(s: &str) -> Option<Strategy> {
    match s {
        "rollout" => Some(Strategy::Rollout),
        "tree" => Some(Strategy::Tree),
        _ => None,
    }
}

fn strategy_name(s: Strategy) -> &'static str {
    match s {
        Strategy::Rollout => "rollout",
        Strategy::Tree => "tree",
    }
}

fn format_action(r: &StepRecord) -> String {
    if r.action.is_empty() {
        "-".to_string()
    } else {
        r.action.to_string()
    }
}

fn cmd_config() {
    let yaml = Config::default().to_yaml().unwrap_or_else(|e| {
        eprintln!("Failed to serialize config: {e}");
        process::exit(1);
    });
    print!("{yaml}");
}

fn cmd_run(args: &[String]) {
    let mut config_path: Option<String> = None;
    let mut seed: Option<u64> = None;
    let mut steps: Option<u32> = None;
    let mut strategy: Option<Strategy> = None;
    let mut parallel = false;
    let mut out: Option<String> = None;
    let mut log_flush_every: u64 = 100;
    let mut quiet = false;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"hw run

USAGE:
    hw run [--config cfg.yaml] [--seed S] [--steps N] [--strategy rollout|tree] [--parallel] [--out runs/<id>/]

OPTIONS:
    --config PATH          Path to YAML config (default: built-in defaults)
    --seed S               RNG seed (default: run.seed)
    --steps N              Simulated steps (default: run.sim_time)
    --strategy S           rollout|tree (default: search.strategy)
    --parallel             Evaluate candidate rollouts in parallel
    --out DIR              Write run.json and logs/policy_steps.ndjson under DIR
    --log-flush-every N    Flush NDJSON logs every N lines (0 disables) (default: 100)
    --quiet                Only print the final summary
"#
                );
                return;
            }
            "--config" => {
                config_path = Some(args.get(i + 1).cloned().unwrap_or_default());
                i += 2;
            }
            "--seed" => {
                seed = Some(parse_value(args, i, "--seed"));
                i += 2;
            }
            "--steps" => {
                steps = Some(parse_value(args, i, "--steps"));
                i += 2;
            }
            "--strategy" => {
                strategy = Some(
                    args.get(i + 1)
                        .and_then(|s| parse_strategy(s))
                        .unwrap_or_else(|| {
                            eprintln!("Invalid --strategy (expected rollout|tree)");
                            process::exit(1);
                        }),
                );
                i += 2;
            }
            "--parallel" => {
                parallel = true;
                i += 1;
            }
            "--out" => {
                out = Some(args.get(i + 1).cloned().unwrap_or_default());
                i += 2;
            }
            "--log-flush-every" => {
                log_flush_every = parse_value(args, i, "--log-flush-every");
                i += 2;
            }
            "--quiet" => {
                quiet = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown option for `hw run`: {}", other);
                eprintln!("Run `hw run --help` for usage.");
                process::exit(1);
            }
        }
    }

    let (mut cfg, config_bytes) = match &config_path {
        Some(path) => {
            let cfg = Config::load(path).unwrap_or_else(|e| {
                eprintln!("Failed to load config: {e}");
                process::exit(1);
            });
            let bytes = std::fs::read(path).unwrap_or_else(|e| {
                eprintln!("Failed to read config file: {e}");
                process::exit(1);
            });
            (cfg, bytes)
        }
        None => {
            let cfg = Config::default();
            let bytes = cfg.to_yaml().map(String::into_bytes).unwrap_or_default();
            (cfg, bytes)
        }
    };
    if let Some(s) = seed {
        cfg.run.seed = s;
    }
    if let Some(n) = steps {
        cfg.run.sim_time = n;
    }
    if let Some(s) = strategy {
        cfg.search.strategy = s;
    }
    if parallel {
        cfg.search.parallel = true;
    }
    cfg.validate().unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {e}");
        process::exit(1);
    });

    let engine = Engine::from_config(&cfg).unwrap_or_else(|e| {
        eprintln!("Failed to build engine: {e}");
        process::exit(1);
    });
    let mut chooser = chooser_for_strategy(cfg.search.strategy, engine.params());
    let mut rng = SearchRng::seed_from_u64(cfg.run.seed);
    let world = World::generate(&cfg.world, &mut rng);
    let strategy = strategy_name(cfg.search.strategy);

    // Run directory: runs/<id>/run.json + runs/<id>/logs/.
    let mut sink = out.as_ref().map(|out| {
        let run_dir = PathBuf::from(out);
        let logs_dir = run_dir.join("logs");
        std::fs::create_dir_all(&logs_dir).unwrap_or_else(|e| {
            eprintln!("Failed to create logs dir: {e}");
            process::exit(1);
        });
        let run_id = run_dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(out)
            .to_string();
        let manifest = hw_logging::RunManifestV1 {
            run_manifest_version: hw_logging::RUN_MANIFEST_VERSION,
            run_id,
            created_ts_ms: hw_logging::now_ms(),
            git_hash: hw_logging::try_git_hash(),
            config_hash: Some(hw_logging::hash_config_bytes(&config_bytes)),
            seed: cfg.run.seed,
            strategy: strategy.to_string(),
            sim_time: cfg.run.sim_time,
            width: cfg.world.width,
            height: cfg.world.height,
            logs_dir: "logs".to_string(),
            steps_completed: 0,
            net_reward: None,
            finished_ts_ms: None,
        };
        let run_json = run_dir.join("run.json");
        hw_logging::write_manifest_atomic(&run_json, &manifest).unwrap_or_else(|e| {
            eprintln!("Failed to write run manifest: {e}");
            process::exit(1);
        });
        let steps_log = hw_logging::NdjsonWriter::open_append_with_flush(
            logs_dir.join("policy_steps.ndjson"),
            log_flush_every,
        )
        .unwrap_or_else(|e| {
            eprintln!("Failed to create step log: {e}");
            process::exit(1);
        });
        (run_json, manifest, steps_log)
    });

    if !quiet {
        println!(
            "Running {strategy} policy: {}x{} world, {} steps, seed={}",
            cfg.world.width, cfg.world.height, cfg.run.sim_time, cfg.run.seed
        );
    }

    let started = Instant::now();
    let outcome = run_policy_traced(
        &engine,
        chooser.as_mut(),
        &world,
        cfg.run.sim_time,
        &mut rng,
        |r| {
            if !quiet {
                println!(
                    "  step {:>3}  reward={:>10.2}  total={:>10.2}  flooded={:>3}  evacuated={:>3}  action={}",
                    r.step,
                    r.reward,
                    r.cumulative_reward,
                    r.flooded_cells,
                    r.evacuated_cells,
                    format_action(r)
                );
            }
            if let Some((_, manifest, steps_log)) = sink.as_mut() {
                let ev = hw_logging::PolicyStepEventV1 {
                    event: hw_logging::PolicyStepEventV1::EVENT,
                    ts_ms: hw_logging::now_ms(),
                    run_id: manifest.run_id.clone(),
                    step: r.step,
                    horizon: r.horizon,
                    action: r.action.iter().map(|c| (c.x, c.y)).collect(),
                    reward: r.reward,
                    cumulative_reward: r.cumulative_reward,
                    flooded_cells: r.flooded_cells,
                    evacuated_cells: r.evacuated_cells,
                    total_water: r.total_water,
                };
                steps_log.write_event(&ev).unwrap_or_else(|e| {
                    eprintln!("Failed to write step log: {e}");
                    process::exit(1);
                });
                manifest.steps_completed = r.step + 1;
            }
        },
    )
    .unwrap_or_else(|e| {
        eprintln!("Policy run failed: {e}");
        process::exit(1);
    });
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let final_world = &outcome.final_world;
    if let Some((run_json, mut manifest, mut steps_log)) = sink {
        let summary = hw_logging::RunSummaryEventV1 {
            event: hw_logging::RunSummaryEventV1::EVENT,
            ts_ms: hw_logging::now_ms(),
            run_id: manifest.run_id.clone(),
            strategy: strategy.to_string(),
            steps: outcome.steps,
            net_reward: outcome.net_reward,
            elapsed_ms,
            flooded_cells: final_world.flooded_count(),
            evacuated_cells: final_world.evacuated_count(),
            population_at_risk: final_world.population_at_risk(),
        };
        steps_log.write_event(&summary).unwrap_or_else(|e| {
            eprintln!("Failed to write run summary: {e}");
            process::exit(1);
        });
        steps_log.flush().unwrap_or_else(|e| {
            eprintln!("Failed to flush step log: {e}");
            process::exit(1);
        });

        manifest.steps_completed = outcome.steps;
        manifest.net_reward = Some(outcome.net_reward);
        manifest.finished_ts_ms = Some(hw_logging::now_ms());
        hw_logging::write_manifest_atomic(&run_json, &manifest).unwrap_or_else(|e| {
            eprintln!("Failed to write run manifest: {e}");
            process::exit(1);
        });
    }

    println!();
    println!("Run complete:");
    println!("  - Steps: {}", outcome.steps);
    println!("  - Net reward: {:.4}", outcome.net_reward);
    println!(
        "  - Flooded cells: {}/{}",
        final_world.flooded_count(),
        final_world.cells().len()
    );
    println!("  - Evacuated cells: {}", final_world.evacuated_count());
    println!(
        "  - Population at risk: {:.1}",
        final_world.population_at_risk()
    );
    println!("  - Elapsed: {elapsed_ms} ms");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        process::exit(0);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
        }
        "-V" | "--version" => {
            print_version();
        }
        "run" => {
            cmd_run(&args[2..]);
        }
        "config" => {
            cmd_config();
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Run `hw --help` for usage.");
            process::exit(1);
        }
    }
}
