//! Headless Battle Runner
//!
//! Runs strategy-vs-strategy battles to completion and prints a JSON or text
//! result. Deterministic for a given seed and argument set.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use skirmish::core::types::PlayerId;
use skirmish::engine::{check_battle_end, BattleOutcome, World};
use skirmish::scenario::Scenario;
use skirmish::snapshot;
use skirmish::targeting::{General, GeneralKind, ScoreWeights, ScoredGeneral};

#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run strategy vs strategy battles and output results")]
struct Args {
    /// Strategy for player 1: nearest, aggro, or scored
    #[arg(long, default_value = "scored")]
    p1: String,

    /// Strategy for player 2: nearest, aggro, or scored
    #[arg(long, default_value = "nearest")]
    p2: String,

    /// Scenario: asymmetric, lanchester, line, wedge, or scatter
    #[arg(long, default_value = "asymmetric")]
    scenario: String,

    /// Fixed timestep in seconds
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Simulated seconds before the battle is called a draw
    #[arg(long, default_value_t = 300.0)]
    max_time: f32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Optional TOML file overriding the scored strategy's weights
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Write the final world state to this JSON file
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Stream battle events to stderr as they happen
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct BattleResult {
    outcome: String,
    sim_time: f32,
    ticks: u64,
    p1_strategy: String,
    p2_strategy: String,
    p1_survivors: usize,
    p2_survivors: usize,
    deaths: usize,
    scenario: String,
    seed: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);

    let Some(scenario) = Scenario::parse_tag(&args.scenario) else {
        eprintln!("Unknown scenario '{}'", args.scenario);
        return ExitCode::FAILURE;
    };

    let weights = match &args.weights {
        Some(path) => match ScoreWeights::load(path) {
            Ok(w) => Some(w),
            Err(e) => {
                eprintln!("Failed to load weights from {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let mut generals: BTreeMap<PlayerId, Box<dyn General>> = BTreeMap::new();
    for (slot, tag, owner) in [("--p1", &args.p1, PlayerId(1)), ("--p2", &args.p2, PlayerId(2))] {
        let Some(kind) = GeneralKind::parse_tag(tag) else {
            eprintln!("Unknown strategy '{}' for {}", tag, slot);
            return ExitCode::FAILURE;
        };
        let general = match (kind, &weights) {
            (GeneralKind::Scored, Some(w)) => Box::new(ScoredGeneral::with_weights(
                w.clone(),
                seed.wrapping_add(owner.0 as u64),
            )) as Box<dyn General>,
            _ => kind.build(seed.wrapping_add(owner.0 as u64)),
        };
        generals.insert(owner, general);
    }

    let mut world = World::new();
    scenario.setup(&mut world, seed);

    if args.verbose {
        eprintln!(
            "=== Battle started: {} vs {} on '{}' (seed {}) ===",
            args.p1, args.p2, args.scenario, seed
        );
        eprintln!(
            "P1: {} units, P2: {} units",
            world.units_for(PlayerId(1)).len(),
            world.units_for(PlayerId(2)).len()
        );
    }

    let mut ticks: u64 = 0;
    let outcome = loop {
        if let Some(outcome) = check_battle_end(&world, PlayerId(1), PlayerId(2), args.max_time) {
            break outcome;
        }
        let events_before = world.events().len();
        world.step(args.dt, &mut generals);
        ticks += 1;

        if args.verbose {
            for event in world.events().iter().skip(events_before) {
                eprintln!("  [{:.2}] {}", event.tick, event.description);
            }
        }
    };

    if let Some(path) = &args.snapshot_out {
        let snap = snapshot::capture(&world, &generals);
        if let Err(e) = snapshot::save_to_file(&snap, path) {
            eprintln!("Failed to write snapshot to {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let result = BattleResult {
        outcome: match outcome {
            BattleOutcome::Victory(p) => format!("Victory({})", p),
            BattleOutcome::Draw => "Draw".to_string(),
        },
        sim_time: world.clock(),
        ticks,
        p1_strategy: args.p1.clone(),
        p2_strategy: args.p2.clone(),
        p1_survivors: world.units_for(PlayerId(1)).len(),
        p2_survivors: world.units_for(PlayerId(2)).len(),
        deaths: world.events().len(),
        scenario: args.scenario.clone(),
        seed,
    };

    match args.format.as_str() {
        "json" => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                return ExitCode::FAILURE;
            }
        },
        "text" => {
            println!("Battle Result");
            println!("=============");
            println!("Outcome: {}", result.outcome);
            println!("Time: {:.1}s ({} ticks)", result.sim_time, result.ticks);
            println!(
                "Survivors: P1 {} ({}), P2 {} ({})",
                result.p1_survivors, result.p1_strategy, result.p2_survivors, result.p2_strategy
            );
            println!("Deaths: {}", result.deaths);
            println!("Scenario: {}", result.scenario);
            println!("Seed: {}", result.seed);
        }
        other => {
            eprintln!("Unknown format '{}'", other);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
