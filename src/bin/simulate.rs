//! Batch simulation CLI.
//!
//! Plays many games with synthetic rosters and outputs every resolution
//! as JSONL.
//!
//! Usage:
//!   cargo run --release --bin simulate -- --content PATH [OPTIONS]
//!
//! Options:
//!   --content PATH  Event catalog file or directory (repeatable, required)
//!   --config PATH   Game configuration JSON
//!   --games N       Number of games to play (default: 10)
//!   --players N     Roster size per game (default: 24)
//!   --phases N      Phases per game (default: 30)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Instant;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hgames::config::GameConfig;
use hgames::content::ContentPool;
use hgames::simulate::{self, SimulationConfig};

fn parse_value<T: FromStr>(args: &[String], i: usize) -> T {
    let flag = &args[i - 1];
    match args.get(i).map(|v| v.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            process::exit(2);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = SimulationConfig::default();
    let mut content: Vec<PathBuf> = Vec::new();
    let mut config_path: Option<PathBuf> = None;
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--content" => {
                i += 1;
                content.push(parse_value(&args, i));
            }
            "--config" => {
                i += 1;
                config_path = Some(parse_value(&args, i));
            }
            "--games" => {
                i += 1;
                config.num_games = parse_value(&args, i);
            }
            "--players" => {
                i += 1;
                config.players = parse_value(&args, i);
            }
            "--phases" => {
                i += 1;
                config.phases = parse_value(&args, i);
            }
            "--threads" => {
                i += 1;
                config.threads = parse_value(&args, i);
            }
            "--seed" => {
                i += 1;
                config.seed = parse_value(&args, i);
            }
            "--output" => {
                i += 1;
                output_path = Some(parse_value(&args, i));
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(2);
            }
        }
        i += 1;
    }

    if content.is_empty() {
        eprintln!("at least one --content path is required");
        print_usage();
        process::exit(2);
    }

    if let Some(path) = &config_path {
        config.game = match GameConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        };
    }

    let mut pool = ContentPool::new();
    for path in &content {
        match ContentPool::load(path) {
            Ok(p) => pool.merge(p),
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        }
    }

    if !config.quiet {
        info!(
            "Simulation: {} games, {} players, {} phases, {} threads, {} templates",
            config.num_games,
            config.players,
            config.phases,
            config.threads,
            pool.len()
        );
    }

    let start = Instant::now();
    let games = match simulate::run_simulation(&config, &pool) {
        Ok(g) => g,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if !config.quiet {
        info!(
            "Completed {} games in {:.1}s",
            games.len(),
            start.elapsed().as_secs_f64()
        );
        simulate::print_summary(&games);
    }

    let written = match &output_path {
        Some(path) => File::create(path)
            .and_then(|file| simulate::write_jsonl(&games, &mut BufWriter::new(file))),
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            simulate::write_jsonl(&games, &mut writer)
        }
    };
    match written {
        Ok(()) => {
            if let (Some(path), false) = (&output_path, config.quiet) {
                info!("Wrote {} games to {}", games.len(), path);
            }
        }
        Err(e) => {
            error!("failed to write output: {}", e);
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: simulate --content PATH [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --content PATH   Event catalog file or directory (repeatable, required)");
    eprintln!("  --config PATH    Game configuration JSON");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --players N      Roster size per game (default: 24)");
    eprintln!("  --phases N       Phases per game (default: 30)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress progress and summary output");
    eprintln!("  --help           Show this help");
}
