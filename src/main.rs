//! hgames -- a battle-royale session engine driven over stdin.
//!
//! Reads one command per line from stdin and writes replies to stdout.
//! Logs go to stderr.
//!
//! Usage:
//!   hgames [--content PATH]... [--config PATH] [--seed N]

use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hgames::config::GameConfig;
use hgames::content::ContentPool;
use hgames::engine::Engine;
use hgames::protocol::{parse_command, Command};

struct Options {
    content: Vec<PathBuf>,
    config: Option<PathBuf>,
    seed: u64,
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().collect();
    let mut options = Options {
        content: Vec::new(),
        config: None,
        seed: 0,
    };

    let mut i = 1;
    while i < args.len() {
        let value = |i: usize| match args.get(i + 1) {
            Some(v) => v.clone(),
            None => {
                eprintln!("missing value for {}", args[i]);
                process::exit(2);
            }
        };
        match args[i].as_str() {
            "--content" => {
                options.content.push(PathBuf::from(value(i)));
                i += 1;
            }
            "--config" => {
                options.config = Some(PathBuf::from(value(i)));
                i += 1;
            }
            "--seed" => {
                options.seed = value(i).parse().unwrap_or_else(|_| {
                    eprintln!("invalid --seed value");
                    process::exit(2);
                });
                i += 1;
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(2);
            }
        }
        i += 1;
    }
    options
}

fn print_usage() {
    eprintln!("Usage: hgames [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --content PATH  Event catalog file or directory (repeatable)");
    eprintln!("  --config PATH   Game configuration JSON");
    eprintln!("  --seed N        Random seed, 0 for entropy (default: 0)");
    eprintln!("  --help          Show this help");
}

/// Runs the main command loop, reading commands from stdin
/// and writing responses to stdout.
fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = parse_args();

    let config = match &options.config {
        Some(path) => match GameConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    let mut pool = ContentPool::new();
    for path in &options.content {
        match ContentPool::load(path) {
            Ok(p) => pool.merge(p),
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        }
    }
    info!(templates = pool.len(), "content loaded");

    let mut engine = match Engine::new(Arc::new(pool), config, options.seed) {
        Ok(e) => e,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        if cmd == Command::Quit {
            break;
        }
        if let Err(e) = engine.execute(cmd, &mut out) {
            error!("failed to write reply: {}", e);
            break;
        }
    }
}
