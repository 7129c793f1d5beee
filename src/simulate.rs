//! Batch game simulation.
//!
//! Plays many sessions to a fixed phase count with synthetic rosters and
//! records every resolution. Used to check how tuned chance curves and a
//! given catalog play out across many games.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::config::GameConfig;
use crate::content::{ContentPool, EventPhase};
use crate::events::{EventResolver, Resolution};
use crate::game::{Candidate, GameError, GameSession, ParticipantId, Team};

/// Configuration for a simulation run.
#[derive(Clone)]
pub struct SimulationConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Roster size of every game.
    pub players: usize,
    /// Phases to play per game, bloodbath included.
    pub phases: usize,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
    /// Curves and team size.
    pub game: GameConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_games: 10,
            players: 24,
            phases: 30,
            threads: 4,
            seed: 0,
            quiet: false,
            game: GameConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.players == 0 {
            return Err(GameError::InvalidConfiguration(
                "simulated games need at least one player".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(GameError::InvalidConfiguration(
                "thread count must be positive".to_string(),
            ));
        }
        self.game.validate()
    }
}

/// A complete simulated game.
#[derive(Clone, Serialize)]
pub struct GameRecord {
    /// Sequential game ID.
    pub game_id: usize,
    pub players: usize,
    pub teams: Vec<Team>,
    /// One entry per phase, in order.
    pub resolutions: Vec<Resolution>,
}

/// Synthetic room members `1..=n`.
fn synthetic_members(n: usize) -> Vec<Candidate> {
    (1..=n as u64)
        .map(|i| Candidate::new(ParticipantId(i), format!("Tribute {}", i), None))
        .collect()
}

/// Plays one game from creation to `config.phases` advances.
pub fn play_game(
    config: &SimulationConfig,
    resolver: &EventResolver,
    pool: &ContentPool,
    game_id: usize,
    rng: &mut impl Rng,
) -> Result<GameRecord, GameError> {
    let mut session = GameSession::create(
        ParticipantId(0),
        format!("sim-{}", game_id),
        config.players,
    )?;
    let teams = session
        .start(synthetic_members(config.players), config.game.team_size, rng)?
        .to_vec();

    let mut resolutions = Vec::with_capacity(config.phases);
    for _ in 0..config.phases {
        resolutions.push(session.advance(resolver, pool, rng)?.resolution);
    }

    Ok(GameRecord {
        game_id,
        players: config.players,
        teams,
        resolutions,
    })
}

/// Runs the simulation and collects every game record, ordered by id.
pub fn run_simulation(config: &SimulationConfig, pool: &ContentPool) -> Result<Vec<GameRecord>, GameError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_simulation_with_callback(config, pool, |game| games.push(game))?;
    games.sort_by_key(|g| g.game_id);
    Ok(games)
}

/// Runs the simulation, calling `on_game` with each completed game record.
pub fn run_simulation_with_callback<F>(
    config: &SimulationConfig,
    pool: &ContentPool,
    on_game: F,
) -> Result<(), GameError>
where
    F: FnMut(GameRecord) + Send,
{
    config.validate()?;
    let resolver = config.game.resolver()?;
    if config.threads > 1 {
        run_parallel(config, &resolver, pool, on_game)
    } else {
        run_sequential(config, &resolver, pool, on_game)
    }
}

fn game_rng(seed: u64, game_id: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn report(config: &SimulationConfig, done: usize, game: &GameRecord, started: Instant) {
    if config.quiet {
        return;
    }
    let events = game.resolutions.iter().filter(|r| r.event.is_some()).count();
    info!(
        "Game {}/{}: {} events over {} phases ({:.2}s)",
        done,
        config.num_games,
        events,
        game.resolutions.len(),
        started.elapsed().as_secs_f64()
    );
}

/// Sequential simulation: plays games one at a time.
fn run_sequential<F>(
    config: &SimulationConfig,
    resolver: &EventResolver,
    pool: &ContentPool,
    mut on_game: F,
) -> Result<(), GameError>
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let started = Instant::now();
        let mut rng = game_rng(config.seed, i);
        let game = play_game(config, resolver, pool, i, &mut rng)?;
        report(config, i + 1, &game, started);
        on_game(game);
    }
    Ok(())
}

/// Parallel simulation: plays games concurrently using rayon.
/// Uses a channel to deliver completed games to the callback.
fn run_parallel<F>(
    config: &SimulationConfig,
    resolver: &EventResolver,
    pool: &ContentPool,
    mut on_game: F,
) -> Result<(), GameError>
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let threads = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| GameError::InvalidConfiguration(e.to_string()))?;

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<GameRecord, GameError>>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            threads.install(|| {
                (0..config.num_games)
                    .into_par_iter()
                    .for_each_with(tx, |tx, i| {
                        let started = Instant::now();
                        let mut rng = game_rng(config.seed, i);
                        let result = play_game(config, resolver, pool, i, &mut rng);
                        if let Ok(game) = &result {
                            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                            report(config, done, game, started);
                        }
                        let _ = tx.send(result);
                    });
            });
        });

        // Completed games arrive on this thread; the first failure wins.
        let mut first_error = None;
        for result in rx {
            match result {
                Ok(game) => on_game(game),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate counts over a set of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub games: usize,
    pub phases: usize,
    pub events: usize,
    pub no_events: usize,
    pub fatal_rolls: usize,
    pub feasts: usize,
    /// `(day, phases resolved on that day, fatal rolls on that day)`.
    pub by_day: Vec<(u32, usize, usize)>,
}

impl Summary {
    pub fn fatal_rate(&self) -> f64 {
        self.fatal_rolls as f64 / self.phases.max(1) as f64
    }

    pub fn feast_rate(&self) -> f64 {
        self.feasts as f64 / self.phases.max(1) as f64
    }
}

/// Tallies resolutions across `games`.
pub fn summarize(games: &[GameRecord]) -> Summary {
    let mut summary = Summary {
        games: games.len(),
        ..Default::default()
    };
    for r in games.iter().flat_map(|g| g.resolutions.iter()) {
        summary.phases += 1;
        if r.event.is_some() {
            summary.events += 1;
        } else {
            summary.no_events += 1;
        }
        let fatal = r.lethality.is_fatal();
        if fatal {
            summary.fatal_rolls += 1;
        }
        if r.effective_phase == EventPhase::Feast {
            summary.feasts += 1;
        }

        let day = r.day as usize;
        if summary.by_day.len() <= day {
            let start = summary.by_day.len() as u32;
            summary
                .by_day
                .extend((start..=r.day).map(|d| (d, 0, 0)));
        }
        summary.by_day[day].1 += 1;
        if fatal {
            summary.by_day[day].2 += 1;
        }
    }
    summary
}

/// Prints summary statistics to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let summary = summarize(games);

    eprintln!("=== Simulation Summary ===");
    eprintln!("Games: {}", summary.games);
    eprintln!("Phases: {}", summary.phases);
    eprintln!(
        "Events: {} (no event: {})",
        summary.events, summary.no_events
    );
    eprintln!("Fatal rolls: {:.1}%", 100.0 * summary.fatal_rate());
    eprintln!("Feasts: {:.1}%", 100.0 * summary.feast_rate());
    eprintln!("Fatal rate by day:");
    for (day, phases, fatal) in &summary.by_day {
        let pct = 100.0 * *fatal as f64 / (*phases).max(1) as f64;
        eprintln!("  day {:>3}: {:>5.1}% of {}", day, pct, phases);
    }
}
