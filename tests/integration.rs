//! Integration tests for the hgames binary.
//!
//! Tests the full command session flow by spawning the engine process,
//! sending commands via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

fn content_path() -> String {
    format!("{}/content/events.json", env!("CARGO_MANIFEST_DIR"))
}

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_hgames");
    let mut child = Command::new(exe)
        .args(["--content", &content_path(), "--seed", "7"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start hgames");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

/// Commands that create a four-player game in room `arena` and start it.
const SETUP: &[&str] = &[
    "newgame arena 1 4",
    "volunteer arena 1 Katniss",
    "volunteer arena 2 Peeta",
    "join arena 1 Katniss",
    "join arena 3 Rue",
    "join arena 4 Thresh",
    "join arena 5 Foxface",
    "startgame arena",
];

#[test]
fn quit_ends_session_quietly() {
    let lines = run_engine(&["quit", "newgame arena 1 4"]);
    assert!(lines.is_empty(), "nothing after quit should run: {:?}", lines);
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_engine(&["foobar", "newgame", "newgame arena 1 2", "quit"]);
    assert_eq!(lines, vec!["ok newgame arena max 2"]);
}

#[test]
fn start_reports_players_and_teams() {
    let lines = run_engine(SETUP);
    let start = lines
        .iter()
        .find(|l| l.starts_with("ok startgame"))
        .expect("startgame reply");
    assert_eq!(start, "ok startgame arena players 4 teams 2");

    let teams: Vec<&String> = lines.iter().filter(|l| l.starts_with("team ")).collect();
    assert_eq!(teams.len(), 2);
    for team in teams {
        let members = team.split_once(": ").unwrap().1;
        assert_eq!(members.split(", ").count(), 2, "{}", team);
    }
}

#[test]
fn players_lists_distinct_roster() {
    let mut commands = SETUP.to_vec();
    commands.push("players arena");
    let lines = run_engine(&commands);

    let names: Vec<&String> = lines.iter().filter(|l| l.starts_with("Name: ")).collect();
    assert_eq!(names.len(), 4);
    assert!(names.iter().any(|l| *l == "Name: Katniss, ID: 1"));
    assert!(names.iter().any(|l| *l == "Name: Peeta, ID: 2"));
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 4);
}

#[test]
fn continue_walks_the_phase_cycle() {
    let mut commands = SETUP.to_vec();
    commands.extend(["continue arena"; 5]);
    let lines = run_engine(&commands);

    let phases: Vec<&String> = lines
        .iter()
        .filter(|l| l.starts_with("event ") || l.starts_with("noevent "))
        .collect();
    assert_eq!(phases.len(), 5);
    assert!(phases[0].starts_with("event bloodbath day 0 "), "{}", phases[0]);
    for (i, line) in phases.iter().enumerate() {
        let day = i / 2;
        assert!(line.contains(&format!(" day {}", day)), "phase {}: {}", i, line);
    }
}

#[test]
fn continue_before_start_is_rejected() {
    let lines = run_engine(&["newgame arena 1 4", "continue arena"]);
    assert_eq!(lines[1], "error invalid state: the game has not started");
}

#[test]
fn enroll_after_start_is_rejected() {
    let mut commands = SETUP.to_vec();
    commands.push("volunteer arena 9 Cato");
    let lines = run_engine(&commands);
    assert_eq!(
        lines.last().unwrap(),
        "error invalid state: cannot enroll after the game has started"
    );
}

#[test]
fn rooms_are_independent() {
    let lines = run_engine(&[
        "newgame a 1 2",
        "newgame b 1 3",
        "volunteer a 5 Glimmer",
        "snapshot a",
        "snapshot b",
    ]);
    assert_eq!(lines[2], "ok volunteer a 5 Glimmer");
    assert!(lines[3].contains("\"max_players\":2"));
    assert!(lines[3].contains("Glimmer"));
    assert!(lines[4].contains("\"max_players\":3"));
    assert!(lines[4].contains("\"roster\":[]"));
}

#[test]
fn endgame_frees_the_room() {
    let lines = run_engine(&[
        "newgame arena 1 2",
        "endgame arena",
        "newgame arena 2 6",
        "snapshot arena",
    ]);
    assert_eq!(lines[1], "ok endgame arena day 0");
    assert_eq!(lines[2], "ok newgame arena max 6");
    assert!(lines[3].contains("\"creator\":2"));
}
