//! Command parser.
//!
//! Parses incoming protocol lines into structured `Command` variants that
//! the main loop dispatches on. Tokens are whitespace separated, so names
//! and image references are single tokens.

use tracing::warn;

use crate::game::{Candidate, ParticipantId};

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `newgame <room> <creator> [max]`
    NewGame {
        room: String,
        creator: ParticipantId,
        max_players: Option<usize>,
    },

    /// `join <room> <id> <name> [image]`: registers a member of a room with
    /// a game; members may fill empty seats at start.
    Join { room: String, member: Candidate },

    /// `volunteer <room> <id> <name> [image]`
    Volunteer { room: String, volunteer: Candidate },

    /// `startgame <room>`
    StartGame { room: String },

    /// `continue <room>`
    Continue { room: String },

    /// `players <room>`
    Players { room: String },

    /// `snapshot <room>`
    Snapshot { room: String },

    /// `endgame <room>`
    EndGame { room: String },

    /// Terminate the process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    match tokens[0] {
        "quit" => Some(Command::Quit),
        "newgame" => parse_newgame(&tokens),
        "join" => parse_candidate(&tokens).map(|(room, member)| Command::Join { room, member }),
        "volunteer" => {
            parse_candidate(&tokens).map(|(room, volunteer)| Command::Volunteer { room, volunteer })
        }
        "startgame" => parse_room(&tokens).map(|room| Command::StartGame { room }),
        "continue" => parse_room(&tokens).map(|room| Command::Continue { room }),
        "players" => parse_room(&tokens).map(|room| Command::Players { room }),
        "snapshot" => parse_room(&tokens).map(|room| Command::Snapshot { room }),
        "endgame" => parse_room(&tokens).map(|room| Command::EndGame { room }),

        other => {
            warn!("unknown command: {}", other);
            None
        }
    }
}

fn parse_id(token: &str) -> Option<ParticipantId> {
    match token.parse::<u64>() {
        Ok(v) => Some(ParticipantId(v)),
        Err(_) => {
            warn!("invalid participant id: '{}'", token);
            None
        }
    }
}

/// Parses `<command> <room>`.
fn parse_room(tokens: &[&str]) -> Option<String> {
    if tokens.len() != 2 {
        warn!("malformed {}: expected '{} <room>'", tokens[0], tokens[0]);
        return None;
    }
    Some(tokens[1].to_string())
}

/// Parses `newgame <room> <creator> [max]`.
fn parse_newgame(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens.len() > 4 {
        warn!("malformed newgame: expected 'newgame <room> <creator> [max]'");
        return None;
    }
    let creator = parse_id(tokens[2])?;
    let max_players = match tokens.get(3) {
        Some(t) => match t.parse::<usize>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("invalid max players value: '{}'", t);
                return None;
            }
        },
        None => None,
    };
    Some(Command::NewGame {
        room: tokens[1].to_string(),
        creator,
        max_players,
    })
}

/// Parses `<command> <room> <id> <name> [image]`.
fn parse_candidate(tokens: &[&str]) -> Option<(String, Candidate)> {
    if tokens.len() < 4 || tokens.len() > 5 {
        warn!(
            "malformed {}: expected '{} <room> <id> <name> [image]'",
            tokens[0], tokens[0]
        );
        return None;
    }
    let id = parse_id(tokens[2])?;
    let image = tokens.get(4).map(|s| s.to_string());
    Some((tokens[1].to_string(), Candidate::new(id, tokens[3], image)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_line() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn parse_quit() {
        assert_eq!(parse_command("quit"), Some(Command::Quit));
    }

    #[test]
    fn parse_newgame_with_and_without_max() {
        assert_eq!(
            parse_command("newgame arena 42 8"),
            Some(Command::NewGame {
                room: "arena".to_string(),
                creator: ParticipantId(42),
                max_players: Some(8),
            })
        );
        assert_eq!(
            parse_command("newgame arena 42"),
            Some(Command::NewGame {
                room: "arena".to_string(),
                creator: ParticipantId(42),
                max_players: None,
            })
        );
    }

    #[test]
    fn parse_newgame_rejects_bad_numbers() {
        assert_eq!(parse_command("newgame arena bob"), None);
        assert_eq!(parse_command("newgame arena 1 many"), None);
        assert_eq!(parse_command("newgame arena"), None);
    }

    #[test]
    fn parse_volunteer_with_image() {
        assert_eq!(
            parse_command("volunteer arena 7 Katniss k.png"),
            Some(Command::Volunteer {
                room: "arena".to_string(),
                volunteer: Candidate::new(ParticipantId(7), "Katniss", Some("k.png".to_string())),
            })
        );
    }

    #[test]
    fn parse_join_without_image() {
        assert_eq!(
            parse_command("join arena 8 Peeta"),
            Some(Command::Join {
                room: "arena".to_string(),
                member: Candidate::new(ParticipantId(8), "Peeta", None),
            })
        );
    }

    #[test]
    fn parse_room_commands() {
        assert_eq!(
            parse_command("startgame arena"),
            Some(Command::StartGame { room: "arena".to_string() })
        );
        assert_eq!(
            parse_command("  continue   arena  "),
            Some(Command::Continue { room: "arena".to_string() })
        );
        assert_eq!(
            parse_command("players arena"),
            Some(Command::Players { room: "arena".to_string() })
        );
        assert_eq!(
            parse_command("snapshot arena"),
            Some(Command::Snapshot { room: "arena".to_string() })
        );
        assert_eq!(
            parse_command("endgame arena"),
            Some(Command::EndGame { room: "arena".to_string() })
        );
        assert_eq!(parse_command("continue"), None);
        assert_eq!(parse_command("continue a b"), None);
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(parse_command("foobar"), None);
    }
}
