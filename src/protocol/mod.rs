//! Line protocol for driving sessions from a text stream.
//!
//! One command per line on input; replies are `ok ...`, `error ...`,
//! `event ...`, `noevent ...` or `snapshot <json>` lines.

pub mod parser;

pub use parser::{parse_command, Command};
