//! Event content: templates and the catalog they are drawn from.
//!
//! The catalog is loaded once and then shared read-only between sessions.

pub mod pool;
pub mod template;

use std::path::PathBuf;

use thiserror::Error;

pub use pool::{ContentPool, EventPhase, Lethality};
pub use template::{render, EventTemplate};

/// Errors raised while loading or validating event content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed event catalog {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad placeholder in '{text}': {reason}")]
    Placeholder { text: String, reason: String },

    #[error("placeholder {{{index}}} in '{text}' exceeds the {tributes} tribute(s) of its event")]
    TributeOutOfRange {
        text: String,
        index: usize,
        tributes: usize,
    },
}
