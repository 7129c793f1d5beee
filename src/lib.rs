//! hgames engine library.
//!
//! Exposes the session state machine, event resolution, content catalog,
//! session registry and command front end for use by integration tests and
//! the binary entry points.

pub mod config;
pub mod content;
pub mod engine;
pub mod events;
pub mod game;
pub mod protocol;
pub mod registry;
pub mod simulate;
