//! The event catalog, keyed by phase and lethality.
//!
//! Catalogs are JSON documents:
//!
//! ```json
//! { "bloodbath": { "fatal": [ { "tributes": 2, "text": ["{0} kills {1}"] } ],
//!                  "nonfatal": [] },
//!   "day": {}, "night": {}, "feast": {} }
//! ```
//!
//! The short keys `bb`, `f` and `nf` are accepted as well. A directory may
//! also hold one file per phase (`bb.json`, `day.json`, ...) whose body is
//! just the `{ "fatal": [...], "nonfatal": [...] }` buckets.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::template::EventTemplate;
use super::ContentError;
use crate::game::PhaseLabel;

/// Phase key used to look events up. `Feast` is only reachable through the
/// feast roll during day and night phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPhase {
    Bloodbath,
    Day,
    Night,
    Feast,
}

pub const ALL_EVENT_PHASES: [EventPhase; 4] = [
    EventPhase::Bloodbath,
    EventPhase::Day,
    EventPhase::Night,
    EventPhase::Feast,
];

impl EventPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventPhase::Bloodbath => "bloodbath",
            EventPhase::Day => "day",
            EventPhase::Night => "night",
            EventPhase::Feast => "feast",
        }
    }

    /// Parses a catalog key, long or short form.
    pub fn from_key(key: &str) -> Option<EventPhase> {
        match key {
            "bloodbath" | "bb" => Some(EventPhase::Bloodbath),
            "day" => Some(EventPhase::Day),
            "night" => Some(EventPhase::Night),
            "feast" => Some(EventPhase::Feast),
            _ => None,
        }
    }
}

impl From<PhaseLabel> for EventPhase {
    fn from(label: PhaseLabel) -> Self {
        match label {
            PhaseLabel::Bloodbath => EventPhase::Bloodbath,
            PhaseLabel::Day => EventPhase::Day,
            PhaseLabel::Night => EventPhase::Night,
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an event eliminates its tributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lethality {
    Fatal,
    Nonfatal,
}

impl Lethality {
    pub const fn is_fatal(self) -> bool {
        matches!(self, Lethality::Fatal)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Lethality::Fatal => "fatal",
            Lethality::Nonfatal => "nonfatal",
        }
    }
}

impl fmt::Display for Lethality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct RawTemplate {
    #[serde(alias = "required_tributes")]
    tributes: usize,
    #[serde(alias = "text_fields")]
    text: RawText,
}

#[derive(Deserialize, Default)]
struct RawBuckets {
    #[serde(default, alias = "f")]
    fatal: Vec<RawTemplate>,
    #[serde(default, alias = "nf")]
    nonfatal: Vec<RawTemplate>,
}

#[derive(Deserialize, Default)]
struct RawCatalog {
    #[serde(default, alias = "bb")]
    bloodbath: RawBuckets,
    #[serde(default)]
    day: RawBuckets,
    #[serde(default)]
    night: RawBuckets,
    #[serde(default)]
    feast: RawBuckets,
}

/// Read-only catalog of event templates.
///
/// Buckets are indexed `[EventPhase as usize][Lethality as usize]`. A bucket
/// that was never filled reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPool {
    buckets: [[Vec<EventTemplate>; 2]; 4],
}

impl ContentPool {
    /// An empty pool; every lookup yields no templates.
    pub fn new() -> Self {
        ContentPool::default()
    }

    /// Adds a template under `phase`/`lethality`.
    ///
    /// The template's own lethal flag is expected to match the bucket.
    pub fn insert(&mut self, phase: EventPhase, lethality: Lethality, template: EventTemplate) {
        self.buckets[phase as usize][lethality as usize].push(template);
    }

    /// Templates filed under `phase`/`lethality`.
    pub fn templates(&self, phase: EventPhase, lethality: Lethality) -> &[EventTemplate] {
        &self.buckets[phase as usize][lethality as usize]
    }

    /// Total number of templates across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().flatten().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves every template of `other` into this pool.
    pub fn merge(&mut self, other: ContentPool) {
        for (mine, theirs) in self.buckets.iter_mut().zip(other.buckets) {
            for (dst, src) in mine.iter_mut().zip(theirs) {
                dst.extend(src);
            }
        }
    }

    /// Parses a full catalog document.
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        Self::parse_catalog(json, "<inline>")
    }

    fn parse_catalog(json: &str, origin: &str) -> Result<Self, ContentError> {
        let raw: RawCatalog = serde_json::from_str(json).map_err(|source| ContentError::Json {
            origin: origin.to_string(),
            source,
        })?;
        let mut pool = ContentPool::new();
        pool.add_buckets(EventPhase::Bloodbath, raw.bloodbath)?;
        pool.add_buckets(EventPhase::Day, raw.day)?;
        pool.add_buckets(EventPhase::Night, raw.night)?;
        pool.add_buckets(EventPhase::Feast, raw.feast)?;
        Ok(pool)
    }

    fn parse_phase_file(json: &str, origin: &str, phase: EventPhase) -> Result<Self, ContentError> {
        let raw: RawBuckets = serde_json::from_str(json).map_err(|source| ContentError::Json {
            origin: origin.to_string(),
            source,
        })?;
        let mut pool = ContentPool::new();
        pool.add_buckets(phase, raw)?;
        Ok(pool)
    }

    fn add_buckets(&mut self, phase: EventPhase, raw: RawBuckets) -> Result<(), ContentError> {
        for (lethality, templates) in [
            (Lethality::Fatal, raw.fatal),
            (Lethality::Nonfatal, raw.nonfatal),
        ] {
            for t in templates {
                let fields = match t.text {
                    RawText::One(s) => vec![s],
                    RawText::Many(v) => v,
                };
                let template = EventTemplate::new(t.tributes, lethality.is_fatal(), fields)?;
                self.insert(phase, lethality, template);
            }
        }
        Ok(())
    }

    /// Loads a catalog from a file, or from every `*.json` file of a
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        if path.is_dir() {
            return Self::load_dir(path);
        }
        let json = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let pool = match EventPhase::from_key(stem) {
            Some(phase) => Self::parse_phase_file(&json, &origin, phase)?,
            None => Self::parse_catalog(&json, &origin)?,
        };
        debug!(path = %origin, templates = pool.len(), "loaded event catalog");
        Ok(pool)
    }

    /// Merges every `*.json` file in `dir`, in file-name order.
    pub fn load_dir(dir: &Path) -> Result<Self, ContentError> {
        let io_err = |source| ContentError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut pool = ContentPool::new();
        for file in files {
            pool.merge(Self::load(&file)?);
        }
        Ok(pool)
    }
}
