//! Level storage with fallback generation
//!
//! Levels are JSON documents stored under `level<N>` keys in a key-value
//! store (a directory of files natively, anything else behind
//! [`LevelStore`]). A missing, malformed or invalid level never stops the
//! game: the caller's generator supplies a replacement.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::bricker::level::{Level, LevelGenerator};
use crate::settings::Settings;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid level {level}: {reason}")]
    InvalidLevel { level: u32, reason: String },
}

/// Key-value storage for level documents
pub trait LevelStore {
    /// Stored document, or `None` when the key was never written
    fn read(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> PersistenceResult<()>;
}

/// In-process store (tests, and hosts that persist storage themselves)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LevelStore for MemoryStore {
    fn read(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per entry
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl LevelStore for DirectoryStore {
    fn read(&self, key: &str) -> PersistenceResult<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }
}

/// Storage key for level `number`
pub fn level_key(number: u32) -> String {
    format!("level{number}")
}

/// Read and validate a stored level. `Ok(None)` means nothing is stored.
pub fn load_level(store: &dyn LevelStore, number: u32) -> PersistenceResult<Option<Level>> {
    let Some(json) = store.read(&level_key(number))? else {
        return Ok(None);
    };
    let level: Level = serde_json::from_str(&json)?;
    level.validate(number)?;
    Ok(Some(level))
}

/// Stored level if it is usable, otherwise a generated one
pub fn load_level_or_generate(
    store: &dyn LevelStore,
    number: u32,
    generator: &dyn LevelGenerator,
    settings: &Settings,
) -> Level {
    match load_level(store, number) {
        Ok(Some(level)) => {
            log::info!("Loaded level {} ({} bricks)", number, level.bricks.len());
            level
        }
        Ok(None) => {
            log::debug!("No stored level {}, generating", number);
            generator.generate(number, settings)
        }
        Err(err) => {
            log::warn!("Stored level {} unusable ({}), generating", number, err);
            generator.generate(number, settings)
        }
    }
}

pub fn save_level(store: &mut dyn LevelStore, number: u32, level: &Level) -> PersistenceResult<()> {
    level.validate(number)?;
    let json = serde_json::to_string(level)?;
    store.write(&level_key(number), &json)?;
    log::info!("Saved level {} ({} bricks)", number, level.bricks.len());
    Ok(())
}
