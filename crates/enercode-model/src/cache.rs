//! Durable per-section state cache.
//!
//! One TOML snapshot per (section, scenario) under a cache directory, so
//! user-entered values survive a restart. This is a convenience cache for
//! session continuity only - never a source of truth, and loading is
//! deliberately tolerant: a missing or malformed snapshot just means the
//! section starts from defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use enercode_store::Scenario;

use crate::error::Result;

/// Serialized form of one container's state.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Field id -> encoded value string.
    pub fields: BTreeMap<String, String>,
    /// Ids whose values were user-entered (restored as `UserModified` so
    /// they keep winning over recomputed defaults).
    #[serde(default)]
    pub user: Vec<String>,
}

/// Directory-backed snapshot store.
pub struct StateCache {
    dir: PathBuf,
}

impl StateCache {
    pub fn new(dir: impl Into<PathBuf>) -> StateCache {
        StateCache { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, section: &str, scenario: Scenario) -> PathBuf {
        self.dir
            .join(format!("{section}.{}.toml", scenario.label()))
    }

    /// Load a snapshot if present and well-formed.
    pub fn load(&self, section: &str, scenario: Scenario) -> Option<Snapshot> {
        let path = self.path(section, scenario);
        let text = std::fs::read_to_string(&path).ok()?;
        match toml::from_str(&text) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(
                    section,
                    scenario = scenario.label(),
                    path = %path.display(),
                    %err,
                    "discarding malformed state snapshot"
                );
                None
            }
        }
    }

    /// Persist a snapshot, creating the cache directory on first use.
    pub fn save(&self, section: &str, scenario: Scenario, snapshot: &Snapshot) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let text = toml::to_string(snapshot)?;
        std::fs::write(self.path(section, scenario), text)?;
        Ok(())
    }
}
