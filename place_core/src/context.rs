//! The playthrough a set of components operates on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, Weak};

use crate::config::EngineConfig;

const MAP_FILE: &str = "map.json";
const METADATA_FILE: &str = "metadata.json";

/// Live write gates, keyed by the canonical path of what they guard.
static WRITE_GATES: LazyLock<Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Canonical form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the rest is appended.
fn canonical_key(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return rest.iter().rev().fold(canonical, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}

/// The gate shared by every handle on `path` in this process.
fn gate_for(path: &Path) -> Arc<Mutex<()>> {
    let key = canonical_key(path);
    let mut gates = hold(&*WRITE_GATES);
    gates.retain(|_, gate| gate.strong_count() > 0);

    if let Some(gate) = gates.get(&key).and_then(Weak::upgrade) {
        return gate;
    }
    let gate = Arc::new(Mutex::new(()));
    gates.insert(key, Arc::downgrade(&gate));
    gate
}

// The gates guard no data, so a panic elsewhere can't leave them inconsistent.
fn hold<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Explicit handle to one playthrough's documents.
///
/// Every component is built from a context instead of reaching for global
/// file state. Writes go through one of three gates: the playthrough's own
/// documents, the template directory, and the guidelines document. Each gate
/// is shared by every context in the process that points at the same files,
/// so no two read-modify-writes of one document interleave. The gates are not
/// re-entrant, and only top-level operations take them.
#[derive(Debug, Clone)]
pub struct PlaythroughContext {
    name: String,
    playthrough_dir: PathBuf,
    templates_dir: PathBuf,
    guidelines_path: PathBuf,
    default_weather: String,
    write_gate: Arc<Mutex<()>>,
    templates_gate: Arc<Mutex<()>>,
    guidelines_gate: Arc<Mutex<()>>,
}

impl PlaythroughContext {
    pub fn new(config: &EngineConfig, name: impl Into<String>) -> Self {
        let name = name.into();
        let playthrough_dir = config.storage.playthroughs_path().join(&name);
        let templates_dir = config.storage.templates_path();
        let guidelines_path = config.storage.guidelines_path();

        Self {
            write_gate: gate_for(&playthrough_dir),
            templates_gate: gate_for(&templates_dir),
            guidelines_gate: gate_for(&guidelines_path),
            playthrough_dir,
            templates_dir,
            guidelines_path,
            default_weather: config.generation.default_weather.clone(),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn playthrough_dir(&self) -> &Path {
        &self.playthrough_dir
    }

    pub fn map_path(&self) -> PathBuf {
        self.playthrough_dir.join(MAP_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.playthrough_dir.join(METADATA_FILE)
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    pub fn guidelines_path(&self) -> &Path {
        &self.guidelines_path
    }

    pub fn default_weather(&self) -> &str {
        &self.default_weather
    }

    /// Hold the gate of the playthrough's map and metadata until the guard drops.
    pub fn lock_writes(&self) -> MutexGuard<'_, ()> {
        hold(&self.write_gate)
    }

    /// Hold the gate of the template documents.
    pub fn lock_templates(&self) -> MutexGuard<'_, ()> {
        hold(&self.templates_gate)
    }

    /// Hold the gate of the guidelines document.
    pub fn lock_guidelines(&self) -> MutexGuard<'_, ()> {
        hold(&self.guidelines_gate)
    }
}
