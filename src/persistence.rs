//! Storage for per-level solved flags.
//!
//! JSON format for `progress.json`:
//! - `solved`: ascending list of solved level ids
//! - `force_win_check`: when true, wins are checked outside play mode too

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::level::LevelId;

pub const DEFAULT_PROGRESS_FILE: &str = "progress.json";

/// Key-value store keyed by level id.
pub trait ProgressStore {
    fn is_solved(&self, level: LevelId) -> bool;
    fn mark_solved(&mut self, level: LevelId) -> Result<()>;
    /// Diagnostic override: evaluate wins even in inspect mode.
    fn force_win_check(&self) -> bool;
    fn set_force_win_check(&mut self, enabled: bool) -> Result<()>;
    /// Solved level ids in ascending order.
    fn solved_levels(&self) -> Vec<LevelId>;
}

/// In-memory store, lost when dropped.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    solved: FxHashSet<LevelId>,
    force_win_check: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn is_solved(&self, level: LevelId) -> bool {
        self.solved.contains(&level)
    }

    fn mark_solved(&mut self, level: LevelId) -> Result<()> {
        self.solved.insert(level);
        Ok(())
    }

    fn force_win_check(&self) -> bool {
        self.force_win_check
    }

    fn set_force_win_check(&mut self, enabled: bool) -> Result<()> {
        self.force_win_check = enabled;
        Ok(())
    }

    fn solved_levels(&self) -> Vec<LevelId> {
        let mut levels: Vec<_> = self.solved.iter().copied().collect();
        levels.sort_unstable();
        levels
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressFile {
    #[serde(default)]
    solved: Vec<LevelId>,
    #[serde(default)]
    force_win_check: bool,
}

/// Store backed by a JSON file, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl JsonFileStore {
    /// Opens `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file: ProgressFile = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => ProgressFile::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), solved = file.solved.len(), "opened progress store");
        Ok(Self {
            path,
            memory: MemoryStore {
                solved: file.solved.into_iter().collect(),
                force_win_check: file.force_win_check,
            },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let file = ProgressFile {
            solved: self.memory.solved_levels(),
            force_win_check: self.memory.force_win_check,
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl ProgressStore for JsonFileStore {
    fn is_solved(&self, level: LevelId) -> bool {
        self.memory.is_solved(level)
    }

    fn mark_solved(&mut self, level: LevelId) -> Result<()> {
        self.memory.mark_solved(level)?;
        self.save()
    }

    fn force_win_check(&self) -> bool {
        self.memory.force_win_check()
    }

    fn set_force_win_check(&mut self, enabled: bool) -> Result<()> {
        self.memory.set_force_win_check(enabled)?;
        self.save()
    }

    fn solved_levels(&self) -> Vec<LevelId> {
        self.memory.solved_levels()
    }
}
