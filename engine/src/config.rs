use std::{fs, path::Path};

use serde::Deserialize;

use crate::RollError;

const DEFAULT_PARALLEL_THRESHOLD: u64 = 4096;

/// Tuning for the multi-roll path. Loaded from JSON; CLI flags override.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct EngineConfig {
    /// Worker threads for large rolls. `None` uses the available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Roll counts below this are drawn on one generator.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: u64,
}

fn default_parallel_threshold() -> u64 {
    DEFAULT_PARALLEL_THRESHOLD
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { workers: None, parallel_threshold: DEFAULT_PARALLEL_THRESHOLD }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, RollError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| RollError::Config(e.to_string()))?;
        cfg.validated()
    }

    pub fn load(path: &Path) -> Result<Self, RollError> {
        let json = fs::read_to_string(path)
            .map_err(|e| RollError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn with_workers(mut self, workers: Option<usize>) -> Result<Self, RollError> {
        if workers.is_some() {
            self.workers = workers;
        }
        self.validated()
    }

    fn validated(self) -> Result<Self, RollError> {
        if self.workers == Some(0) {
            return Err(RollError::Config("workers must be at least 1".into()));
        }
        Ok(self)
    }

    /// Worker count for `roll_count` draws: never more workers than rolls.
    pub fn worker_count(&self, roll_count: u64) -> usize {
        if roll_count < self.parallel_threshold {
            return 1;
        }
        let workers = self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        workers.clamp(1, usize::try_from(roll_count.max(1)).unwrap_or(usize::MAX))
    }
}
