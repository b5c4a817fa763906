//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Tunables for an [`AccessEngine`](crate::AccessEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity of each decision-cache category.
    pub max_cache_entries: usize,
    /// Wall-clock budget for one fact resolution pass.
    pub provider_budget: Duration,
    /// Rule file to load at startup; `None` uses the baseline rule set.
    pub rules_path: Option<PathBuf>,
}

impl EngineConfig {
    pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 2000;
    pub const DEFAULT_PROVIDER_BUDGET: Duration = Duration::from_secs(2);

    pub fn new() -> Self {
        Self {
            max_cache_entries: Self::DEFAULT_MAX_CACHE_ENTRIES,
            provider_budget: Self::DEFAULT_PROVIDER_BUDGET,
            rules_path: None,
        }
    }

    pub fn with_max_cache_entries(mut self, entries: usize) -> Self {
        self.max_cache_entries = entries;
        self
    }

    pub fn with_provider_budget(mut self, budget: Duration) -> Self {
        self.provider_budget = budget;
        self
    }

    pub fn with_rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = Some(path.into());
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
