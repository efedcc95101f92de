use crate::scheduler::SchedulerTimings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for an edit session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Undo levels kept per session
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Quiet period before a content edit is written
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Longest a dirty session waits before an autosave
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Failed autosaves tolerated before autosave turns itself off
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Local previews/backups older than this are dropped on load
    #[serde(default = "default_snapshot_max_age_hours")]
    pub snapshot_max_age_hours: i64,

    /// Base of public URLs for pages without a custom domain
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_history_capacity() -> usize {
    crate::history::DEFAULT_HISTORY_CAPACITY
}

fn default_debounce_ms() -> u64 {
    2_000
}

fn default_autosave_interval_ms() -> u64 {
    30_000
}

fn default_retry_delay_ms() -> u64 {
    5_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_snapshot_max_age_hours() -> i64 {
    24
}

fn default_public_base_url() -> String {
    "https://pages.pagecraft.app".to_string()
}

impl EditorConfig {
    pub fn timings(&self) -> SchedulerTimings {
        SchedulerTimings {
            debounce: Duration::from_millis(self.debounce_ms),
            autosave_interval: Duration::from_millis(self.autosave_interval_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_retries: self.max_retries,
        }
    }

    pub fn snapshot_max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.snapshot_max_age_hours)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            debounce_ms: default_debounce_ms(),
            autosave_interval_ms: default_autosave_interval_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            max_retries: default_max_retries(),
            snapshot_max_age_hours: default_snapshot_max_age_hours(),
            public_base_url: default_public_base_url(),
        }
    }
}
