use std::env;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::weekday;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub schedule: ScheduleConfig,
    pub activity: ActivityConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SHIFTGRID_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SHIFTGRID_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            schedule: ScheduleConfig::from_env_profiled(p),
            activity: ActivityConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  schedule:    horizon_days={}, week_start={}",
            self.schedule.horizon_days,
            weekday::name(self.schedule.week_start)
        );
        tracing::info!("  activity:    max_entries={}", self.activity.max_entries);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            schedule: ScheduleConfig::default(),
            activity: ActivityConfig::default(),
        }
    }
}

// ── Schedule ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Days ahead to expand when a series is created without an explicit window end.
    pub horizon_days: u32,
    /// First column of the week grid.
    pub week_start: Weekday,
}

impl ScheduleConfig {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        let week_start = match profiled_env_opt(p, "SCHEDULE_WEEK_START") {
            Some(raw) => weekday::parse(&raw).unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid SCHEDULE_WEEK_START, using Sunday");
                defaults.week_start
            }),
            None => defaults.week_start,
        };
        let horizon_days = match profiled_env_u32(p, "SCHEDULE_HORIZON_DAYS", defaults.horizon_days) {
            0 => {
                tracing::warn!(
                    default = defaults.horizon_days,
                    "SCHEDULE_HORIZON_DAYS must be positive, using default"
                );
                defaults.horizon_days
            }
            days => days,
        };
        Self {
            horizon_days,
            week_start,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            horizon_days: 90,
            week_start: Weekday::Sun,
        }
    }
}

// ── Activity log ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Per-subject cap before the oldest records are evicted.
    pub max_entries: usize,
}

impl ActivityConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_entries: profiled_env_u32(p, "ACTIVITY_LOG_MAX_ENTRIES", 500) as usize,
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self { max_entries: 500 }
    }
}
