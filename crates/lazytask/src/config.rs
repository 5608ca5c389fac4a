use anyhow::{bail, Context, Result};
use lazytask_core::{ReportQuery, DEFAULT_INTERVAL_ID_COLUMN};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_REFRESH_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub refresh_interval_ms: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub task: TaskConfig,
    pub timew: TimewConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskConfig {
    pub program: String,
    pub report: String,
    pub watch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimewConfig {
    pub program: String,
    pub summary_args: Vec<String>,
    pub selectable_column: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
            log_level: "info".to_string(),
            log_file: None,
            task: TaskConfig::default(),
            timew: TimewConfig::default(),
        }
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            program: "task".to_string(),
            report: "next".to_string(),
            watch_dir: None,
        }
    }
}

impl Default for TimewConfig {
    fn default() -> Self {
        Self {
            program: "timew".to_string(),
            summary_args: ReportQuery::default_interval_args(),
            selectable_column: DEFAULT_INTERVAL_ID_COLUMN,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("LAZYTASK_REFRESH_MS") {
            self.refresh_interval_ms = value
                .trim()
                .parse()
                .with_context(|| format!("LAZYTASK_REFRESH_MS is not a number: '{value}'"))?;
        }
        if let Some(value) = non_empty(lookup("LAZYTASK_TASK_BIN")) {
            self.task.program = value;
        }
        if let Some(value) = non_empty(lookup("LAZYTASK_TIMEW_BIN")) {
            self.timew.program = value;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.refresh_interval_ms < MIN_REFRESH_MS {
            bail!(
                "refresh_interval_ms must be at least {MIN_REFRESH_MS}, got {}",
                self.refresh_interval_ms
            );
        }
        if self.task.program.trim().is_empty() || self.timew.program.trim().is_empty() {
            bail!("task and timew programs must not be empty");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.log_file {
            return Some(path.clone());
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|dir| dir.join("lazytask/lazytask.log"))
    }

    pub fn watch_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.task.watch_dir {
            return Some(dir.clone());
        }
        let default = dirs::home_dir()?.join(".task");
        default.is_dir().then_some(default)
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = non_empty(env::var("LAZYTASK_CONFIG").ok()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("lazytask/config.toml"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
