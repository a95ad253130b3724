use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use voxelbox_shared::config::SimConfig;

const MIN_TICK_RATE: u32 = 1;
const MAX_TICK_RATE: u32 = 240;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlessConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Stop after this many ticks; runs until `stop` or Ctrl+C when unset.
    #[serde(default)]
    pub max_ticks: Option<u64>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub sim: SimConfig,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            max_ticks: None,
            log_filter: default_log_filter(),
            sim: SimConfig::default(),
        }
    }
}

impl HeadlessConfig {
    pub fn sanitize(mut self) -> Self {
        self.tick_rate = self.tick_rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE);
        if self.log_filter.trim().is_empty() {
            self.log_filter = default_log_filter();
        }
        self.sim = self.sim.sanitize();
        self
    }

    pub fn from_toml_str(contents: &str) -> io::Result<Self> {
        let parsed = toml::from_str::<Self>(contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize config: {e}"),
            )
        })?;
        Ok(parsed.sanitize())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

fn default_tick_rate() -> u32 {
    60
}

fn default_log_filter() -> String {
    "info".to_string()
}
