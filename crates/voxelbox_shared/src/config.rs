use serde::{Deserialize, Serialize};

use crate::breaking::DEFAULT_REACH;
use crate::item_drop::DEFAULT_LIFETIME_TICKS;
use crate::worldgen::DEFAULT_WORLD_SIZE;

const MIN_WORLD_SIZE: i32 = 1;
const MAX_WORLD_SIZE: i32 = 256;
const MIN_ITEM_LIFETIME_TICKS: u32 = 1;
const MAX_ITEM_LIFETIME_TICKS: u32 = 72_000;
const MIN_REACH: f32 = 1.0;
const MAX_REACH: f32 = 32.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_world_size")]
    pub world_size: i32,
    #[serde(default = "default_item_lifetime_ticks")]
    pub item_lifetime_ticks: u32,
    #[serde(default = "default_reach")]
    pub reach: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            world_size: default_world_size(),
            item_lifetime_ticks: default_item_lifetime_ticks(),
            reach: default_reach(),
        }
    }
}

impl SimConfig {
    pub fn sanitize(mut self) -> Self {
        self.world_size = self.world_size.clamp(MIN_WORLD_SIZE, MAX_WORLD_SIZE);
        self.item_lifetime_ticks = self
            .item_lifetime_ticks
            .clamp(MIN_ITEM_LIFETIME_TICKS, MAX_ITEM_LIFETIME_TICKS);
        self.reach = if self.reach.is_finite() {
            self.reach.clamp(MIN_REACH, MAX_REACH)
        } else {
            default_reach()
        };
        self
    }
}

fn default_seed() -> u64 {
    1337
}

fn default_world_size() -> i32 {
    DEFAULT_WORLD_SIZE
}

fn default_item_lifetime_ticks() -> u32 {
    DEFAULT_LIFETIME_TICKS
}

fn default_reach() -> f32 {
    DEFAULT_REACH
}
