//! Configuration of the replay memory.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`PrioritizedReplayMemory`](super::PrioritizedReplayMemory).
///
/// `capacity` and `alpha` are fixed for the lifetime of the memory; `beta` is
/// not configured here because it is supplied per sample call.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PrioritizedReplayConfig {
    /// Maximum number of records. Once reached, every insert evicts the
    /// oldest record (FIFO, independent of priority).
    pub capacity: usize,

    /// Prioritization exponent. 0 gives uniform sampling, 1 sampling fully
    /// proportional to priority.
    pub alpha: f64,

    /// Seed of the random number generator used for sampling.
    pub seed: u64,
}

impl Default for PrioritizedReplayConfig {
    /// Default configuration: `capacity = 10000`, `alpha = 0.6`, `seed = 42`.
    fn default() -> Self {
        Self {
            capacity: 10000,
            alpha: 0.6,
            seed: 42,
        }
    }
}

impl PrioritizedReplayConfig {
    /// Sets the capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the prioritization exponent.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let c = serde_yaml::from_reader(rdr)?;
        Ok(c)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
