#![warn(missing_docs)]
//! Prioritized experience replay memory for off-policy reinforcement learning.
//!
//! This crate provides the single-node replay primitive used by Ape-X style
//! setups: actor processes insert transition records, a learner samples
//! priority-weighted mini-batches with importance-sampling correction
//! weights, then writes refreshed priorities back for the sampled slots.
//! Sharding across processes is N independent instances of this primitive;
//! no cross-shard coordination lives here.

pub mod error;
pub use error::ReplayMemoryError;

mod record;
pub use record::TransitionRecord;

mod compression;
pub use compression::{Lz4Codec, PayloadCodec};

pub mod memory;
pub use memory::{BetaSchedule, PrioritizedReplayConfig, PrioritizedReplayMemory, SampledBatch};
