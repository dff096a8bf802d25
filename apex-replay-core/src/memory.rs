//! Prioritized replay memory.
//!
//! A fixed-capacity ring buffer of transition records combined with a
//! sum-tree priority index. The three hot-path operations — insert,
//! priority-weighted sample, priority update — each run in O(log capacity)
//! (O(batch * log capacity) for batched calls), which is what keeps the
//! memory viable at capacities around 10^6 on a training loop.
//!
//! # Key components
//!
//! - [`PrioritizedReplayMemory`]: the memory itself
//! - [`PrioritizedReplayConfig`]: capacity / alpha / seed configuration
//! - [`SampledBatch`]: records, slot handles and importance weights
//! - [`BetaSchedule`]: caller-side annealing of the sampling-correction
//!   exponent
//!
//! # Examples
//!
//! ```
//! use apex_replay_core::{
//!     BetaSchedule, PrioritizedReplayConfig, PrioritizedReplayMemory, TransitionRecord,
//! };
//!
//! let config = PrioritizedReplayConfig::default().capacity(4).alpha(1.0);
//! let mut memory = PrioritizedReplayMemory::build(&config)?;
//! let mut schedule = BetaSchedule::new(0.4, 1.0, 100_000);
//!
//! for i in 0..4u8 {
//!     memory.insert(TransitionRecord::new(vec![i], vec![i], 0.0, vec![i], false))?;
//! }
//!
//! let batch = memory.sample(2, schedule.beta())?;
//! // ... compute losses for the batch ...
//! memory.update_priorities(&batch.indices, &vec![0.25; batch.len()])?;
//! schedule.step();
//! # Ok::<(), anyhow::Error>(())
//! ```

mod base;
mod batch;
mod beta_schedule;
mod config;
mod sum_tree;

pub use base::PrioritizedReplayMemory;
pub use batch::SampledBatch;
pub use beta_schedule::BetaSchedule;
pub use config::PrioritizedReplayConfig;
