//! The replay memory: ring buffer plus priority index.

use super::{batch::SampledBatch, config::PrioritizedReplayConfig, sum_tree::SumTree};
use crate::{PayloadCodec, ReplayMemoryError, TransitionRecord};
use anyhow::Result;
use log::{info, trace};
use rand::{rngs::StdRng, SeedableRng};

/// A fixed-capacity prioritized replay memory.
///
/// Records live in a ring buffer of `capacity` slots; writes always go to
/// `next_write`, and once the memory is full every insert evicts the oldest
/// record unconditionally (FIFO, independent of priority). A sum tree keeps
/// `priority^alpha` per occupied slot so that priority-proportional sampling
/// and point updates run in O(log capacity).
///
/// The memory has two macro-states: *filling* (`size < capacity`, no
/// eviction) and *full* (`size == capacity`, every insert evicts). The
/// transition is one-way.
///
/// The structure is thread-compatible but not thread-safe: a caller sharing
/// it across threads must hold one exclusive lock around each
/// insert/sample/update call. Sharded deployments run one independent
/// instance per shard.
///
/// # Examples
///
/// ```
/// use apex_replay_core::{PrioritizedReplayConfig, PrioritizedReplayMemory, TransitionRecord};
///
/// let config = PrioritizedReplayConfig::default().capacity(1024).alpha(0.6);
/// let mut memory = PrioritizedReplayMemory::build(&config)?;
///
/// let ix = memory.insert(TransitionRecord::new(
///     vec![0u8; 16],
///     vec![0u8; 4],
///     1.0,
///     vec![0u8; 16],
///     false,
/// ))?;
///
/// let batch = memory.sample(1, 0.4)?;
/// memory.update_priorities(&batch.indices, &vec![0.5; batch.len()])?;
/// # assert_eq!(ix, 0);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct PrioritizedReplayMemory {
    /// Maximum number of records.
    capacity: usize,

    /// Next slot to write, wraps modulo capacity.
    next_write: usize,

    /// Current number of valid slots.
    size: usize,

    /// Stored state payloads, compressed if a codec is installed.
    states: Vec<Vec<u8>>,

    /// Stored action payloads.
    actions: Vec<Vec<u8>>,

    /// Stored next-state payloads, compressed if a codec is installed.
    next_states: Vec<Vec<u8>>,

    /// Rewards.
    rewards: Vec<f64>,

    /// Terminal flags.
    terminals: Vec<bool>,

    /// Raw (pre-compression) payload lengths, fixed by the first insert.
    shape: Option<PayloadShape>,

    /// Priority index over occupied slots.
    sum_tree: SumTree,

    /// Random number generator for sampling.
    rng: StdRng,

    /// Optional codec applied to state payloads at the storage boundary.
    codec: Option<Box<dyn PayloadCodec + Send>>,
}

#[derive(Clone, Copy, Debug)]
struct PayloadShape {
    state: usize,
    action: usize,
}

impl PrioritizedReplayMemory {
    /// Builds a memory from the configuration, without payload compression.
    pub fn build(config: &PrioritizedReplayConfig) -> Result<Self> {
        Self::with_codec(config, None)
    }

    /// Builds a memory whose state payloads pass through `codec` before
    /// storage and after retrieval. The stored bytes are treated as opaque.
    pub fn with_codec(
        config: &PrioritizedReplayConfig,
        codec: Option<Box<dyn PayloadCodec + Send>>,
    ) -> Result<Self> {
        if config.capacity == 0 {
            return Err(ReplayMemoryError::InvalidConfig(
                "capacity must be positive".into(),
            ))?;
        }
        if !config.alpha.is_finite() || config.alpha < 0.0 {
            return Err(ReplayMemoryError::InvalidConfig(format!(
                "alpha must be finite and >= 0, got {}",
                config.alpha
            )))?;
        }

        info!(
            "Prioritized replay memory: capacity {}, alpha {}",
            config.capacity, config.alpha
        );

        Ok(Self {
            capacity: config.capacity,
            next_write: 0,
            size: 0,
            states: vec![Vec::new(); config.capacity],
            actions: vec![Vec::new(); config.capacity],
            next_states: vec![Vec::new(); config.capacity],
            rewards: vec![0.0; config.capacity],
            terminals: vec![false; config.capacity],
            shape: None,
            sum_tree: SumTree::new(config.capacity, config.alpha),
            rng: StdRng::seed_from_u64(config.seed),
            codec,
        })
    }

    /// Current number of records.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the memory holds no records.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Maximum number of records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total priority mass, `sum of priority^alpha` over occupied slots.
    pub fn total_priority(&self) -> f64 {
        self.sum_tree.total()
    }

    /// Maximum raw priority observed so far; fresh inserts receive it.
    pub fn max_priority(&self) -> f64 {
        self.sum_tree.max_priority()
    }

    /// Returns a copy of the record currently occupying `ix`.
    ///
    /// Occupied slots are exactly `0..len()`.
    pub fn record(&self, ix: usize) -> Result<TransitionRecord> {
        if ix >= self.size {
            return Err(ReplayMemoryError::InvalidSlot {
                index: ix,
                len: self.size,
            })?;
        }
        Ok(self.read_slot(ix)?)
    }

    /// Inserts one record, returning the slot index it was written to.
    ///
    /// The record receives the maximum priority observed so far (1.0 while
    /// nothing has been observed), so every fresh record is sampled at least
    /// once before its priority is refined by a real loss value. If the slot
    /// was occupied, the old record and its priority are superseded in place.
    pub fn insert(&mut self, record: TransitionRecord) -> Result<usize> {
        let shape = self.fixed_or_prospective_shape(&record);
        check_shape(&record, shape)?;
        Ok(self.insert_unchecked(record, shape))
    }

    /// Inserts records in argument order, returning their slot indices.
    ///
    /// Equivalent to repeated [`insert`](Self::insert); exposed separately
    /// to amortize per-call overhead. Every record's shape is validated
    /// before the first write, so a malformed record aborts the whole batch
    /// with no mutation.
    pub fn insert_batch(&mut self, records: Vec<TransitionRecord>) -> Result<Vec<usize>> {
        let shape = match records.first() {
            Some(first) => self.fixed_or_prospective_shape(first),
            None => return Ok(Vec::new()),
        };
        for record in records.iter() {
            check_shape(record, shape)?;
        }

        let indices = records
            .into_iter()
            .map(|record| self.insert_unchecked(record, shape))
            .collect();
        Ok(indices)
    }

    /// Draws a stratified mini-batch of `batch_size` records together with
    /// importance-sampling correction weights.
    ///
    /// `[0, total_priority)` is split into `batch_size` equal-width segments
    /// with one uniform point per segment; duplicates across segments are
    /// possible when a single slot dominates and are not deduplicated. The
    /// weight of slot `i` is `(P(i) * len)^(-beta)` normalized so the
    /// largest attainable weight in the memory is exactly 1.0.
    ///
    /// The returned indices are opaque handles to pass back unchanged to
    /// [`update_priorities`](Self::update_priorities).
    pub fn sample(&mut self, batch_size: usize, beta: f64) -> Result<SampledBatch> {
        if batch_size == 0 {
            return Err(ReplayMemoryError::InvalidConfig(
                "batch_size must be positive".into(),
            ))?;
        }
        if !beta.is_finite() || beta < 0.0 {
            return Err(ReplayMemoryError::InvalidConfig(format!(
                "beta must be finite and >= 0, got {}",
                beta
            )))?;
        }
        if self.size == 0 {
            return Err(ReplayMemoryError::EmptyMemory)?;
        }
        if batch_size > self.size {
            return Err(ReplayMemoryError::InvalidConfig(format!(
                "batch_size {} exceeds {} stored records",
                batch_size, self.size
            )))?;
        }

        let (indices, weights) = self
            .sum_tree
            .sample(batch_size, beta, self.size, &mut self.rng);
        trace!("sampled slots {:?}", indices);

        let records = indices
            .iter()
            .map(|&ix| self.read_slot(ix))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SampledBatch {
            records,
            indices,
            weights,
        })
    }

    /// Re-applies priorities for slots previously returned by
    /// [`sample`](Self::sample) or [`insert`](Self::insert).
    ///
    /// The two sequences must have equal length and every priority must be
    /// finite and positive; all arguments are validated before the first
    /// tree write, so a failed call mutates nothing.
    ///
    /// If a slot was overwritten since it was sampled (the ring wrapped),
    /// the update applies silently to its current occupant. That stale-write
    /// race is accepted: the fresh occupant already carries max priority, so
    /// the stale loss value neither starves it nor corrupts the tree.
    pub fn update_priorities(&mut self, indices: &[usize], priorities: &[f64]) -> Result<()> {
        if indices.len() != priorities.len() {
            return Err(ReplayMemoryError::LengthMismatch {
                indices: indices.len(),
                priorities: priorities.len(),
            })?;
        }
        for &ix in indices {
            // Occupied slots are exactly 0..size; the ring fills from 0.
            if ix >= self.size {
                return Err(ReplayMemoryError::InvalidSlot {
                    index: ix,
                    len: self.size,
                })?;
            }
        }
        for &p in priorities {
            if !p.is_finite() || p <= 0.0 {
                return Err(ReplayMemoryError::InvalidPriority(p))?;
            }
        }

        for (&ix, &p) in indices.iter().zip(priorities.iter()) {
            self.sum_tree.update(ix, p)?;
        }
        Ok(())
    }

    fn fixed_or_prospective_shape(&self, record: &TransitionRecord) -> PayloadShape {
        self.shape.unwrap_or(PayloadShape {
            state: record.state.len(),
            action: record.action.len(),
        })
    }

    fn insert_unchecked(&mut self, record: TransitionRecord, shape: PayloadShape) -> usize {
        let ix = self.next_write;
        let priority = self.sum_tree.max_priority();

        self.states[ix] = self.store_payload(record.state);
        self.actions[ix] = record.action;
        self.next_states[ix] = self.store_payload(record.next_state);
        self.rewards[ix] = record.reward;
        self.terminals[ix] = record.is_terminal;
        self.shape = Some(shape);

        // max_priority is monotone and starts at 1.0, always a valid priority.
        self.sum_tree.write(ix, priority);

        self.next_write = (self.next_write + 1) % self.capacity;
        if self.size < self.capacity {
            self.size += 1;
        }
        trace!("inserted at slot {} with priority {}", ix, priority);
        ix
    }

    fn store_payload(&self, raw: Vec<u8>) -> Vec<u8> {
        match &self.codec {
            Some(codec) => codec.compress(&raw),
            None => raw,
        }
    }

    fn read_slot(&self, ix: usize) -> Result<TransitionRecord, ReplayMemoryError> {
        let (state, next_state) = match &self.codec {
            Some(codec) => (
                codec.decompress(&self.states[ix])?,
                codec.decompress(&self.next_states[ix])?,
            ),
            None => (self.states[ix].clone(), self.next_states[ix].clone()),
        };

        Ok(TransitionRecord {
            state,
            action: self.actions[ix].clone(),
            reward: self.rewards[ix],
            next_state,
            is_terminal: self.terminals[ix],
        })
    }

    #[cfg(test)]
    pub(crate) fn assert_tree_consistent(&self) {
        self.sum_tree.assert_consistent();
    }
}

impl std::fmt::Debug for PrioritizedReplayMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrioritizedReplayMemory")
            .field("capacity", &self.capacity)
            .field("size", &self.size)
            .field("next_write", &self.next_write)
            .field("total_priority", &self.sum_tree.total())
            .finish()
    }
}

fn check_shape(record: &TransitionRecord, shape: PayloadShape) -> Result<(), ReplayMemoryError> {
    if record.state.len() != shape.state {
        return Err(ReplayMemoryError::MalformedRecord {
            field: "state",
            expected: shape.state,
            got: record.state.len(),
        });
    }
    if record.next_state.len() != shape.state {
        return Err(ReplayMemoryError::MalformedRecord {
            field: "next_state",
            expected: shape.state,
            got: record.next_state.len(),
        });
    }
    if record.action.len() != shape.action {
        return Err(ReplayMemoryError::MalformedRecord {
            field: "action",
            expected: shape.action,
            got: record.action.len(),
        });
    }
    Ok(())
}
