//! Batches produced by sampling.

use crate::TransitionRecord;

/// A sampled mini-batch.
///
/// `indices` are opaque slot handles: pass them back unchanged to
/// [`update_priorities`](super::PrioritizedReplayMemory::update_priorities)
/// once new priorities are known. All three vectors share one order.
#[derive(Debug, Clone)]
pub struct SampledBatch {
    /// Sampled records, payloads decompressed.
    pub records: Vec<TransitionRecord>,

    /// Slot handles of the sampled records.
    pub indices: Vec<usize>,

    /// Importance-sampling correction weights, normalized so the largest
    /// attainable weight in the memory is exactly 1.0.
    pub weights: Vec<f64>,
}

impl SampledBatch {
    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
