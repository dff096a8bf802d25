//! Sum tree for prioritized sampling.
//!
//! Array-backed complete binary tree of `2 * capacity` nodes: the root lives
//! at index 1, the leaf for slot `i` at `capacity + i`, and for every
//! internal node `k`, `tree[k] == tree[2k] + tree[2k + 1]`. Leaves hold
//! `priority^alpha`; the root therefore holds the total priority mass, and a
//! root-to-leaf descent resolves a cumulative weight to a slot in
//! O(log capacity).

use crate::ReplayMemoryError;
use rand::{rngs::StdRng, Rng};
use segment_tree::{ops::MinIgnoreNaN, SegmentPoint};

pub(crate) struct SumTree {
    alpha: f64,
    capacity: usize,

    /// Node array; index 0 is unused.
    tree: Vec<f64>,

    /// Minimum of `priority^alpha` over occupied slots. Unoccupied slots
    /// hold `f64::MAX` so they never win the query.
    min_tree: SegmentPoint<f64, MinIgnoreNaN>,

    /// Running maximum of raw priorities observed since construction.
    /// Monotone; fresh inserts use it as their default priority.
    max_priority: f64,
}

impl SumTree {
    pub fn new(capacity: usize, alpha: f64) -> Self {
        Self {
            alpha,
            capacity,
            tree: vec![0f64; 2 * capacity],
            min_tree: SegmentPoint::build(vec![f64::MAX; capacity], MinIgnoreNaN),
            max_priority: 1.0,
        }
    }

    /// Total priority mass (the root sum). Zero iff no slot is occupied.
    pub fn total(&self) -> f64 {
        self.tree[1]
    }

    /// Maximum raw priority observed so far; 1.0 before any update.
    pub fn max_priority(&self) -> f64 {
        self.max_priority
    }

    /// Minimum `priority^alpha` over occupied slots.
    pub fn min_powered(&self) -> f64 {
        self.min_tree.query(0, self.capacity)
    }

    /// Sets the priority of slot `ix` after validating it, superseding any
    /// previous leaf value.
    pub fn update(&mut self, ix: usize, priority: f64) -> Result<(), ReplayMemoryError> {
        if !priority.is_finite() || priority <= 0.0 {
            return Err(ReplayMemoryError::InvalidPriority(priority));
        }
        self.write(ix, priority);
        Ok(())
    }

    /// Writes a priority known to be finite and positive to the leaf of
    /// slot `ix` and propagates the delta through all ancestor sums.
    ///
    /// Single write primitive: inserts, overwrites on eviction and priority
    /// refinements all go through here.
    pub(crate) fn write(&mut self, ix: usize, priority: f64) {
        debug_assert!(ix < self.capacity);
        let powered = priority.powf(self.alpha);
        self.min_tree.modify(ix, powered);
        if priority > self.max_priority {
            self.max_priority = priority;
        }

        let leaf = self.capacity + ix;
        let delta = powered - self.tree[leaf];
        self.tree[leaf] = powered;
        let mut k = leaf / 2;
        while k > 0 {
            self.tree[k] += delta;
            k /= 2;
        }
    }

    /// Resolves a cumulative weight `x` in `[0, total)` to a slot index.
    ///
    /// Descends left when `x < left_sum`, otherwise subtracts the left sum
    /// and descends right. An empty right subtree forces a left turn, which
    /// also keeps floating-point overshoot of `x` inside occupied leaves.
    pub fn get(&self, x: f64) -> usize {
        let mut x = x;
        let mut k = 1;
        while k < self.capacity {
            let left = 2 * k;
            if x < self.tree[left] || self.tree[left + 1] == 0.0 {
                k = left;
            } else {
                x -= self.tree[left];
                k = left + 1;
            }
        }
        k - self.capacity
    }

    /// Stratified batch draw with normalized importance-sampling weights.
    ///
    /// `[0, total)` is split into `batch_size` equal segments with one
    /// uniform point drawn per segment. `n` is the number of occupied slots.
    /// The weight of slot `i` is $(P(i) \cdot n)^{-\beta}$, normalized by the
    /// largest weight any occupied slot could attain, so the minimum-priority
    /// slot weighs exactly 1.0.
    pub fn sample(
        &self,
        batch_size: usize,
        beta: f64,
        n: usize,
        rng: &mut StdRng,
    ) -> (Vec<usize>, Vec<f64>) {
        let total = self.total();
        let segment = total / batch_size as f64;
        let indices = (0..batch_size)
            .map(|k| self.get((k as f64 + rng.gen::<f64>()) * segment))
            .collect::<Vec<_>>();

        let max_weight = (self.min_powered() / total * n as f64).powf(-beta);
        let weights = indices
            .iter()
            .map(|&ix| self.tree[self.capacity + ix] / total)
            .map(|prob| (prob * n as f64).powf(-beta) / max_weight)
            .collect::<Vec<_>>();

        (indices, weights)
    }

    #[cfg(test)]
    pub fn leaf(&self, ix: usize) -> f64 {
        self.tree[self.capacity + ix]
    }

    #[cfg(test)]
    pub fn assert_consistent(&self) {
        for k in 1..self.capacity {
            let sum = self.tree[2 * k] + self.tree[2 * k + 1];
            assert!(
                (self.tree[k] - sum).abs() <= 1e-9 * self.tree[k].abs().max(1.0),
                "node {} holds {} but children sum to {}",
                k,
                self.tree[k],
                sum
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SumTree;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_get_resolves_cumulative_ranges() {
        let data = vec![0.5f64, 0.2, 0.8, 0.3, 1.1, 2.5, 3.9];
        let mut tree = SumTree::new(8, 1.0);
        for (ix, &p) in data.iter().enumerate() {
            tree.update(ix, p).unwrap();
        }
        tree.assert_consistent();
        assert!((tree.total() - 9.3).abs() < 1e-12);

        // Cumulative bounds: [0, 0.5) -> 0, [0.5, 0.7) -> 1, [0.7, 1.5) -> 2, ...
        assert_eq!(tree.get(0.0), 0);
        assert_eq!(tree.get(0.49), 0);
        assert_eq!(tree.get(0.5), 1);
        assert_eq!(tree.get(0.69), 1);
        assert_eq!(tree.get(0.7), 2);
        assert_eq!(tree.get(1.5), 3);
        assert_eq!(tree.get(1.8), 4);
        assert_eq!(tree.get(2.9), 5);
        assert_eq!(tree.get(5.4), 6);
        assert_eq!(tree.get(9.2999), 6);
    }

    #[test]
    fn test_update_propagates_delta() {
        let mut tree = SumTree::new(4, 1.0);
        for ix in 0..4 {
            tree.update(ix, 1.0).unwrap();
        }
        assert!((tree.total() - 4.0).abs() < 1e-12);

        tree.update(2, 10.0).unwrap();
        tree.assert_consistent();
        assert!((tree.total() - 13.0).abs() < 1e-12);
        assert!((tree.max_priority() - 10.0).abs() < 1e-12);
        assert!((tree.min_powered() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_alpha_powers_leaves() {
        let mut tree = SumTree::new(2, 0.5);
        tree.update(0, 4.0).unwrap();
        tree.update(1, 9.0).unwrap();
        assert!((tree.total() - 5.0).abs() < 1e-12);
        assert!((tree.leaf(0) - 2.0).abs() < 1e-12);
        assert!((tree.min_powered() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_nonpositive_priority() {
        let mut tree = SumTree::new(4, 1.0);
        assert!(tree.update(0, 0.0).is_err());
        assert!(tree.update(0, -1.0).is_err());
        assert!(tree.update(0, f64::NAN).is_err());
        assert_eq!(tree.total(), 0.0);
    }

    #[test]
    fn test_capacity_one() {
        let mut tree = SumTree::new(1, 1.0);
        tree.update(0, 2.5).unwrap();
        assert!((tree.total() - 2.5).abs() < 1e-12);
        assert_eq!(tree.get(1.3), 0);
    }

    #[test]
    fn test_sampling_frequency_tracks_priorities() {
        let data = vec![0.5f64, 0.2, 0.8, 0.3, 1.1, 2.5, 3.9];
        let mut tree = SumTree::new(8, 1.0);
        for (ix, &p) in data.iter().enumerate() {
            tree.update(ix, p).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(42);
        let n_draws = 100_000;
        let (ixs, ws) = tree.sample(n_draws, 0.0, data.len(), &mut rng);
        assert!(ixs.iter().all(|&ix| ix < data.len()));
        assert!(ws.iter().all(|&w| (w - 1.0).abs() < 1e-12));

        for (ix, &p) in data.iter().enumerate() {
            let expected = p / tree.total();
            let observed =
                ixs.iter().filter(|&&e| e == ix).count() as f64 / n_draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "slot {}: observed {} expected {}",
                ix,
                observed,
                expected
            );
        }
    }
}
