// ============================================================
// Layer 4 — Index Samplers
// ============================================================
// Decide which sample indices go into which batch. The loader is
// handed a sampler instead of owning a sharding policy, so the
// same loader serves single-process runs and data-parallel ranks.
//
// ShardedShuffleSampler, for R replicas and rank r:
//
//   1. indices 0..len, shuffled with StdRng(seed + epoch)
//   2. padded by wrapping around to a multiple of R
//   3. rank r keeps positions r, r + R, r + 2R, ...
//   4. grouped into batches of batch_size
//      (the last short batch is dropped when drop_last is set)
//
// Every rank sees the same number of samples per epoch, and the
// same (seed, epoch) always gives the same order.
//
// Reference: rand crate documentation (SliceRandom, SeedableRng)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::error::DataError;
use crate::domain::traits::IndexSampler;

// ─── SequentialSampler ────────────────────────────────────────────────────────
/// In-order batches, last partial batch kept.
#[derive(Debug, Clone)]
pub struct SequentialSampler {
    len:        usize,
    batch_size: usize,
}

impl SequentialSampler {
    pub fn new(len: usize, batch_size: usize) -> Result<Self, DataError> {
        if batch_size == 0 {
            return Err(DataError::config("batch_size must be greater than 0"));
        }
        Ok(Self { len, batch_size })
    }
}

impl IndexSampler for SequentialSampler {
    fn batches(&self, _epoch: u64) -> Vec<Vec<usize>> {
        let indices: Vec<usize> = (0..self.len).collect();
        indices.chunks(self.batch_size).map(<[usize]>::to_vec).collect()
    }

    fn num_batches(&self) -> usize {
        self.len.div_ceil(self.batch_size)
    }
}

// ─── ShardedShuffleSampler ────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ShardedShuffleSampler {
    len:          usize,
    batch_size:   usize,
    num_replicas: usize,
    rank:         usize,
    seed:         u64,
    shuffle:      bool,
    drop_last:    bool,
}

impl ShardedShuffleSampler {
    /// Shuffling sampler that drops the last short batch.
    pub fn new(
        len:          usize,
        batch_size:   usize,
        num_replicas: usize,
        rank:         usize,
        seed:         u64,
    ) -> Result<Self, DataError> {
        if batch_size == 0 {
            return Err(DataError::config("batch_size must be greater than 0"));
        }
        if num_replicas == 0 || rank >= num_replicas {
            return Err(DataError::config(format!(
                "rank {rank} is out of range for {num_replicas} replicas"
            )));
        }
        Ok(Self { len, batch_size, num_replicas, rank, seed, shuffle: true, drop_last: true })
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// Samples this rank sees per epoch.
    pub fn num_samples(&self) -> usize {
        self.len.div_ceil(self.num_replicas)
    }

    /// This rank's sample indices for one epoch, before batching.
    pub fn indices(&self, epoch: u64) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.len).collect();

        if self.shuffle {
            // Vary the seed per epoch while staying deterministic
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(epoch));
            indices.shuffle(&mut rng);
        }

        let total = self.num_samples() * self.num_replicas;
        if self.len > 0 {
            let mut i = 0;
            while indices.len() < total {
                indices.push(indices[i % self.len]);
                i += 1;
            }
        }

        indices
            .into_iter()
            .skip(self.rank)
            .step_by(self.num_replicas)
            .collect()
    }
}

impl IndexSampler for ShardedShuffleSampler {
    fn batches(&self, epoch: u64) -> Vec<Vec<usize>> {
        self.indices(epoch)
            .chunks(self.batch_size)
            .filter(|chunk| !self.drop_last || chunk.len() == self.batch_size)
            .map(<[usize]>::to_vec)
            .collect()
    }

    fn num_batches(&self) -> usize {
        if self.drop_last {
            self.num_samples() / self.batch_size
        } else {
            self.num_samples().div_ceil(self.batch_size)
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_sequential_keeps_last_partial_batch() {
        let s = SequentialSampler::new(7, 3).unwrap();
        assert_eq!(s.batches(0), vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
        assert_eq!(s.num_batches(), 3);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(SequentialSampler::new(5, 0).is_err());
        assert!(ShardedShuffleSampler::new(5, 0, 1, 0, 0).is_err());
    }

    #[test]
    fn test_rank_must_be_below_replicas() {
        assert!(matches!(ShardedShuffleSampler::new(5, 1, 2, 2, 0), Err(DataError::Config(_))));
        assert!(ShardedShuffleSampler::new(5, 1, 0, 0, 0).is_err());
    }

    #[test]
    fn test_single_replica_covers_everything() {
        let s = ShardedShuffleSampler::new(10, 4, 1, 0, 42).unwrap();
        let seen: BTreeSet<usize> = s.indices(0).into_iter().collect();
        assert_eq!(seen, (0..10).collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_drop_last() {
        let s = ShardedShuffleSampler::new(10, 4, 1, 0, 42).unwrap();
        let batches = s.batches(0);
        assert_eq!(batches.len(), 2);
        assert_eq!(s.num_batches(), 2);
        assert!(batches.iter().all(|b| b.len() == 4));

        let keep = s.clone().with_drop_last(false);
        assert_eq!(keep.batches(0).len(), 3);
        assert_eq!(keep.num_batches(), 3);
    }

    #[test]
    fn test_same_epoch_same_order_next_epoch_differs() {
        let s = ShardedShuffleSampler::new(50, 50, 1, 0, 7).unwrap();
        assert_eq!(s.batches(3), s.batches(3));
        assert_ne!(s.indices(0), s.indices(1));
    }

    #[test]
    fn test_no_shuffle_is_in_order() {
        let s = ShardedShuffleSampler::new(5, 2, 1, 0, 7).unwrap().with_shuffle(false);
        assert_eq!(s.indices(9), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_ranks_are_disjoint_strides_padded_by_wraparound() {
        // 5 samples over 2 replicas → 3 each, index 0 repeated as padding
        let r0 = ShardedShuffleSampler::new(5, 1, 2, 0, 0).unwrap().with_shuffle(false);
        let r1 = ShardedShuffleSampler::new(5, 1, 2, 1, 0).unwrap().with_shuffle(false);
        assert_eq!(r0.indices(0), vec![0, 2, 4]);
        assert_eq!(r1.indices(0), vec![1, 3, 0]);
        assert_eq!(r0.num_samples(), 3);
    }

    #[test]
    fn test_ranks_share_one_permutation() {
        let ranks: Vec<ShardedShuffleSampler> = (0..3)
            .map(|r| ShardedShuffleSampler::new(9, 3, 3, r, 11).unwrap())
            .collect();
        let all: BTreeSet<usize> = ranks.iter().flat_map(|s| s.indices(2)).collect();
        assert_eq!(all, (0..9).collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_empty_dataset() {
        let s = ShardedShuffleSampler::new(0, 2, 2, 1, 0).unwrap();
        assert!(s.batches(0).is_empty());
        assert_eq!(s.num_batches(), 0);
    }
}
