// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The loader only sees these traits, so a different storage
// format or a different sharding policy can be plugged in
// without touching the transform or the packer.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::error::DataError;
use crate::domain::sample::RawSample;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Indexed, immutable access to stored samples.
///
/// Implementations:
///   - SampleStore → two JSON mappings loaded at startup
pub trait SampleSource: Send + Sync {
    /// Number of samples available.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the sample at `index`.
    /// Returns a Lookup error if the index is out of range.
    fn sample(&self, index: usize) -> Result<RawSample<'_>, DataError>;
}

// ─── IndexSampler ─────────────────────────────────────────────────────────────
/// Produces the groups of sample indices that form each batch.
///
/// Implementations:
///   - SequentialSampler     → in-order batches for evaluation
///   - ShardedShuffleSampler → per-epoch shuffled, per-rank shards
pub trait IndexSampler: Send + Sync {
    /// Index batches for one epoch. The same epoch always yields
    /// the same batches.
    fn batches(&self, epoch: u64) -> Vec<Vec<usize>>;

    /// Number of batches `batches` yields per epoch.
    fn num_batches(&self) -> usize;
}
