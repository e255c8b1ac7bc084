// ============================================================
// Layer 4 — Formula Loader
// ============================================================
// Drives one epoch of batches:
//
//   IndexSampler  → index batches for this epoch
//       │
//       ▼
//   SampleSource  → borrowed raw samples
//       │
//       ▼  (rayon, one task per sample)
//   ItemTransform → FormulaItem
//       │
//       ▼  (single-threaded)
//   BatchPacker   → PackedBatch
//
// Transforms share nothing, so they run in parallel. Packing sees
// the whole list at once and runs on the calling thread, in the
// sampler's order, which keeps the size filter deterministic.
//
// A sample that fails to transform fails its batch; the error
// says which sample it was.

use std::sync::Arc;

use rayon::prelude::*;

use crate::data::packer::{BatchPacker, PackedBatch};
use crate::data::transform::ItemTransform;
use crate::domain::error::DataError;
use crate::domain::sample::FormulaItem;
use crate::domain::traits::{IndexSampler, SampleSource};

pub struct FormulaLoader {
    source:    Arc<dyn SampleSource>,
    transform: ItemTransform,
    packer:    BatchPacker,
    sampler:   Box<dyn IndexSampler>,
}

impl FormulaLoader {
    pub fn new(
        source:    Arc<dyn SampleSource>,
        transform: ItemTransform,
        packer:    BatchPacker,
        sampler:   Box<dyn IndexSampler>,
    ) -> Self {
        Self { source, transform, packer, sampler }
    }

    /// Samples in the underlying source.
    pub fn num_samples(&self) -> usize {
        self.source.len()
    }

    /// Batches per epoch.
    pub fn num_batches(&self) -> usize {
        self.sampler.num_batches()
    }

    /// Transform the samples at `indices`, in parallel, keeping order.
    pub fn load_items(&self, indices: &[usize]) -> Result<Vec<FormulaItem>, DataError> {
        indices
            .par_iter()
            .map(|&i| {
                let sample = self.source.sample(i)?;
                self.transform.transform(&sample)
            })
            .collect()
    }

    /// Iterate the packed batches of one epoch.
    pub fn epoch(&self, epoch: u64) -> impl Iterator<Item = Result<PackedBatch, DataError>> + '_ {
        self.sampler
            .batches(epoch)
            .into_iter()
            .map(move |indices| {
                let items = self.load_items(&indices)?;
                Ok(self.packer.pack(&items))
            })
    }
}
