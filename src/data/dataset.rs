use std::sync::Arc;

use burn::data::dataset::Dataset;

use crate::data::transform::ItemTransform;
use crate::domain::sample::FormulaItem;
use crate::domain::traits::SampleSource;

/// Burn view over a sample source: every `get` runs the item
/// transform, nothing is cached.
///
/// Burn treats `get(i) == None` as the end of the dataset, so `get`
/// only returns `None` past `len()`. A sample that fails to transform
/// is logged and yields `Some(None)`; `FormulaBatcher` leaves it out
/// of the batch. Use `FormulaLoader` when failures must propagate.
pub struct FormulaDataset {
    source:    Arc<dyn SampleSource>,
    transform: ItemTransform,
}

impl FormulaDataset {
    pub fn new(source: Arc<dyn SampleSource>, transform: ItemTransform) -> Self {
        Self { source, transform }
    }
}

impl Dataset<Option<FormulaItem>> for FormulaDataset {
    fn get(&self, index: usize) -> Option<Option<FormulaItem>> {
        let sample = self.source.sample(index).ok()?;
        match self.transform.transform(&sample) {
            Ok(item) => Some(Some(item)),
            Err(e) => {
                tracing::warn!("Skipping sample {}: {}", index, e);
                Some(None)
            }
        }
    }

    fn len(&self) -> usize {
        self.source.len()
    }
}
