// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Builds the train and eval loaders from a DatasetConfig and
// walks them end to end, exactly as a training loop would, but
// only records what the packer produced:
//
//   Step 1: Validate config
//   Step 2: Load vocabulary                (Layer 6 - infra)
//   Step 3: Load train/eval sample stores  (Layer 4 - data)
//   Step 4: Build samplers and loaders     (Layer 4 - data)
//   Step 5: Iterate every batch            (Layer 4 - data)
//   Step 6: Record per-batch stats         (Layer 6 - infra)
//   Step 7: Upload each split's first batch to the CPU backend

use std::sync::Arc;

use anyhow::{Context, Result};
use burn::backend::NdArray;
use serde::{Deserialize, Serialize};

use crate::application::config::DatasetConfig;
use crate::data::{
    batcher::FormulaBatch,
    loader::FormulaLoader,
    packer::BatchPacker,
    sampler::{SequentialSampler, ShardedShuffleSampler},
    store::SampleStore,
    transform::ItemTransform,
};
use crate::domain::traits::IndexSampler;
use crate::infra::{
    metrics::{BatchStats, MetricsLogger},
    vocabulary::Vocabulary,
};

// ─── Loaders ──────────────────────────────────────────────────────────────────
/// The train and eval loaders plus the vocabulary they share.
pub struct Loaders {
    pub vocab: Arc<Vocabulary>,
    pub train: FormulaLoader,
    pub eval:  FormulaLoader,
}

/// Load everything a DatasetConfig points at and wire the loaders.
///
/// Training batches are shuffled per epoch, sharded by rank and
/// drop the last short batch. Evaluation batches keep file order
/// and every sample.
pub fn build_loaders(cfg: &DatasetConfig) -> Result<Loaders> {
    cfg.validate()?;

    let vocab = Arc::new(
        Vocabulary::load(&cfg.vocab_path)
            .with_context(|| format!("Loading vocabulary '{}'", cfg.vocab_path))?,
    );

    tracing::info!("training data, images: {} labels: {}", cfg.train_image_path, cfg.train_label_path);
    tracing::info!("eval data, images: {} labels: {}", cfg.eval_image_path, cfg.eval_label_path);

    let train_store = Arc::new(SampleStore::load(&cfg.train_image_path, &cfg.train_label_path)?);
    let eval_store  = Arc::new(SampleStore::load(&cfg.eval_image_path, &cfg.eval_label_path)?);

    let packer    = BatchPacker::new(cfg.image_width, cfg.image_height);
    let transform = ItemTransform::new(Arc::clone(&vocab));

    let train_sampler = ShardedShuffleSampler::new(
        train_store.len(), cfg.batch_size, cfg.num_replicas, cfg.rank, cfg.seed,
    )?;

    let eval_sampler: Box<dyn IndexSampler> = if cfg.num_replicas == 1 {
        Box::new(SequentialSampler::new(eval_store.len(), cfg.batch_size)?)
    } else {
        Box::new(
            ShardedShuffleSampler::new(eval_store.len(), cfg.batch_size, cfg.num_replicas, cfg.rank, cfg.seed)?
                .with_shuffle(false)
                .with_drop_last(false),
        )
    };

    let train = FormulaLoader::new(train_store, transform.clone(), packer, Box::new(train_sampler));
    let eval  = FormulaLoader::new(eval_store, transform, packer, eval_sampler);

    tracing::info!(
        "train dataset: {} train steps: {} eval dataset: {} eval steps: {}",
        train.num_samples(), train.num_batches(), eval.num_samples(), eval.num_batches(),
    );

    Ok(Loaders { vocab, train, eval })
}

// ─── Summary ──────────────────────────────────────────────────────────────────
/// Totals over every batch of one split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub batches:    usize,
    pub requested:  usize,
    pub accepted:   usize,
    pub max_height: usize,
    pub max_width:  usize,
    pub max_length: usize,
    /// `[N, C, H, W]` of the first batch once uploaded as a tensor
    pub first_batch_dims: Option<[usize; 4]>,
}

impl SplitSummary {
    fn add(&mut self, s: &BatchStats) {
        self.batches    += 1;
        self.requested  += s.requested;
        self.accepted   += s.accepted;
        self.max_height  = self.max_height.max(s.height);
        self.max_width   = self.max_width.max(s.width);
        self.max_length  = self.max_length.max(s.length);
    }

    pub fn dropped(&self) -> usize {
        self.requested - self.accepted
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectReport {
    pub train: SplitSummary,
    pub eval:  SplitSummary,
}

// ─── InspectUseCase ───────────────────────────────────────────────────────────
pub struct InspectUseCase {
    config:      DatasetConfig,
    epochs:      u64,
    metrics_dir: Option<String>,
}

impl InspectUseCase {
    pub fn new(config: DatasetConfig, epochs: u64, metrics_dir: Option<String>) -> Self {
        Self { config, epochs, metrics_dir }
    }

    pub fn execute(&self) -> Result<InspectReport> {
        let loaders = build_loaders(&self.config)?;

        let metrics = match &self.metrics_dir {
            Some(dir) => Some(MetricsLogger::new(dir)?),
            None      => None,
        };

        let mut report = InspectReport::default();

        for epoch in 0..self.epochs {
            for (split, loader, summary) in [
                ("train", &loaders.train, &mut report.train),
                ("eval",  &loaders.eval,  &mut report.eval),
            ] {
                for (index, batch) in loader.epoch(epoch).enumerate() {
                    let packed = batch
                        .with_context(|| format!("{split} epoch {epoch} batch {index}"))?;

                    let stats = BatchStats::from_packed(split, epoch, index, &packed);
                    summary.add(&stats);

                    if summary.first_batch_dims.is_none() {
                        let tensors = FormulaBatch::<NdArray>::from_packed(packed, &Default::default());
                        let dims    = tensors.images.dims();
                        tracing::debug!("{} first batch uploaded: images {:?}", split, dims);
                        summary.first_batch_dims = Some(dims);
                    }
                    if let Some(m) = &metrics {
                        m.log(&stats)?;
                    }
                }
            }

            tracing::info!(
                "Epoch {}: train kept {}/{} items, eval kept {}/{} items",
                epoch,
                report.train.accepted, report.train.requested,
                report.eval.accepted, report.eval.requested,
            );
        }

        if let Some(m) = &metrics {
            tracing::info!("Batch metrics written to '{}'", m.csv_path().display());
        }

        Ok(report)
    }
}
