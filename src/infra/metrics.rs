// ============================================================
// Layer 6 — Batch Metrics Logger
// ============================================================
// Records what the Batch Packer did with every batch to a CSV
// file, so the effect of the pixel budget can be inspected after
// a run.
//
// Columns recorded per batch:
//   - split:     "train" or "eval"
//   - epoch:     epoch the batch belongs to
//   - batch:     position of the batch within the epoch
//   - requested: items handed to the packer
//   - accepted:  items that survived the size filter
//   - height, width, length: padded batch dimensions
//
// Example CSV output:
//   split,epoch,batch,requested,accepted,height,width,length
//   train,0,0,8,8,120,640,23
//   train,0,1,8,7,96,1100,31
//
// Output file: <dir>/batch_metrics.csv

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::data::packer::PackedBatch;

/// One row of packing statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub split:     String,
    pub epoch:     u64,
    pub batch:     usize,
    pub requested: usize,
    pub accepted:  usize,
    pub height:    usize,
    pub width:     usize,
    pub length:    usize,
}

impl BatchStats {
    pub fn from_packed(split: impl Into<String>, epoch: u64, batch: usize, packed: &PackedBatch) -> Self {
        Self {
            split:     split.into(),
            epoch,
            batch,
            requested: packed.requested,
            accepted:  packed.len(),
            height:    packed.height(),
            width:     packed.width(),
            length:    packed.max_len(),
        }
    }

    /// Items the packer left out of this batch.
    pub fn dropped(&self) -> usize {
        self.requested.saturating_sub(self.accepted)
    }
}

/// Appends batch statistics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory if needed and write the header when
    /// the file is new. Existing files are appended to.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("batch_metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "split,epoch,batch,requested,accepted,height,width,length")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, s: &BatchStats) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{},{},{},{},{},{}",
            s.split, s.epoch, s.batch, s.requested, s.accepted, s.height, s.width, s.length,
        )?;

        if s.dropped() > 0 {
            tracing::debug!(
                "{} batch {}: dropped {} of {} items",
                s.split, s.batch, s.dropped(), s.requested
            );
        }

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
