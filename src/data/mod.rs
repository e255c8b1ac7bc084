// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from serialized sample files to padded batches.
//
//   images.json + labels.json
//       │
//       ▼
//   SampleStore       → immutable id-ordered samples
//       │
//       ▼
//   IndexSampler      → which indices form each batch
//       │
//       ▼
//   ItemTransform     → gray [1,H,W] image + encoded label rows
//       │
//       ▼
//   BatchPacker       → size filter, zero padding, masks
//       │
//       ▼
//   FormulaLoader / FormulaBatcher → batches for the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Loads the image and label mappings
pub mod store;

/// Per-sample image and label conversion
pub mod transform;

/// Size filter, padding and masks
pub mod packer;

/// Sequential and sharded-shuffle index samplers
pub mod sampler;

/// Sampler-driven epoch iteration with parallel transforms
pub mod loader;

/// Implements Burn's Dataset trait over a sample source
pub mod dataset;

/// Implements Burn's Batcher trait on top of the packer
pub mod batcher;
