// ============================================================
// Layer 4 — Formula Batcher
// ============================================================
// Implements Burn's Batcher trait on top of the BatchPacker so a
// FormulaDataset can be fed through Burn's DataLoader. Dataset
// entries that failed to transform arrive as `None` and are left
// out before packing.
//
// The packer does the filtering, padding and masking on the host;
// this module only uploads the four buffers to the device with
// their shapes:
//
//   images      Tensor<B, 4>       [N, C, H, W]
//   image_masks Tensor<B, 4>       [N, 1, H, W]
//   labels      Tensor<B, 3, Int>  [N, L, 4 + k]
//   label_masks Tensor<B, 3>       [N, L, 2]
//
// Reference: Burn Book §4 (Batcher)

use std::sync::Arc;

use burn::{
    data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
    prelude::*,
};

use crate::data::dataset::FormulaDataset;
use crate::data::packer::{BatchPacker, PackedBatch};
use crate::domain::sample::FormulaItem;

// ─── FormulaBatch ─────────────────────────────────────────────────────────────
/// A padded batch of formula samples on a Burn device.
#[derive(Debug, Clone)]
pub struct FormulaBatch<B: Backend> {
    /// Grayscale images, zero padded — shape: [N, C, H, W]
    pub images: Tensor<B, 4>,

    /// 1 over each item's real pixels — shape: [N, 1, H, W]
    pub image_masks: Tensor<B, 4>,

    /// Encoded label rows, zero padded — shape: [N, L, 4 + k]
    pub labels: Tensor<B, 3, Int>,

    /// [.., 0] = real row, [.., 1] = row has a relation — shape: [N, L, 2]
    pub label_masks: Tensor<B, 3>,
}

impl<B: Backend> FormulaBatch<B> {
    /// Upload a host-side batch to `device`.
    pub fn from_packed(packed: PackedBatch, device: &B::Device) -> Self {
        let image_mask_shape = packed.image_mask_shape();
        let label_mask_shape = packed.label_mask_shape();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(packed.images, packed.image_shape), device,
        );
        let image_masks = Tensor::<B, 4>::from_data(
            TensorData::new(packed.image_masks, image_mask_shape), device,
        );
        let labels = Tensor::<B, 3, Int>::from_data(
            TensorData::new(packed.labels, packed.label_shape), device,
        );
        let label_masks = Tensor::<B, 3>::from_data(
            TensorData::new(packed.label_masks, label_mask_shape), device,
        );

        Self { images, image_masks, labels, label_masks }
    }

    pub fn batch_size(&self) -> usize {
        self.images.dims()[0]
    }
}

// ─── FormulaBatcher ───────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct FormulaBatcher<B: Backend> {
    pub device: B::Device,
    pub packer: BatchPacker,
}

impl<B: Backend> FormulaBatcher<B> {
    pub fn new(device: B::Device, packer: BatchPacker) -> Self {
        Self { device, packer }
    }
}

impl<B: Backend> Batcher<Option<FormulaItem>, FormulaBatch<B>> for FormulaBatcher<B> {
    fn batch(&self, items: Vec<Option<FormulaItem>>) -> FormulaBatch<B> {
        let items: Vec<FormulaItem> = items.into_iter().flatten().collect();
        let packed = self.packer.pack(&items);
        FormulaBatch::from_packed(packed, &self.device)
    }
}

/// Burn DataLoader over a FormulaDataset, shuffled with `seed`.
pub fn burn_loader<B: Backend>(
    dataset:    FormulaDataset,
    packer:     BatchPacker,
    batch_size: usize,
    seed:       u64,
    device:     B::Device,
) -> Arc<dyn DataLoader<FormulaBatch<B>>> {
    DataLoaderBuilder::new(FormulaBatcher::<B>::new(device, packer))
        .batch_size(batch_size)
        .shuffle(seed)
        .build(dataset)
}
