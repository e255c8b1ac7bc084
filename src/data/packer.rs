// ============================================================
// Layer 4 — Batch Packer
// ============================================================
// Combines independently transformed items of different sizes
// into one rectangular, zero-padded batch plus two masks.
//
// Input:  N items, image [C, H_i, W_i], labels [L_i, 4 + k]
// Output: images      [N', C, H, W]      f32, zero padded
//         image_masks [N', 1, H, W]      1 over each item's H_i × W_i
//         labels      [N', L, 4 + k]     i64, zero padded
//         label_masks [N', L, 2]         [.., 0] = real row
//                                        [.., 1] = row has a relation
//
// Size filter (runs first, in input order):
//
//   budget = image_width_limit * image_height_limit
//   max_h = max_w = 0
//   for each item:
//       if W_i * max_w > budget or H_i * max_h > budget → skip
//       else accept and grow max_h, max_w, max_len
//
// The threshold depends on the maxima of the items accepted so
// far, so the outcome depends on input order: a large item can be
// dropped only because an earlier item was large, and a skipped
// item never comes back within the same call. Since the maxima
// start at 0 the first item is always accepted.
//
// Dropping is silent policy, not an error; pack never fails.

use crate::domain::sample::{FormulaItem, LABEL_PREFIX_COLS};

// ─── PackedBatch ──────────────────────────────────────────────────────────────
/// A padded batch held as row-major host buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedBatch {
    /// `[N, C, H, W]`
    pub images:      Vec<f32>,
    /// `[N, 1, H, W]`
    pub image_masks: Vec<f32>,
    /// `[N, L, 4 + k]`
    pub labels:      Vec<i64>,
    /// `[N, L, 2]`
    pub label_masks: Vec<f32>,
    /// `[N, C, H, W]`
    pub image_shape: [usize; 4],
    /// `[N, L, 4 + k]`
    pub label_shape: [usize; 3],
    /// Input positions of the items that were kept, in batch order
    pub accepted:    Vec<usize>,
    /// Number of items handed to the packer
    pub requested:   usize,
}

impl PackedBatch {
    pub fn len(&self) -> usize { self.image_shape[0] }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
    pub fn channels(&self) -> usize { self.image_shape[1] }
    pub fn height(&self) -> usize { self.image_shape[2] }
    pub fn width(&self) -> usize { self.image_shape[3] }
    pub fn max_len(&self) -> usize { self.label_shape[1] }
    pub fn label_width(&self) -> usize { self.label_shape[2] }

    /// `[N, 1, H, W]`
    pub fn image_mask_shape(&self) -> [usize; 4] {
        [self.len(), 1, self.height(), self.width()]
    }

    /// `[N, L, 2]`
    pub fn label_mask_shape(&self) -> [usize; 3] {
        [self.len(), self.max_len(), 2]
    }
}

// ─── BatchPacker ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPacker {
    pub image_width_limit:  usize,
    pub image_height_limit: usize,
}

impl BatchPacker {
    pub fn new(image_width_limit: usize, image_height_limit: usize) -> Self {
        Self { image_width_limit, image_height_limit }
    }

    /// The pixel budget both filter products are compared against.
    pub fn budget(&self) -> usize {
        self.image_width_limit.saturating_mul(self.image_height_limit)
    }

    /// Filter, pad and mask `items` into one batch.
    pub fn pack(&self, items: &[FormulaItem]) -> PackedBatch {
        // Channel count and label width come from the first item,
        // even if it is later dropped, so an all-dropped batch still
        // has a well-formed shape.
        let (channels, cols) = items
            .first()
            .map(|it| (it.image.channels(), it.labels.cols()))
            .unwrap_or((1, LABEL_PREFIX_COLS));

        // ── Step 1: cumulative size filter ────────────────────────────────────
        let budget = self.budget();
        let (mut max_h, mut max_w, mut max_len) = (0usize, 0usize, 0usize);
        let mut accepted = Vec::with_capacity(items.len());

        for (i, item) in items.iter().enumerate() {
            let [c, h, w] = item.image.shape();

            if c != channels || item.labels.cols() != cols {
                tracing::warn!(
                    "Dropping item {}: layout [{}, {}] differs from batch layout [{}, {}]",
                    i, c, item.labels.cols(), channels, cols
                );
                continue;
            }

            // W pairs with max_w and H with max_h; each product is
            // compared against the full area budget. Crossing them
            // (H * max_w, W * max_h) gives a different filter, and
            // test_filter_pairs_width_with_max_width tells the two apart.
            if w.saturating_mul(max_w) > budget || h.saturating_mul(max_h) > budget {
                tracing::debug!(
                    "Dropping item {} ({}x{}): exceeds budget {} at running max {}x{}",
                    i, h, w, budget, max_h, max_w
                );
                continue;
            }

            max_h   = max_h.max(h);
            max_w   = max_w.max(w);
            max_len = max_len.max(item.labels.rows());
            accepted.push(i);
        }

        // ── Step 2: allocate zero-filled buffers ──────────────────────────────
        let n = accepted.len();
        let (hh, ww, ll) = (max_h, max_w, max_len);

        let mut images      = vec![0.0f32; n * channels * hh * ww];
        let mut image_masks = vec![0.0f32; n * hh * ww];
        let mut labels      = vec![0i64; n * ll * cols];
        let mut label_masks = vec![0.0f32; n * ll * 2];

        // ── Step 3: copy each item into its slot ──────────────────────────────
        for (slot, &src) in accepted.iter().enumerate() {
            let item = &items[src];
            let [_, h, w] = item.image.shape();

            for c in 0..channels {
                for y in 0..h {
                    let dst = ((slot * channels + c) * hh + y) * ww;
                    images[dst..dst + w].copy_from_slice(item.image.row(c, y));
                }
            }

            for y in 0..h {
                let dst = (slot * hh + y) * ww;
                image_masks[dst..dst + w].fill(1.0);
            }

            for j in 0..item.labels.rows() {
                let dst = (slot * ll + j) * cols;
                labels[dst..dst + cols].copy_from_slice(item.labels.row(j));

                let m = (slot * ll + j) * 2;
                label_masks[m] = 1.0;
                if item.labels.relation_sum(j) != 0 {
                    label_masks[m + 1] = 1.0;
                }
            }
        }

        if n < items.len() {
            tracing::debug!("Packed {} of {} items into [{}, {}, {}, {}]", n, items.len(), n, channels, hh, ww);
        }

        PackedBatch {
            images,
            image_masks,
            labels,
            label_masks,
            image_shape: [n, channels, hh, ww],
            label_shape: [n, ll, cols],
            accepted,
            requested: items.len(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::sample::{ImageTensor, LabelTensor};

    const COLS: usize = 11;

    /// An item with a constant-valued single-channel image and `rows`
    /// label rows; every odd row carries one relation.
    pub(crate) fn item(h: usize, w: usize, rows: usize) -> FormulaItem {
        let image = ImageTensor::new(1, h, w, vec![0.5; h * w]).unwrap();
        let mut data = Vec::with_capacity(rows * COLS);
        for j in 0..rows {
            let mut row = vec![j as i64 + 1, 13, j as i64, 14, 0, 0, 0, 0, 0, 0, 0];
            if j % 2 == 1 {
                row[7] = 1;
            }
            data.extend(row);
        }
        FormulaItem::new(image, LabelTensor::new(rows, COLS, data).unwrap())
    }

    fn mask_ones(packed: &PackedBatch, i: usize) -> usize {
        let plane = packed.height() * packed.width();
        packed.image_masks[i * plane..(i + 1) * plane].iter().filter(|&&v| v == 1.0).count()
    }

    #[test]
    fn test_shapes_follow_batch_maxima() {
        let packer = BatchPacker::new(1000, 1000);
        let packed = packer.pack(&[item(4, 6, 2), item(7, 3, 5)]);

        assert_eq!(packed.image_shape, [2, 1, 7, 6]);
        assert_eq!(packed.image_mask_shape(), [2, 1, 7, 6]);
        assert_eq!(packed.label_shape, [2, 5, COLS]);
        assert_eq!(packed.label_mask_shape(), [2, 5, 2]);
        assert_eq!(packed.images.len(), 2 * 7 * 6);
        assert_eq!(packed.labels.len(), 2 * 5 * COLS);
        assert_eq!(packed.accepted, vec![0, 1]);
    }

    #[test]
    fn test_image_copied_into_top_left_and_padded() {
        let packer = BatchPacker::new(1000, 1000);
        let packed = packer.pack(&[item(2, 3, 1), item(3, 4, 1)]);
        let (h, w) = (packed.height(), packed.width());

        // item 0 occupies rows 0..2, cols 0..3 of a 3x4 plane
        for y in 0..h {
            for x in 0..w {
                let v = packed.images[y * w + x];
                let inside = y < 2 && x < 3;
                assert_eq!(v, if inside { 0.5 } else { 0.0 }, "pixel ({y},{x})");
                assert_eq!(packed.image_masks[y * w + x], if inside { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_image_mask_counts_match_item_area() {
        let packer = BatchPacker::new(1000, 1000);
        let items  = [item(2, 3, 1), item(5, 1, 1), item(4, 4, 1)];
        let packed = packer.pack(&items);

        for (slot, it) in items.iter().enumerate() {
            assert_eq!(mask_ones(&packed, slot), it.image.height() * it.image.width());
        }
    }

    #[test]
    fn test_no_truncation_for_accepted_items() {
        let packer = BatchPacker::new(1000, 1000);
        let items  = [item(9, 2, 3), item(1, 8, 7), item(5, 5, 0)];
        let packed = packer.pack(&items);

        for &src in &packed.accepted {
            let it = &items[src];
            assert!(it.image.height() <= packed.height());
            assert!(it.image.width() <= packed.width());
            assert!(it.labels.rows() <= packed.max_len());
        }
    }

    #[test]
    fn test_label_rows_and_masks() {
        let packer = BatchPacker::new(1000, 1000);
        let items  = [item(1, 1, 3), item(1, 1, 1)];
        let packed = packer.pack(&items);
        let l      = packed.max_len();
        assert_eq!(l, 3);

        // labels copied row for row, padding rows stay zero
        assert_eq!(&packed.labels[0..COLS], items[0].labels.row(0));
        assert_eq!(&packed.labels[(l + 0) * COLS..(l + 1) * COLS], items[1].labels.row(0));
        assert!(packed.labels[(l + 1) * COLS..].iter().all(|&v| v == 0));

        // column 0: exactly L_i leading ones
        let col0 = |i: usize| -> Vec<f32> { (0..l).map(|j| packed.label_masks[(i * l + j) * 2]).collect() };
        assert_eq!(col0(0), vec![1.0, 1.0, 1.0]);
        assert_eq!(col0(1), vec![1.0, 0.0, 0.0]);

        // column 1: set iff the row's relation flags sum to nonzero
        let col1 = |i: usize| -> Vec<f32> { (0..l).map(|j| packed.label_masks[(i * l + j) * 2 + 1]).collect() };
        assert_eq!(col1(0), vec![0.0, 1.0, 0.0]);
        assert_eq!(col1(1), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_packing_is_deterministic() {
        let packer = BatchPacker::new(150, 100);
        let items  = vec![item(100, 100, 4), item(10, 10, 2), item(200, 200, 6)];
        assert_eq!(packer.pack(&items), packer.pack(&items));
    }

    #[test]
    fn test_filter_is_cumulative_and_order_dependent() {
        // budget = 15_000
        let packer = BatchPacker::new(150, 100);
        let a = item(100, 100, 1);
        let b = item(10, 10, 1);
        let c = item(200, 200, 1);

        // A sets max 100; C: 200 * 100 = 20_000 > budget → dropped
        let abc = packer.pack(&[a.clone(), b.clone(), c.clone()]);
        assert_eq!(abc.accepted, vec![0, 1]);
        assert_eq!(abc.image_shape, [2, 1, 100, 100]);

        // B sets max 10; C: 200 * 10 = 2_000 → kept, max 200;
        // then A: 100 * 200 = 20_000 → dropped
        let bca = packer.pack(&[b.clone(), c.clone(), a.clone()]);
        assert_eq!(bca.accepted, vec![0, 1]);
        assert_eq!(bca.image_shape, [2, 1, 200, 200]);

        // Same pair: whichever comes first survives
        let ac = packer.pack(&[a.clone(), c.clone()]);
        let ca = packer.pack(&[c, a]);
        assert_eq!(ac.accepted, vec![0]);
        assert_eq!(ac.height(), 100);
        assert_eq!(ca.accepted, vec![0]);
        assert_eq!(ca.height(), 200);
    }

    #[test]
    fn test_filter_pairs_width_with_max_width() {
        // budget = 500. After A: max_h = 10, max_w = 100.
        // X: W * max_w = 2 * 100 = 200, H * max_h = 40 * 10 = 400 → kept.
        // Pairing H with max_w instead would give 4_000 and drop X.
        let packer = BatchPacker::new(50, 10);
        let packed = packer.pack(&[item(10, 100, 1), item(40, 2, 1)]);
        assert_eq!(packed.accepted, vec![0, 1]);
        assert_eq!(packed.image_shape, [2, 1, 40, 100]);
    }

    #[test]
    fn test_dropped_item_does_not_raise_maxima() {
        let packer = BatchPacker::new(10, 10);
        // 50 * 20 = 1_000 > 100 → dropped; its 9 rows must not set L
        let packed = packer.pack(&[item(20, 20, 2), item(50, 50, 9), item(3, 3, 1)]);
        assert_eq!(packed.accepted, vec![0, 2]);
        assert_eq!(packed.max_len(), 2);
        assert_eq!(packed.height(), 20);
        assert_eq!(packed.requested, 3);
    }

    #[test]
    fn test_first_item_always_accepted() {
        let packer = BatchPacker::new(1, 1);
        let packed = packer.pack(&[item(500, 500, 1), item(1, 1, 1)]);
        assert_eq!(packed.accepted, vec![0]);
    }

    #[test]
    fn test_empty_input_gives_zero_length_batch() {
        let packer = BatchPacker::new(10, 10);
        let packed = packer.pack(&[]);
        assert!(packed.is_empty());
        assert_eq!(packed.image_shape, [0, 1, 0, 0]);
        assert_eq!(packed.image_mask_shape(), [0, 1, 0, 0]);
        assert_eq!(packed.label_shape, [0, 0, LABEL_PREFIX_COLS]);
        assert_eq!(packed.label_mask_shape(), [0, 0, 2]);
        assert!(packed.images.is_empty() && packed.labels.is_empty());
    }

    #[test]
    fn test_mismatched_channel_item_is_dropped() {
        let packer = BatchPacker::new(1000, 1000);
        let rgb = FormulaItem::new(
            ImageTensor::new(3, 2, 2, vec![0.1; 12]).unwrap(),
            item(1, 1, 1).labels,
        );
        let packed = packer.pack(&[item(2, 2, 1), rgb, item(1, 1, 1)]);
        assert_eq!(packed.accepted, vec![0, 2]);
        assert_eq!(packed.channels(), 1);
    }

    #[test]
    fn test_zero_row_item_has_empty_label_mask() {
        let packer = BatchPacker::new(1000, 1000);
        let packed = packer.pack(&[item(2, 2, 0), item(2, 2, 2)]);
        assert_eq!(packed.max_len(), 2);
        assert_eq!(&packed.label_masks[0..4], &[0.0, 0.0, 0.0, 0.0]);
    }
}
