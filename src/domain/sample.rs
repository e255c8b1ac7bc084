// ============================================================
// Layer 3 — Sample Types
// ============================================================
// A sample moves through three shapes on its way to a batch:
//
//   RawSample    — what the store holds: u8 pixels + text rows
//       │
//       ▼
//   LabelEdge    — one parsed row of the label graph
//       │
//       ▼
//   FormulaItem  — normalised image tensor + encoded label tensor
//
// The tensors here are plain row-major buffers with an explicit
// shape, so this layer stays free of any Burn backend.

use serde::{Deserialize, Serialize};

use crate::domain::error::DataError;

/// Number of leading label columns before the relation flags:
/// child id, child symbol id, parent id, parent symbol id.
pub const LABEL_PREFIX_COLS: usize = 4;

// ─── RawImage ─────────────────────────────────────────────────────────────────
/// An image exactly as stored: height × width × channels bytes,
/// interleaved (HWC). Three- and four-channel images use BGR(A) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImage {
    pub height:   usize,
    pub width:    usize,
    #[serde(default = "default_channels")]
    pub channels: usize,
    pub pixels:   Vec<u8>,
}

fn default_channels() -> usize {
    1
}

impl RawImage {
    pub fn new(height: usize, width: usize, channels: usize, pixels: Vec<u8>) -> Self {
        Self { height, width, channels, pixels }
    }

    /// Single-channel image filled with one value.
    pub fn filled(height: usize, width: usize, value: u8) -> Self {
        Self::new(height, width, 1, vec![value; height * width])
    }
}

// ─── RawSample ────────────────────────────────────────────────────────────────
/// A borrowed view of one stored sample.
#[derive(Debug, Clone, Copy)]
pub struct RawSample<'a> {
    /// The image id shared by the image and label mappings
    pub name:  &'a str,
    pub image: &'a RawImage,
    /// Whitespace-delimited label rows, one edge each
    pub rows:  &'a [String],
}

// ─── LabelEdge ────────────────────────────────────────────────────────────────
/// One row of a label graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEdge {
    pub child_id:      i64,
    pub child_symbol:  String,
    pub parent_id:     i64,
    pub parent_symbol: String,
    /// One flag per structural relation; true when the field is not `None`
    pub struct_flags:  Vec<bool>,
}

impl LabelEdge {
    /// True if this edge carries at least one structural relation.
    pub fn has_relation(&self) -> bool {
        self.struct_flags.iter().any(|&f| f)
    }
}

// ─── ImageTensor ──────────────────────────────────────────────────────────────
/// A `[C, H, W]` f32 image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    channels: usize,
    height:   usize,
    width:    usize,
    data:     Vec<f32>,
}

impl ImageTensor {
    pub fn new(channels: usize, height: usize, width: usize, data: Vec<f32>) -> Result<Self, DataError> {
        if data.len() != channels * height * width {
            return Err(DataError::shape(format!(
                "image buffer has {} values, expected {}x{}x{}",
                data.len(), channels, height, width
            )));
        }
        Ok(Self { channels, height, width, data })
    }

    pub fn channels(&self) -> usize { self.channels }
    pub fn height(&self) -> usize { self.height }
    pub fn width(&self) -> usize { self.width }
    pub fn data(&self) -> &[f32] { &self.data }

    /// `[C, H, W]`
    pub fn shape(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }

    /// Row `y` of channel `c`.
    pub fn row(&self, c: usize, y: usize) -> &[f32] {
        let start = (c * self.height + y) * self.width;
        &self.data[start..start + self.width]
    }
}

// ─── LabelTensor ──────────────────────────────────────────────────────────────
/// A `[L, 4 + k]` integer tensor, one row per label edge:
/// `[child_id, child_symbol_id, parent_id, parent_symbol_id, flag_1..flag_k]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTensor {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl LabelTensor {
    pub fn new(rows: usize, cols: usize, data: Vec<i64>) -> Result<Self, DataError> {
        if cols < LABEL_PREFIX_COLS {
            return Err(DataError::shape(format!(
                "label tensor needs at least {LABEL_PREFIX_COLS} columns, got {cols}"
            )));
        }
        if data.len() != rows * cols {
            return Err(DataError::shape(format!(
                "label buffer has {} values, expected {}x{}",
                data.len(), rows, cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn data(&self) -> &[i64] { &self.data }

    pub fn row(&self, j: usize) -> &[i64] {
        &self.data[j * self.cols..(j + 1) * self.cols]
    }

    /// Sum of the relation-flag columns of row `j`.
    pub fn relation_sum(&self, j: usize) -> i64 {
        self.row(j)[LABEL_PREFIX_COLS..].iter().sum()
    }
}

// ─── FormulaItem ──────────────────────────────────────────────────────────────
/// One transformed sample: what the Batch Packer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaItem {
    pub image:  ImageTensor,
    pub labels: LabelTensor,
}

impl FormulaItem {
    pub fn new(image: ImageTensor, labels: LabelTensor) -> Self {
        Self { image, labels }
    }
}
