// ============================================================
// Layer 4 — Item Transform
// ============================================================
// Turns one stored sample into the pair the packer consumes.
//
// Image:
//   1 channel      → used as-is
//   3 channels     → BGR  → gray
//   4 channels     → BGRA → gray (alpha ignored)
//   then every pixel is divided by 255 → [1, H, W] in [0, 1]
//
//   gray = 0.299 R + 0.587 G + 0.114 B, rounded to a byte
//
// Labels:
//   "3 x 1 \frac None below None None None None None"
//        │
//        ▼
//   [3, id(x), 1, id(\frac), 0, 1, 0, 0, 0, 0, 0]
//
// A transform holds no mutable state, so the loader runs many of
// them in parallel over different samples.

use std::sync::Arc;

use crate::domain::error::DataError;
use crate::domain::sample::{
    FormulaItem, ImageTensor, LabelEdge, LabelTensor, RawImage, RawSample, LABEL_PREFIX_COLS,
};
use crate::infra::vocabulary::Vocabulary;

/// Relation field value meaning "this relation is absent".
const NO_RELATION: &str = "None";

#[derive(Debug, Clone)]
pub struct ItemTransform {
    vocab:          Arc<Vocabulary>,
    relation_count: usize,
}

impl ItemTransform {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        let relation_count = vocab.structural_relation_ids().len();
        Self { vocab, relation_count }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Columns of every label tensor this transform produces.
    pub fn label_width(&self) -> usize {
        LABEL_PREFIX_COLS + self.relation_count
    }

    /// Convert a stored sample into an image tensor and a label tensor.
    pub fn transform(&self, sample: &RawSample<'_>) -> Result<FormulaItem, DataError> {
        let image  = self.image_tensor(sample.image).map_err(|e| e.in_sample(sample.name))?;
        let labels = self.label_tensor(sample.rows).map_err(|e| e.in_sample(sample.name))?;
        Ok(FormulaItem::new(image, labels))
    }

    /// Grayscale-normalise an image into `[1, H, W]`.
    pub fn image_tensor(&self, image: &RawImage) -> Result<ImageTensor, DataError> {
        let pixels = image.height * image.width;
        if image.pixels.len() != pixels * image.channels {
            return Err(DataError::shape(format!(
                "image has {} bytes, expected {}x{}x{}",
                image.pixels.len(), image.height, image.width, image.channels
            )));
        }

        let gray: Vec<f32> = match image.channels {
            1 => image.pixels.iter().map(|&p| p as f32 / 255.0).collect(),
            3 | 4 => image
                .pixels
                .chunks_exact(image.channels)
                .map(|bgr| bgr_to_gray(bgr[0], bgr[1], bgr[2]) as f32 / 255.0)
                .collect(),
            n => {
                return Err(DataError::shape(format!(
                    "cannot convert a {n}-channel image to grayscale"
                )))
            }
        };

        ImageTensor::new(1, image.height, image.width, gray)
    }

    /// Parse label rows into edges without encoding symbols.
    pub fn parse_edges<S: AsRef<str>>(&self, rows: &[S]) -> Result<Vec<LabelEdge>, DataError> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| self.parse_row(i, row.as_ref()))
            .collect()
    }

    /// Parse and encode label rows into a `[num_edges, 4 + k]` tensor.
    pub fn label_tensor<S: AsRef<str>>(&self, rows: &[S]) -> Result<LabelTensor, DataError> {
        let edges = self.parse_edges(rows)?;
        let cols  = self.label_width();

        let mut data = Vec::with_capacity(edges.len() * cols);
        for edge in &edges {
            data.push(edge.child_id);
            data.push(self.vocab.id_of(&edge.child_symbol)? as i64);
            data.push(edge.parent_id);
            data.push(self.vocab.id_of(&edge.parent_symbol)? as i64);
            data.extend(edge.struct_flags.iter().map(|&f| f as i64));
        }

        LabelTensor::new(edges.len(), cols, data)
    }

    fn parse_row(&self, index: usize, row: &str) -> Result<LabelEdge, DataError> {
        let fields: Vec<&str> = row.split_whitespace().collect();
        let expected = self.label_width();
        if fields.len() != expected {
            return Err(DataError::parse(format!(
                "row {index} has {} fields, expected {expected}: '{row}'",
                fields.len()
            )));
        }

        let parse_id = |field: &str, what: &str| -> Result<i64, DataError> {
            field.parse::<i64>().map_err(|_| {
                DataError::parse(format!("row {index}: {what} '{field}' is not an integer"))
            })
        };

        Ok(LabelEdge {
            child_id:      parse_id(fields[0], "child id")?,
            child_symbol:  fields[1].to_string(),
            parent_id:     parse_id(fields[2], "parent id")?,
            parent_symbol: fields[3].to_string(),
            struct_flags:  fields[LABEL_PREFIX_COLS..].iter().map(|f| *f != NO_RELATION).collect(),
        })
    }
}

fn bgr_to_gray(b: u8, g: u8, r: u8) -> u8 {
    let y = 0.114 * b as f32 + 0.587 * g as f32 + 0.299 * r as f32;
    y.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::vocabulary::tests::sample_vocab;

    fn transform() -> ItemTransform {
        ItemTransform::new(Arc::new(sample_vocab()))
    }

    #[test]
    fn test_gray_image_is_scaled() {
        let t   = transform();
        let img = RawImage::new(1, 3, 1, vec![0, 51, 255]);
        let out = t.image_tensor(&img).unwrap();
        assert_eq!(out.shape(), [1, 1, 3]);
        assert_eq!(out.data(), &[0.0, 0.2, 1.0]);
    }

    #[test]
    fn test_bgr_image_becomes_single_channel() {
        let t = transform();
        // pure blue, pure green, pure red, white
        let img = RawImage::new(2, 2, 3, vec![
            255, 0, 0,   0, 255, 0,
            0, 0, 255,   255, 255, 255,
        ]);
        let out = t.image_tensor(&img).unwrap();
        assert_eq!(out.shape(), [1, 2, 2]);
        let expected = [29.0 / 255.0, 150.0 / 255.0, 76.0 / 255.0, 1.0];
        for (a, b) in out.data().iter().zip(expected) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn test_bgra_alpha_is_ignored() {
        let t   = transform();
        let img = RawImage::new(1, 1, 4, vec![255, 255, 255, 0]);
        assert_eq!(t.image_tensor(&img).unwrap().data(), &[1.0]);
    }

    #[test]
    fn test_unsupported_channels_rejected() {
        let t   = transform();
        let img = RawImage::new(1, 1, 2, vec![1, 2]);
        assert!(matches!(t.image_tensor(&img), Err(DataError::Shape(_))));
    }

    #[test]
    fn test_short_pixel_buffer_rejected() {
        let t   = transform();
        let img = RawImage::new(2, 2, 1, vec![0; 3]);
        assert!(matches!(t.image_tensor(&img), Err(DataError::Shape(_))));
    }

    #[test]
    fn test_label_tensor_columns() {
        let t    = transform();
        let rows = [
            "0 x -1 <sos> None None None None None None None",
            r"1 2 0 x None None None sup None None None",
            r"2 y 0 x None None None None None None right",
        ];
        let labels = t.label_tensor(&rows).unwrap();
        assert_eq!(labels.rows(), 3);
        assert_eq!(labels.cols(), 11);
        assert_eq!(labels.row(0), &[0, 13, -1, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(labels.row(1), &[1, 15, 0, 13, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(labels.row(2), &[2, 14, 0, 13, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_parse_edges_flags() {
        let t     = transform();
        let edges = t.parse_edges(&["1 2 0 x above None None sup None None None"]).unwrap();
        assert_eq!(edges[0].child_symbol, "2");
        assert_eq!(edges[0].struct_flags, vec![true, false, false, true, false, false, false]);
        assert!(edges[0].has_relation());
    }

    #[test]
    fn test_wrong_field_count_is_parse_error() {
        let t = transform();
        let err = t.label_tensor(&["0 x -1 <sos> None"]).unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn test_non_numeric_id_is_parse_error() {
        let t = transform();
        let err = t.label_tensor(&["a x -1 <sos> None None None None None None None"]).unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn test_unknown_symbol_is_lookup_error() {
        let t = transform();
        let err = t.label_tensor(&[r"0 \alpha -1 <sos> None None None None None None None"]).unwrap_err();
        assert!(matches!(err, DataError::Lookup(_)));
    }

    #[test]
    fn test_no_rows_gives_empty_tensor() {
        let t: ItemTransform = transform();
        let rows: [&str; 0] = [];
        let labels = t.label_tensor(&rows).unwrap();
        assert_eq!(labels.rows(), 0);
        assert_eq!(labels.cols(), 11);
    }

    #[test]
    fn test_transform_names_the_sample_on_error() {
        let t     = transform();
        let image = RawImage::filled(1, 1, 0);
        let rows  = vec!["bad row".to_string()];
        let raw   = RawSample { name: "img_7", image: &image, rows: &rows };
        let err   = t.transform(&raw).unwrap_err();
        assert!(err.to_string().contains("img_7"));
    }
}
