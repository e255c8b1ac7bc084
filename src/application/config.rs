// ============================================================
// Layer 2 — Dataset Configuration
// ============================================================
// Every knob the data pipeline reads. Serialisable so a run can
// be described by a JSON file instead of a long command line.

use serde::{Deserialize, Serialize};

use crate::domain::error::DataError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub train_image_path: String,
    pub train_label_path: String,
    pub eval_image_path:  String,
    pub eval_label_path:  String,
    pub vocab_path:       String,
    /// Width factor of the per-batch pixel budget
    pub image_width:      usize,
    /// Height factor of the per-batch pixel budget
    pub image_height:     usize,
    pub batch_size:       usize,
    /// Base seed for the per-epoch training shuffle
    #[serde(default)]
    pub seed:             u64,
    /// Number of data-parallel replicas sharing the training set
    #[serde(default = "default_replicas")]
    pub num_replicas:     usize,
    /// This process's replica index
    #[serde(default)]
    pub rank:             usize,
}

fn default_replicas() -> usize {
    1
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            train_image_path: "data/train_images.json".to_string(),
            train_label_path: "data/train_labels.json".to_string(),
            eval_image_path:  "data/eval_images.json".to_string(),
            eval_label_path:  "data/eval_labels.json".to_string(),
            vocab_path:       "data/dictionary.txt".to_string(),
            image_width:      1600,
            image_height:     320,
            batch_size:       8,
            seed:             0,
            num_replicas:     1,
            rank:             0,
        }
    }
}

impl DatasetConfig {
    /// Reject settings the loaders cannot run with.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.batch_size == 0 {
            return Err(DataError::config("batch_size must be greater than 0"));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(DataError::config(format!(
                "image budget {}x{} must be non-zero",
                self.image_width, self.image_height
            )));
        }
        if self.num_replicas == 0 || self.rank >= self.num_replicas {
            return Err(DataError::config(format!(
                "rank {} is out of range for {} replicas",
                self.rank, self.num_replicas
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DatasetConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let cfg = DatasetConfig { batch_size: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(DataError::Config(_))));
    }

    #[test]
    fn test_rank_out_of_range_rejected() {
        let cfg = DatasetConfig { num_replicas: 2, rank: 2, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_optional_fields_default_when_absent() {
        let json = r#"{
            "train_image_path": "a", "train_label_path": "b",
            "eval_image_path": "c", "eval_label_path": "d",
            "vocab_path": "e", "image_width": 10, "image_height": 10,
            "batch_size": 2
        }"#;
        let cfg: DatasetConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.num_replicas, 1);
        assert_eq!(cfg.rank, 0);
        assert_eq!(cfg.seed, 0);
    }
}
