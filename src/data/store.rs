// ============================================================
// Layer 4 — Sample Store
// ============================================================
// Loads the two serialized mappings that make up a split:
//
//   images file:  { "<id>": { "height": H, "width": W,
//                             "channels": C, "pixels": [...] } }
//   labels file:  { "<id>": [ "<row>", "<row>", ... ] }
//
// Each label row is one edge of the expression's label graph:
//   child_id child_symbol parent_id parent_symbol rel_1 ... rel_k
//
// Samples are indexed by the sorted order of the label ids, so
// index i names the same sample on every run. The store is read
// once at startup and never mutated afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::error::DataError;
use crate::domain::sample::{RawImage, RawSample};
use crate::domain::traits::SampleSource;

#[derive(Debug, Clone)]
pub struct SampleStore {
    images: BTreeMap<String, RawImage>,
    labels: BTreeMap<String, Vec<String>>,
    /// Label ids in index order
    names:  Vec<String>,
}

impl SampleStore {
    /// Load both mappings from disk.
    ///
    /// Any missing or undecodable file, or a label id without a
    /// matching image, is a Config error.
    pub fn load(image_path: impl AsRef<Path>, label_path: impl AsRef<Path>) -> Result<Self, DataError> {
        let images: BTreeMap<String, RawImage>    = read_mapping(image_path.as_ref())?;
        let labels: BTreeMap<String, Vec<String>> = read_mapping(label_path.as_ref())?;

        let store = Self::from_maps(images, labels)?;
        tracing::info!(
            "Loaded {} samples from '{}'",
            store.len(),
            label_path.as_ref().display()
        );
        Ok(store)
    }

    /// Build from in-memory mappings.
    pub fn from_maps(
        images: BTreeMap<String, RawImage>,
        labels: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, DataError> {
        if let Some(missing) = labels.keys().find(|k| !images.contains_key(*k)) {
            return Err(DataError::config(format!("label '{missing}' has no matching image")));
        }

        let unlabelled = images.len().saturating_sub(labels.len());
        if unlabelled > 0 {
            tracing::debug!("{} images have no labels and will be ignored", unlabelled);
        }

        let names = labels.keys().cloned().collect();
        Ok(Self { images, labels, names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The image id at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Result<RawSample<'_>, DataError> {
        let name = self.names.get(index).ok_or_else(|| {
            DataError::lookup(format!("sample index {index} out of range ({} samples)", self.len()))
        })?;

        // Both lookups are guaranteed by from_maps
        let image = self.images.get(name)
            .ok_or_else(|| DataError::lookup(format!("no image for '{name}'")))?;
        let rows = self.labels.get(name)
            .ok_or_else(|| DataError::lookup(format!("no labels for '{name}'")))?;

        Ok(RawSample { name, image, rows })
    }
}

impl SampleSource for SampleStore {
    fn len(&self) -> usize {
        SampleStore::len(self)
    }

    fn sample(&self, index: usize) -> Result<RawSample<'_>, DataError> {
        self.get(index)
    }
}

fn read_mapping<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let bytes = fs::read(path)
        .map_err(|e| DataError::config(format!("cannot read '{}': {e}", path.display())))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| DataError::config(format!("cannot decode '{}': {e}", path.display())))
}
