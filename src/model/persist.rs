//! Model persistence: versioned JSON snapshots of a trained classifier.
//!
//! Purpose
//! -------
//! Save a [`Classifier`] and load it back with identical behavior.
//!
//! Key behaviors
//! -------------
//! - The snapshot holds the label interner contents, the feature interner
//!   contents, the encoder's reverse mapping `index → (label id, feature id)`
//!   and the weights, each in id order.
//! - Loading checks the header first, then the body:
//!   - a missing or foreign `format` tag, or an unsupported `version`, is
//!     [`ModelError::UnknownModelFile`];
//!   - malformed JSON, missing fields, duplicate entries or out-of-range ids
//!     are [`ModelError::CorruptModelFile`];
//!   - a weight count that disagrees with the mapping is
//!     [`ModelError::DimensionMismatch`].
//! - The reference model is not part of the snapshot; re-attach it with
//!   [`Classifier::with_reference`] after loading.
//!
//! Conventions
//! -----------
//! - JSON via `serde_json`, pretty-printed on save. Weights are written in
//!   shortest round-trip form and parsed exactly (`float_roundtrip`), so a
//!   reloaded classifier has bit-identical weights.
//! - Reader/writer failures surface as [`ModelError::Io`].
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    encoding::{FeatureId, Interner, JointFeatureEncoder, JointFeatureKey, LabelId},
    model::{
        classifier::Classifier,
        errors::{ModelError, ModelResult},
    },
    optimization::loglik_optimizer::Theta,
};

/// Format tag written into every snapshot.
pub const MODEL_FORMAT: &str = "rust_maxent.classifier";

/// Current snapshot version.
pub const MODEL_VERSION: u32 = 1;

/// On-disk layout of a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub format: String,
    pub version: u32,
    pub labels: Vec<String>,
    pub features: Vec<String>,
    pub parameters: Vec<(LabelId, FeatureId)>,
    pub weights: Vec<f64>,
}

impl ModelSnapshot {
    pub fn of(classifier: &Classifier) -> Self {
        Self {
            format: MODEL_FORMAT.to_string(),
            version: MODEL_VERSION,
            labels: classifier.labels().to_vec(),
            features: classifier.features().as_slice().to_vec(),
            parameters: classifier.encoder().keys().iter().map(|k| (k.label(), k.feature())).collect(),
            weights: classifier.weights().to_vec(),
        }
    }

    /// Parse a snapshot, checking the header before the body.
    pub fn from_json(value: Value) -> ModelResult<Self> {
        match value.get("format").and_then(Value::as_str) {
            Some(MODEL_FORMAT) => {}
            Some(other) => {
                return Err(ModelError::UnknownModelFile {
                    reason: format!("format tag '{other}'"),
                });
            }
            None => {
                return Err(ModelError::UnknownModelFile { reason: "missing format tag".to_string() });
            }
        }
        match value.get("version").and_then(Value::as_u64) {
            Some(v) if v == u64::from(MODEL_VERSION) => {}
            Some(v) => {
                return Err(ModelError::UnknownModelFile { reason: format!("version {v}") });
            }
            None => {
                return Err(ModelError::UnknownModelFile { reason: "missing version".to_string() });
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Rebuild the classifier described by this snapshot.
    pub fn into_classifier(self) -> ModelResult<Classifier> {
        let labels = Interner::from_strings(self.labels)?;
        let features = Interner::from_strings(self.features)?;
        let keys = self
            .parameters
            .iter()
            .map(|&(label, feature)| {
                JointFeatureKey::new(label, feature).map_err(|err| ModelError::CorruptModelFile {
                    reason: err.to_string(),
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;
        let encoder = JointFeatureEncoder::from_keys(keys)?;
        Classifier::from_parts(labels, features, encoder, Theta::from(self.weights))
    }
}

impl Classifier {
    /// Write this classifier as a JSON snapshot.
    ///
    /// # Errors
    /// - [`ModelError::Io`] if the writer fails.
    pub fn save<W: Write>(&self, writer: W) -> ModelResult<()> {
        serde_json::to_writer_pretty(writer, &ModelSnapshot::of(self))?;
        Ok(())
    }

    /// Read a classifier written by [`Classifier::save`].
    ///
    /// # Errors
    /// - `UnknownModelFile`, `CorruptModelFile`, `DimensionMismatch` or `Io`
    ///   as described in the module docs.
    pub fn load<R: Read>(reader: R) -> ModelResult<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        ModelSnapshot::from_json(value)?.into_classifier()
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> ModelResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        Self::load(BufReader::new(File::open(path)?))
    }
}
