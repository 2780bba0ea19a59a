//! Joint (label, feature) keys and their dense parameter indices.
//!
//! Purpose
//! -------
//! Every trainable weight of the log-linear model belongs to exactly one
//! `(label, feature)` pair. This module names those pairs
//! ([`JointFeatureKey`]) and assigns each observed pair a dense index into
//! the parameter vector ([`JointFeatureEncoder`]).
//!
//! Key behaviors
//! -------------
//! - [`JointFeatureKey::new`] checks both fields against fixed capacity
//!   bounds ([`MAX_LABELS`], [`MAX_FEATURE_ID`]) and reports violations as
//!   [`EncodingError`] values.
//! - [`JointFeatureEncoder::put`] assigns indices `0..N` in first-seen order
//!   and is idempotent.
//! - [`JointFeatureEncoder::resolve`] maps an index back to its key, which
//!   persistence uses to write the reverse mapping.
//!
//! Invariants & assumptions
//! ------------------------
//! - `keys[index]` is the key with parameter index `index`, and
//!   `index_of[keys[index]] == index`.
//! - `len()` equals the number of free parameters of the model.
//! - Label ids live in `0..MAX_LABELS` and feature ids in
//!   `0..=MAX_FEATURE_ID`; a key outside those ranges is never stored.
//!
//! Conventions
//! -----------
//! - The encoder is built once while freezing the sample store and is
//!   read-only afterwards.
use std::collections::HashMap;

use crate::encoding::errors::{EncodingError, EncodingResult};

/// Interned label id.
pub type LabelId = usize;

/// Interned feature-name id.
pub type FeatureId = usize;

/// Maximum number of distinct labels; label ids are `0..=254`.
pub const MAX_LABELS: usize = 255;

/// Largest feature id a joint key can carry (24-bit budget).
pub const MAX_FEATURE_ID: usize = (1 << 24) - 1;

/// Identifier of one `(label, feature)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointFeatureKey {
    label: LabelId,
    feature: FeatureId,
}

impl JointFeatureKey {
    /// Build a key, checking both ids against their capacity bounds.
    ///
    /// # Errors
    /// - [`EncodingError::TooManyLabels`] if `label >= MAX_LABELS`.
    /// - [`EncodingError::FeatureSpaceExhausted`] if `feature > MAX_FEATURE_ID`.
    pub fn new(label: LabelId, feature: FeatureId) -> EncodingResult<Self> {
        if label >= MAX_LABELS {
            return Err(EncodingError::TooManyLabels { limit: MAX_LABELS });
        }
        if feature > MAX_FEATURE_ID {
            return Err(EncodingError::FeatureSpaceExhausted { limit: MAX_FEATURE_ID });
        }
        Ok(Self { label, feature })
    }

    pub fn label(&self) -> LabelId {
        self.label
    }

    pub fn feature(&self) -> FeatureId {
        self.feature
    }
}

/// Dense index assignment for joint keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JointFeatureEncoder {
    index_of: HashMap<JointFeatureKey, usize>,
    keys: Vec<JointFeatureKey>,
}

impl JointFeatureEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an encoder from keys listed in index order.
    ///
    /// # Errors
    /// - [`EncodingError::DuplicateEntry`] if a key repeats.
    pub fn from_keys<I>(keys: I) -> EncodingResult<Self>
    where
        I: IntoIterator<Item = JointFeatureKey>,
    {
        let mut encoder = JointFeatureEncoder::new();
        for key in keys {
            if encoder.index_of.contains_key(&key) {
                return Err(EncodingError::DuplicateEntry {
                    value: format!("({}, {})", key.label, key.feature),
                });
            }
            encoder.insert(key);
        }
        Ok(encoder)
    }

    /// Parameter index of `(label, feature)`, assigning a new one if needed.
    ///
    /// # Errors
    /// Propagates the capacity checks of [`JointFeatureKey::new`].
    pub fn put(&mut self, label: LabelId, feature: FeatureId) -> EncodingResult<usize> {
        let key = JointFeatureKey::new(label, feature)?;
        Ok(self.insert(key))
    }

    /// Parameter index of `(label, feature)`, if that pair has a weight.
    pub fn lookup(&self, label: LabelId, feature: FeatureId) -> Option<usize> {
        self.index_of.get(&JointFeatureKey { label, feature }).copied()
    }

    /// Key that owns parameter `index`.
    ///
    /// # Errors
    /// - [`EncodingError::UnknownParameter`] if `index >= self.len()`.
    pub fn resolve(&self, index: usize) -> EncodingResult<JointFeatureKey> {
        self.keys
            .get(index)
            .copied()
            .ok_or(EncodingError::UnknownParameter { index, len: self.keys.len() })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in parameter-index order.
    pub fn keys(&self) -> &[JointFeatureKey] {
        &self.keys
    }

    fn insert(&mut self, key: JointFeatureKey) -> usize {
        if let Some(&index) = self.index_of.get(&key) {
            return index;
        }
        let index = self.keys.len();
        self.keys.push(key);
        self.index_of.insert(key, index);
        index
    }
}
