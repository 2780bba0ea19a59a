//! External observations: a label plus binary and real-valued features.
//!
//! An [`Observation`] is the caller-facing training or classification input.
//! Binary features are present-or-absent names (implicit value 1.0);
//! real-valued features carry an explicit value that multiplies the weight.
//! Values are not validated here; the sample store rejects non-finite values
//! at ingestion and the classifier ignores features it has never seen.

/// A labeled (or unlabeled) set of symbolic features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    label: String,
    binary: Vec<String>,
    real: Vec<(String, f64)>,
}

impl Observation {
    /// Start an observation with `label` and no features.
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), binary: Vec::new(), real: Vec::new() }
    }

    /// Observation used only for classification; its label is empty.
    pub fn unlabeled() -> Self {
        Self::default()
    }

    /// Build an observation from already collected parts.
    pub fn from_parts(
        label: impl Into<String>, binary: Vec<String>, real: Vec<(String, f64)>,
    ) -> Self {
        Self { label: label.into(), binary, real }
    }

    /// Add a binary feature.
    pub fn with_feature(mut self, name: impl Into<String>) -> Self {
        self.binary.push(name.into());
        self
    }

    /// Add a real-valued feature.
    pub fn with_real(mut self, name: impl Into<String>, value: f64) -> Self {
        self.real.push((name.into(), value));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn binary_features(&self) -> &[String] {
        &self.binary
    }

    pub fn real_features(&self) -> &[(String, f64)] {
        &self.real
    }

    /// All features as `(name, value)` pairs, binary ones with value 1.0.
    pub fn weighted_features(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.binary
            .iter()
            .map(|name| (name.as_str(), 1.0))
            .chain(self.real.iter().map(|(name, value)| (name.as_str(), *value)))
    }
}
