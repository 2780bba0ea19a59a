//! String interning for labels and feature names.
//!
//! Purpose
//! -------
//! Map symbolic strings to small, dense integer ids (and back) so that the
//! sample store, the evaluator and the classifier can index arrays instead of
//! comparing strings.
//!
//! Key behaviors
//! -------------
//! - [`Interner::put`] assigns ids in first-seen order starting at 0 and is
//!   idempotent for strings that were already seen.
//! - [`Interner::lookup`] and [`Interner::resolve`] provide the two lookup
//!   directions without mutating the table.
//! - [`Interner::truncate`] forgets every string whose id is `>= len`; the
//!   sample store uses it to roll back interning done for an observation that
//!   was rejected halfway through ingestion.
//!
//! Invariants & assumptions
//! ------------------------
//! - `strings[id]` is the string with id `id`, and `ids[strings[id]] == id`
//!   for every assigned id.
//! - There is no removal other than truncation from the end, so ids are
//!   never reused for a different string while both are live.
//!
//! Conventions
//! -----------
//! - The interner is a single-writer structure. Once optimization starts the
//!   owning [`TrainingSet`](crate::model::sample_store::TrainingSet) exposes it
//!   read-only.
use std::collections::HashMap;

use crate::encoding::errors::{EncodingError, EncodingResult};

/// Bidirectional `String ↔ usize` table with sequential ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interner {
    ids: HashMap<String, usize>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an interner from strings listed in id order.
    ///
    /// # Errors
    /// - [`EncodingError::DuplicateEntry`] if the same string occurs twice,
    ///   since the resulting id assignment would be ambiguous.
    pub fn from_strings<I, S>(strings: I) -> EncodingResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut interner = Interner::new();
        for s in strings {
            let s = s.into();
            if interner.ids.contains_key(&s) {
                return Err(EncodingError::DuplicateEntry { value: s });
            }
            interner.put(&s);
        }
        Ok(interner)
    }

    /// Intern `s`, returning its id.
    ///
    /// A string seen before keeps its id; a new string receives `self.len()`.
    pub fn put(&mut self, s: &str) -> usize {
        if let Some(&id) = self.ids.get(s) {
            return id;
        }
        let id = self.strings.len();
        self.strings.push(s.to_owned());
        self.ids.insert(s.to_owned(), id);
        id
    }

    /// Id of `s`, or `None` if it was never interned.
    pub fn lookup(&self, s: &str) -> Option<usize> {
        self.ids.get(s).copied()
    }

    /// String with id `id`.
    ///
    /// # Errors
    /// - [`EncodingError::UnknownId`] if `id >= self.len()`.
    pub fn resolve(&self, id: usize) -> EncodingResult<&str> {
        self.strings
            .get(id)
            .map(String::as_str)
            .ok_or(EncodingError::UnknownId { id, len: self.strings.len() })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Forget every string with an id `>= len`. No-op when `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.strings.len() {
            return;
        }
        for s in self.strings.drain(len..) {
            self.ids.remove(&s);
        }
    }

    /// Interned strings in id order.
    pub fn as_slice(&self) -> &[String] {
        &self.strings
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.strings.iter().map(String::as_str)
    }
}
