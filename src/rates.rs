//! Rate Tables
//!
//! A [`RateTable`] holds the single authoritative per-gram rate for each metal at
//! the instant it was assembled. Entries remember whether they came from the
//! live spot feed or from the operator-maintained stored table.

use std::collections::BTreeMap;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::metals::Metal;

/// Where a rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateOrigin {
    /// Fetched from the spot feed within the validity window.
    Live,

    /// Set by an operator in durable storage.
    Stored,
}

impl RateOrigin {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Stored => "stored",
        }
    }
}

/// A per-gram price for one metal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    /// Metal the rate applies to.
    pub metal: Metal,

    /// Price of one gram of the pure metal.
    pub price_per_gram: Decimal,

    /// Source of the price.
    pub origin: RateOrigin,

    /// When the price was fetched or last written.
    pub fetched_at: Timestamp,
}

/// Merged rate table, keyed by metal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    entries: BTreeMap<Metal, RateEntry>,
}

impl RateTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any previous entry for the same metal.
    pub fn insert(&mut self, entry: RateEntry) -> Option<RateEntry> {
        self.entries.insert(entry.metal, entry)
    }

    /// Inserts an entry only when the metal has no entry yet.
    pub fn insert_if_absent(&mut self, entry: RateEntry) {
        self.entries.entry(entry.metal).or_insert(entry);
    }

    /// Looks up the entry for a metal.
    #[must_use]
    pub fn get(&self, metal: Metal) -> Option<&RateEntry> {
        self.entries.get(&metal)
    }

    /// Per-gram price for a metal, when present.
    #[must_use]
    pub fn price_per_gram(&self, metal: Metal) -> Option<Decimal> {
        self.get(metal).map(|entry| entry.price_per_gram)
    }

    /// Iterates entries in metal order.
    pub fn iter(&self) -> impl Iterator<Item = &RateEntry> {
        self.entries.values()
    }

    /// Number of metals with a rate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no metal has a rate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RateEntry> for RateTable {
    fn from_iter<I: IntoIterator<Item = RateEntry>>(iter: I) -> Self {
        let mut table = Self::new();

        for entry in iter {
            table.insert(entry);
        }

        table
    }
}
