//! Object catalog: the immutable, slot-indexed list of compact records.
//!
//! The catalog is loaded once at startup and never mutated afterwards. Every
//! downstream container (propagator handles, position buffers, instance
//! transforms) is aligned to the catalog by slot index, so the catalog is
//! also the authority on the object count `N`.
//!
//! # Example
//!
//! ```ignore
//! use orbitlayer::catalog::Catalog;
//!
//! let catalog = Catalog::load("minified.json")?;
//! if let Some(slot) = catalog.search_by_id_or_name("botsat") {
//!     println!("{:?}", catalog.lookup(slot));
//! }
//! ```

mod record;

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

pub use record::CompactRecord;

/// Minutes in one day.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog content is not a JSON array of compact records.
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Slot-indexed collection of compact records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CompactRecord>,
}

impl Catalog {
    /// Create a catalog from records already in slot order.
    pub fn from_records(records: Vec<CompactRecord>) -> Self {
        Self { records }
    }

    /// Parse a catalog from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<CompactRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            objects = catalog.len(),
            "Loaded object catalog"
        );
        Ok(catalog)
    }

    /// Number of objects (`N`).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in slot order.
    pub fn records(&self) -> &[CompactRecord] {
        &self.records
    }

    /// Bounds-checked access by slot. Out of range yields `None`.
    pub fn lookup(&self, slot: usize) -> Option<&CompactRecord> {
        self.records.get(slot)
    }

    /// Find the first slot whose id equals `query` or whose name contains it.
    ///
    /// The id comparison is exact on the stringified id; the name comparison
    /// is a case-insensitive substring match. Slots are scanned in order so
    /// the lowest matching slot wins.
    pub fn search_by_id_or_name(&self, query: &str) -> Option<usize> {
        let lowered = query.to_lowercase();
        self.records
            .iter()
            .position(|record| record.matches(query, &lowered))
    }
}
