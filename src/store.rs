//! Immutable, in-memory catalogue store
//!
//! A [`Store`] is built exactly once from a serialized catalogue stream and
//! never mutated afterwards, which makes it safe to share across any number
//! of concurrent readers without locking. Reloading the catalogue means
//! building a fresh store off to the side and swapping it in wholesale; there
//! is no incremental mutation path.
//!
//! Construction is all-or-nothing: a decode failure or the first invalid
//! entry aborts the build and no partial catalogue is ever returned.
//!
//! # Examples
//!
//! ```no_run
//! use pluginmart::{PluginFilter, Store};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = std::fs::File::open("plugins.json")?;
//! let store = Store::new(file)?;
//!
//! let filter = PluginFilter {
//!     server_version: Some("5.12.0".to_string()),
//!     ..Default::default()
//! };
//! for entry in store.query(&filter)? {
//!     println!("{} {}", entry.id, entry.version);
//! }
//! # Ok(())
//! # }
//! ```

use crate::entry::entries_from_reader;
use crate::query::{self, PluginFilter};
use crate::validate::validate_entries;
use crate::{Error, PluginEntry, Result};
use std::io::Read;

/// The full, immutable, queryable catalogue.
#[derive(Debug)]
pub struct Store {
    entries: Vec<PluginEntry>,
}

impl Store {
    /// Build a store from a serialized catalogue stream.
    ///
    /// An empty stream yields an empty store. Decode failures surface as
    /// `failed to parse stream: <cause>`, validation failures as
    /// `failed to validate plugins: <cause>`.
    pub fn new(reader: impl Read) -> Result<Self> {
        let entries = entries_from_reader(reader)?;

        validate_entries(&entries).map_err(|e| Error::Validate(Box::new(e)))?;

        Ok(Self { entries })
    }

    /// All entries, in stream order.
    pub fn entries(&self) -> &[PluginEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a query descriptor against the catalogue.
    pub fn query(&self, filter: &PluginFilter) -> Result<Vec<PluginEntry>> {
        query::query(&self.entries, filter)
    }
}
