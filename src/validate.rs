//! Structural validation of catalogue entries
//!
//! Every entry entering a [`crate::Store`] passes through here first. The
//! checks are purely structural: a non-empty id, a parsable version, and a
//! parsable minimum-server-version when one is present. Absence of the
//! minimum-server-version constraint is legal and means "compatible with
//! every server version".

use crate::version::parse_version;
use crate::{Error, PluginEntry, Result};

/// Validate a single catalogue entry.
///
/// `position` is the entry's index in the stream, used for diagnostics when
/// the entry has no id to cite.
pub fn validate_entry(entry: &PluginEntry, position: usize) -> Result<()> {
    if entry.id.is_empty() {
        return Err(Error::InvalidEntry { position });
    }

    parse_version(&entry.id, &entry.version)?;

    if let Some(min_server_version) = entry.min_server_version() {
        parse_version(&entry.id, min_server_version)?;
    }

    Ok(())
}

/// Validate entries in stream order, stopping at the first failure.
pub fn validate_entries(entries: &[PluginEntry]) -> Result<()> {
    for (position, entry) in entries.iter().enumerate() {
        validate_entry(entry, position)?;
    }
    Ok(())
}
