//! Catalogue entry data model and stream (de)serialization
//!
//! A [`PluginEntry`] is one record of the catalogue: a specific version of a
//! plugin together with the URLs, icon, and signature resolved for it by the
//! generator. The catalogue itself is a JSON array of entries; it is written
//! by the generator and read back by the store, and must round-trip
//! losslessly (absent optional fields stay absent, they never come back as
//! nulls).
//!
//! # Examples
//!
//! ```
//! use pluginmart::entries_from_reader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let entries = entries_from_reader(&b"[]"[..])?;
//! assert!(entries.is_empty());
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One catalogue record describing a specific plugin version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub id: String,

    /// Plugin version, a semantic version string.
    pub version: String,

    /// Minimum compatible server version. Absent means the plugin is
    /// compatible with every server version.
    #[serde(
        rename = "minServerVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_server_version: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "homepageURL", default)]
    pub homepage_url: String,

    #[serde(rename = "downloadURL", default)]
    pub download_url: String,

    #[serde(rename = "releaseNotesURL", default)]
    pub release_notes_url: String,

    /// Inline icon as a data URI (`data:<mime>;base64,<payload>`).
    #[serde(rename = "iconData", default)]
    pub icon_data: String,

    /// Base64-encoded detached signature of the bundle, if one was released.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Timestamp of the release asset backing this entry.
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PluginEntry {
    /// The minimum-server-version constraint, treating an empty string the
    /// same as an absent field.
    pub fn min_server_version(&self) -> Option<&str> {
        self.min_server_version.as_deref().filter(|v| !v.is_empty())
    }
}

/// Read a catalogue from a JSON stream.
///
/// An empty stream is a valid, empty catalogue. Anything else must be a
/// well-formed JSON array of entries; a malformed or truncated stream fails
/// with [`Error::Decode`] wrapping the underlying parse error.
pub fn entries_from_reader(mut reader: impl Read) -> Result<Vec<PluginEntry>> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw).map_err(Error::Decode)
}

/// Write a catalogue as a JSON stream, the inverse of [`entries_from_reader`].
pub fn entries_to_writer(mut writer: impl Write, entries: &[PluginEntry]) -> Result<()> {
    serde_json::to_writer(&mut writer, entries)?;
    writer.write_all(b"\n")?;
    Ok(())
}
