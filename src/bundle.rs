//! Plugin bundle inspection
//!
//! A released plugin is a gzipped tar bundle with a single leading folder
//! (named after the plugin id) containing a `plugin.json` manifest and,
//! optionally, an icon file the manifest points at. This module gunzips the
//! bundle into memory and pulls individual files out of the tar.

use crate::{Error, Result};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::io::{Cursor, Read};
use std::path::Path;
use tar::Archive;

/// Name of the manifest file inside a plugin bundle.
pub const MANIFEST_NAME: &str = "plugin.json";

/// The manifest embedded in a plugin bundle.
///
/// All fields default to empty so older manifests that predate a field still
/// parse; the store-side validator decides what is actually required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleManifest {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub min_server_version: String,

    #[serde(default)]
    pub homepage_url: String,

    #[serde(default)]
    pub release_notes_url: String,

    /// Bundle-relative path of the plugin icon, if the plugin ships one.
    #[serde(default)]
    pub icon_path: String,
}

impl BundleManifest {
    pub fn parse(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(Error::ManifestInvalid)
    }
}

/// Decompress a gzipped bundle into memory.
pub fn read_bundle(gzip_data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(gzip_data);
    let mut data = Vec::new();
    decoder.read_to_end(&mut data)?;
    Ok(data)
}

/// Extract a single file from an uncompressed tar bundle.
///
/// Matches `*/{name}`, assuming the bundle has a leading folder named after
/// the plugin id. Fails with [`Error::ManifestMissing`] when no entry
/// matches.
pub fn file_from_tar(tar_data: &[u8], name: &str) -> Result<Vec<u8>> {
    let mut archive = Archive::new(Cursor::new(tar_data));

    for entry in archive.entries()? {
        let mut entry = entry?;

        let matched = {
            let path = entry.path()?;
            let mut components = path.components();
            components.next();
            components.as_path() == Path::new(name)
        };
        if !matched {
            continue;
        }

        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        return Ok(data);
    }

    Err(Error::ManifestMissing(name.to_string()))
}
