//! Release reduction
//!
//! Turns the chronologically unordered release history of one plugin project
//! into the smallest set of canonical catalogue entries: one entry per
//! minimum-server-version bucket, each holding the newest plugin version
//! seen for that bucket. This is how a single catalogue can serve every
//! historical server version without carrying every release.
//!
//! Downloading and unpacking a bundle is the expensive part, so the reducer
//! reuses entries from a previously generated catalogue whenever the release
//! asset has not changed since (the incremental-update skip).

use crate::bundle::{file_from_tar, read_bundle, BundleManifest, MANIFEST_NAME};
use crate::host::{ReleaseAsset, ReleaseCandidate};
use crate::icon::svg_data_uri;
use crate::version::parse_version;
use crate::{Error, PluginEntry, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Where the reducer gets raw bytes from: bundle archives and signature
/// files. Implemented by [`crate::HostClient`]; tests substitute an
/// in-memory double.
pub trait BundleSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Reduce one project's releases to its canonical catalogue entries.
///
/// Drafts are always discarded; pre-releases are discarded unless
/// `include_pre_release` is set. `existing` is a previously generated
/// catalogue enabling the incremental skip; pass an empty slice for a full
/// rebuild. Any failure aborts with the release named in the error, leaving
/// the caller to decide between skipping the project and aborting the run.
pub fn reduce_releases(
    releases: &[ReleaseCandidate],
    project_homepage: &str,
    include_pre_release: bool,
    existing: &[PluginEntry],
    source: &dyn BundleSource,
) -> Result<Vec<PluginEntry>> {
    let mut entries = Vec::new();

    for release in releases {
        if release.draft {
            continue;
        }
        if release.prerelease && !include_pre_release {
            continue;
        }

        let release_name = release.display_name();
        match release_entry(release, project_homepage, existing, source) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {
                tracing::warn!(release = %release_name, "no plugin bundle found for release");
            }
            Err(source) => {
                return Err(Error::Release {
                    release: release_name,
                    source: Box::new(source),
                });
            }
        }
    }

    bucket_newest(entries)
}

/// Resolve a single release into a catalogue entry, or `None` when the
/// release carries no plugin bundle.
fn release_entry(
    release: &ReleaseCandidate,
    project_homepage: &str,
    existing: &[PluginEntry],
    source: &dyn BundleSource,
) -> Result<Option<PluginEntry>> {
    let release_name = release.display_name();

    let mut download_url = String::new();
    let mut updated_at: Option<DateTime<Utc>> = None;
    let mut signature_asset: Option<&ReleaseAsset> = None;

    for asset in &release.assets {
        if asset.name.contains("-amd64") {
            tracing::debug!(asset = %asset.name, release = %release_name, "ignoring legacy per-arch bundle");
            continue;
        }

        if asset.name.ends_with(".tar.gz") {
            download_url = asset.browser_download_url.clone();
            updated_at = asset.timestamp();
        }

        if asset.name.ends_with(".sig") || asset.name.ends_with(".asc") {
            if signature_asset.is_some() {
                return Err(Error::MultipleSignatures {
                    release: release_name,
                    asset: asset.name.clone(),
                });
            }
            signature_asset = Some(asset);
        }
    }

    let signature = match signature_asset {
        Some(asset) => {
            tracing::debug!(url = %asset.browser_download_url, "fetching signature file");
            Some(STANDARD.encode(source.fetch(&asset.browser_download_url)?))
        }
        None => None,
    };

    if download_url.is_empty() {
        return Ok(None);
    }

    let prior = existing.iter().find(|e| e.download_url == download_url);

    let mut entry = match prior {
        Some(prior) if is_current(prior, updated_at) => {
            tracing::debug!(release = %release_name, "skipping download, existing entry is current");
            prior.clone()
        }
        _ => inspect_bundle(source, &download_url)?,
    };

    // Release-scoped fields are refreshed every run, reused entry or not.
    if entry.homepage_url.is_empty() {
        entry.homepage_url = project_homepage.to_string();
    }
    entry.download_url = download_url;
    entry.release_notes_url = release.html_url.clone();
    entry.signature = signature;
    entry.updated_at = updated_at;

    Ok(Some(entry))
}

/// Whether a prior entry is still backed by the same artifact bytes, i.e.
/// its recorded timestamp is not older than the release asset's.
fn is_current(prior: &PluginEntry, asset_updated_at: Option<DateTime<Utc>>) -> bool {
    match (prior.updated_at, asset_updated_at) {
        (Some(recorded), Some(asset)) => recorded >= asset,
        _ => false,
    }
}

/// Download a bundle and build an entry from its embedded manifest.
fn inspect_bundle(source: &dyn BundleSource, download_url: &str) -> Result<PluginEntry> {
    tracing::debug!(url = %download_url, "fetching plugin bundle");

    let gzip_data = source.fetch(download_url)?;
    let tar_data = read_bundle(&gzip_data)?;
    let manifest = BundleManifest::parse(&file_from_tar(&tar_data, MANIFEST_NAME)?)?;

    let icon_data = if manifest.icon_path.is_empty() {
        String::new()
    } else {
        tracing::debug!(path = %manifest.icon_path, "using icon specified in manifest");
        svg_data_uri(&file_from_tar(&tar_data, &manifest.icon_path)?)
    };

    Ok(PluginEntry {
        id: manifest.id,
        version: manifest.version,
        min_server_version: if manifest.min_server_version.is_empty() {
            None
        } else {
            Some(manifest.min_server_version)
        },
        name: manifest.name,
        description: manifest.description,
        homepage_url: manifest.homepage_url,
        download_url: String::new(),
        release_notes_url: String::new(),
        icon_data,
        signature: None,
        updated_at: None,
    })
}

/// Collapse entries to one per minimum-server-version bucket, keeping the
/// highest version in each, and order the result by descending version.
///
/// The empty bucket key (no constraint) is as legitimate as any other.
/// Comparing versions requires having them: an empty version on either side
/// of a comparison is [`Error::VersionRequired`].
pub fn bucket_newest(entries: Vec<PluginEntry>) -> Result<Vec<PluginEntry>> {
    let mut buckets: BTreeMap<String, PluginEntry> = BTreeMap::new();

    for entry in entries {
        let key = entry.min_server_version().unwrap_or_default().to_string();

        let replace = match buckets.get(&key) {
            Some(kept) => {
                if entry.version.is_empty() {
                    return Err(Error::VersionRequired { id: entry.id });
                }
                if kept.version.is_empty() {
                    return Err(Error::VersionRequired { id: kept.id.clone() });
                }

                let kept_version = parse_version(&kept.id, &kept.version)?;
                parse_version(&entry.id, &entry.version)? > kept_version
            }
            None => true,
        };
        if replace {
            buckets.insert(key, entry);
        }
    }

    let mut keyed = buckets
        .into_values()
        .map(|entry| Ok((parse_version(&entry.id, &entry.version)?, entry)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(keyed.into_iter().map(|(_, entry)| entry).collect())
}
