//! Release reducer tests, from the pure bucketing core up to an end-to-end
//! run against an HTTP-served bundle.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use pluginmart::{
    reduce_releases, BundleSource, HostClient, PluginEntry, ReleaseAsset, ReleaseCandidate,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

/// In-memory bundle source that records every URL it serves.
struct FakeSource {
    files: HashMap<String, Vec<u8>>,
    fetched: RefCell<Vec<String>>,
}

impl FakeSource {
    fn new(files: impl IntoIterator<Item = (&'static str, Vec<u8>)>) -> Self {
        Self {
            files: files.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            fetched: RefCell::new(Vec::new()),
        }
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl BundleSource for FakeSource {
    fn fetch(&self, url: &str) -> pluginmart::Result<Vec<u8>> {
        self.fetched.borrow_mut().push(url.to_string());
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| pluginmart::Error::Other(format!("no fixture for {}", url)))
    }
}

/// Build a gzipped tar bundle with files nested under a leading folder.
fn bundle(id: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", id, path), *data)
            .unwrap();
    }
    let tar_data = builder.into_inner().unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_data).unwrap();
    encoder.finish().unwrap()
}

fn asset(name: &str, url: &str, updated_at: Option<&str>) -> ReleaseAsset {
    ReleaseAsset {
        name: name.to_string(),
        browser_download_url: url.to_string(),
        created_at: None,
        updated_at: updated_at.map(|t| t.parse().unwrap()),
    }
}

fn release(tag: &str, assets: Vec<ReleaseAsset>) -> ReleaseCandidate {
    ReleaseCandidate {
        tag_name: tag.to_string(),
        name: None,
        html_url: format!("https://example.com/releases/{}", tag),
        draft: false,
        prerelease: false,
        assets,
    }
}

fn manifest_json(id: &str, version: &str, min_server_version: &str) -> Vec<u8> {
    serde_json::json!({
        "id": id,
        "name": "Demo",
        "description": "A demo plugin",
        "version": version,
        "min_server_version": min_server_version,
        "homepage_url": "",
        "icon_path": "",
    })
    .to_string()
    .into_bytes()
}

#[test]
fn reduces_releases_to_one_entry_per_bucket() {
    let source = FakeSource::new([
        (
            "https://dl/demo-0.1.0.tar.gz",
            bundle("demo", &[("plugin.json", &manifest_json("demo", "0.1.0", "5.10.0"))]),
        ),
        (
            "https://dl/demo-0.2.0.tar.gz",
            bundle("demo", &[("plugin.json", &manifest_json("demo", "0.2.0", "5.10.0"))]),
        ),
        (
            "https://dl/demo-1.0.0.tar.gz",
            bundle("demo", &[("plugin.json", &manifest_json("demo", "1.0.0", "5.20.0"))]),
        ),
    ]);

    let releases = vec![
        release("v0.1.0", vec![asset("demo-0.1.0.tar.gz", "https://dl/demo-0.1.0.tar.gz", None)]),
        release("v0.2.0", vec![asset("demo-0.2.0.tar.gz", "https://dl/demo-0.2.0.tar.gz", None)]),
        release("v1.0.0", vec![asset("demo-1.0.0.tar.gz", "https://dl/demo-1.0.0.tar.gz", None)]),
    ];

    let entries =
        reduce_releases(&releases, "https://example.com/demo", true, &[], &source).unwrap();

    // Two buckets: 5.10.0 keeps 0.2.0, 5.20.0 keeps 1.0.0; descending order.
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].version, "1.0.0");
    assert_eq!(entries[0].min_server_version(), Some("5.20.0"));
    assert_eq!(entries[1].version, "0.2.0");
    assert_eq!(entries[1].min_server_version(), Some("5.10.0"));
}

#[test]
fn resolves_urls_and_homepage_fallback() {
    let source = FakeSource::new([(
        "https://dl/demo-0.1.0.tar.gz",
        bundle("demo", &[("plugin.json", &manifest_json("demo", "0.1.0", ""))]),
    )]);

    let releases = vec![release(
        "v0.1.0",
        vec![asset(
            "demo-0.1.0.tar.gz",
            "https://dl/demo-0.1.0.tar.gz",
            Some("2020-01-01T00:00:00Z"),
        )],
    )];

    let entries =
        reduce_releases(&releases, "https://example.com/acme/demo", true, &[], &source).unwrap();

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    // Manifest declares no homepage, so the project homepage is used.
    assert_eq!(entry.homepage_url, "https://example.com/acme/demo");
    assert_eq!(entry.download_url, "https://dl/demo-0.1.0.tar.gz");
    assert_eq!(entry.release_notes_url, "https://example.com/releases/v0.1.0");
    assert_eq!(
        entry.updated_at,
        Some("2020-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap())
    );
    assert_eq!(entry.min_server_version(), None);
}

#[test]
fn extracts_manifest_icon_as_svg_data_uri() {
    let manifest = serde_json::json!({
        "id": "demo",
        "version": "0.1.0",
        "icon_path": "assets/icon.svg",
    })
    .to_string();
    let source = FakeSource::new([(
        "https://dl/demo.tar.gz",
        bundle(
            "demo",
            &[
                ("plugin.json", manifest.as_bytes()),
                ("assets/icon.svg", b"<svg/>"),
            ],
        ),
    )]);

    let releases = vec![release(
        "v0.1.0",
        vec![asset("demo.tar.gz", "https://dl/demo.tar.gz", None)],
    )];

    let entries = reduce_releases(&releases, "", true, &[], &source).unwrap();
    assert_eq!(entries[0].icon_data, "data:image/svg+xml;base64,PHN2Zy8+");
}

#[test]
fn drafts_and_prereleases_are_discarded() {
    let source = FakeSource::new([(
        "https://dl/demo-0.1.0.tar.gz",
        bundle("demo", &[("plugin.json", &manifest_json("demo", "0.1.0", ""))]),
    )]);

    let mut draft = release(
        "v9.0.0",
        vec![asset("demo-9.0.0.tar.gz", "https://dl/demo-9.0.0.tar.gz", None)],
    );
    draft.draft = true;

    let mut prerelease = release(
        "v8.0.0-rc1",
        vec![asset("demo-8.0.0.tar.gz", "https://dl/demo-8.0.0.tar.gz", None)],
    );
    prerelease.prerelease = true;

    let stable = release(
        "v0.1.0",
        vec![asset("demo-0.1.0.tar.gz", "https://dl/demo-0.1.0.tar.gz", None)],
    );

    let releases = vec![draft, prerelease, stable];
    let entries = reduce_releases(&releases, "", false, &[], &source).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].version, "0.1.0");
}

#[test]
fn prereleases_are_kept_when_requested() {
    let source = FakeSource::new([(
        "https://dl/demo-0.2.0-rc1.tar.gz",
        bundle("demo", &[("plugin.json", &manifest_json("demo", "0.2.0-rc1", ""))]),
    )]);

    let mut prerelease = release(
        "v0.2.0-rc1",
        vec![asset(
            "demo-0.2.0-rc1.tar.gz",
            "https://dl/demo-0.2.0-rc1.tar.gz",
            None,
        )],
    );
    prerelease.prerelease = true;

    let entries = reduce_releases(&[prerelease], "", true, &[], &source).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].version, "0.2.0-rc1");
}

#[test]
fn release_without_bundle_is_skipped_not_fatal() {
    let source = FakeSource::new([]);
    let releases = vec![release("v0.1.0", vec![asset("README.md", "https://dl/readme", None)])];

    let entries = reduce_releases(&releases, "", true, &[], &source).unwrap();
    assert!(entries.is_empty());
    assert!(source.fetched().is_empty());
}

#[test]
fn signature_asset_is_downloaded_and_encoded() {
    let source = FakeSource::new([
        (
            "https://dl/demo-0.1.0.tar.gz",
            bundle("demo", &[("plugin.json", &manifest_json("demo", "0.1.0", ""))]),
        ),
        ("https://dl/demo-0.1.0.sig", b"raw signature bytes".to_vec()),
    ]);

    let releases = vec![release(
        "v0.1.0",
        vec![
            asset("demo-0.1.0.tar.gz", "https://dl/demo-0.1.0.tar.gz", None),
            asset("demo-0.1.0.sig", "https://dl/demo-0.1.0.sig", None),
        ],
    )];

    let entries = reduce_releases(&releases, "", true, &[], &source).unwrap();
    assert_eq!(
        entries[0].signature.as_deref(),
        Some(STANDARD.encode(b"raw signature bytes").as_str())
    );
}

#[test]
fn multiple_signature_assets_fail() {
    let source = FakeSource::new([]);
    let releases = vec![release(
        "v0.1.0",
        vec![
            asset("demo.tar.gz", "https://dl/demo.tar.gz", None),
            asset("demo.sig", "https://dl/demo.sig", None),
            asset("demo.asc", "https://dl/demo.asc", None),
        ],
    )];

    let err = reduce_releases(&releases, "", true, &[], &source).unwrap_err();
    assert!(err.to_string().contains("multiple signatures"));
    assert!(err.to_string().contains("v0.1.0"));
}

#[test]
fn legacy_per_arch_bundles_are_ignored() {
    let source = FakeSource::new([(
        "https://dl/demo-0.1.0.tar.gz",
        bundle("demo", &[("plugin.json", &manifest_json("demo", "0.1.0", ""))]),
    )]);

    let releases = vec![release(
        "v0.1.0",
        vec![
            asset("demo-0.1.0-linux-amd64.tar.gz", "https://dl/demo-amd64.tar.gz", None),
            asset("demo-0.1.0.tar.gz", "https://dl/demo-0.1.0.tar.gz", None),
        ],
    )];

    let entries = reduce_releases(&releases, "", true, &[], &source).unwrap();
    assert_eq!(entries[0].download_url, "https://dl/demo-0.1.0.tar.gz");
}

#[test]
fn unchanged_asset_reuses_existing_entry_without_download() {
    let source = FakeSource::new([]);

    let existing = vec![PluginEntry {
        id: "demo".to_string(),
        version: "0.1.0".to_string(),
        min_server_version: Some("5.10.0".to_string()),
        name: "Demo".to_string(),
        description: "A demo plugin".to_string(),
        homepage_url: "https://example.com/demo".to_string(),
        download_url: "https://dl/demo-0.1.0.tar.gz".to_string(),
        release_notes_url: "https://example.com/releases/old".to_string(),
        icon_data: "data:image/svg+xml;base64,PHN2Zy8+".to_string(),
        signature: None,
        updated_at: Some("2020-06-01T00:00:00Z".parse().unwrap()),
    }];

    let releases = vec![release(
        "v0.1.0",
        vec![asset(
            "demo-0.1.0.tar.gz",
            "https://dl/demo-0.1.0.tar.gz",
            Some("2020-01-01T00:00:00Z"),
        )],
    )];

    let entries = reduce_releases(&releases, "", true, &existing, &source).unwrap();

    // The bundle was never fetched, yet release-scoped fields are refreshed.
    assert!(source.fetched().is_empty());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Demo");
    assert_eq!(entries[0].release_notes_url, "https://example.com/releases/v0.1.0");
    assert_eq!(
        entries[0].updated_at,
        Some("2020-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap())
    );
}

#[test]
fn newer_asset_forces_reinspection() {
    let source = FakeSource::new([(
        "https://dl/demo-0.1.0.tar.gz",
        bundle("demo", &[("plugin.json", &manifest_json("demo", "0.1.1", ""))]),
    )]);

    let existing = vec![PluginEntry {
        id: "demo".to_string(),
        version: "0.1.0".to_string(),
        min_server_version: None,
        name: "Demo".to_string(),
        description: String::new(),
        homepage_url: String::new(),
        download_url: "https://dl/demo-0.1.0.tar.gz".to_string(),
        release_notes_url: String::new(),
        icon_data: String::new(),
        signature: None,
        updated_at: Some("2020-01-01T00:00:00Z".parse().unwrap()),
    }];

    let releases = vec![release(
        "v0.1.0",
        vec![asset(
            "demo-0.1.0.tar.gz",
            "https://dl/demo-0.1.0.tar.gz",
            Some("2020-06-01T00:00:00Z"),
        )],
    )];

    let entries = reduce_releases(&releases, "", true, &existing, &source).unwrap();

    assert_eq!(source.fetched(), ["https://dl/demo-0.1.0.tar.gz"]);
    assert_eq!(entries[0].version, "0.1.1");
}

#[test]
fn bundle_without_manifest_fails_naming_the_release() {
    let source = FakeSource::new([(
        "https://dl/demo.tar.gz",
        bundle("demo", &[("README.md", b"not a manifest")]),
    )]);

    let releases = vec![release(
        "v0.1.0",
        vec![asset("demo.tar.gz", "https://dl/demo.tar.gz", None)],
    )];

    let err = reduce_releases(&releases, "", true, &[], &source).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("v0.1.0"));
    assert!(message.contains("failed to find plugin.json"));
}

#[test]
fn reduces_bundle_served_over_http() {
    let mut server = mockito::Server::new();
    let bundle_mock = server
        .mock("GET", "/bundles/demo-0.1.0.tar.gz")
        .with_body(bundle(
            "demo",
            &[("plugin.json", &manifest_json("demo", "0.1.0", "5.10.0")[..])],
        ))
        .create();

    let url = format!("{}/bundles/demo-0.1.0.tar.gz", server.url());
    let releases = vec![release("v0.1.0", vec![asset("demo-0.1.0.tar.gz", &url, None)])];

    let host = HostClient::new(server.url(), None, Duration::from_secs(5)).unwrap();
    let entries = reduce_releases(&releases, "", true, &[], &host).unwrap();

    bundle_mock.assert();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "demo");
    assert_eq!(entries[0].min_server_version(), Some("5.10.0"));
}
