//! Pluginmart - catalogue generator and query engine for messaging-platform plugins
//!
//! Pluginmart maintains a catalogue of installable plugin packages. A
//! generator crawls a release host, reduces each project's release history
//! into canonical catalogue entries, and writes a single JSON database. The
//! store loads that database, validates it, and answers filtered, sorted,
//! paginated queries over it:
//!
//! - One canonical entry per minimum-server-version bucket, always the
//!   newest plugin version for that bucket
//! - Incremental regeneration that skips re-downloading unchanged bundles
//! - An immutable store, safe for unlimited concurrent readers
//! - Deterministic query results: compatibility filter, text search,
//!   per-id collapse, stable ordering, pagination
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
//!     search: Some("jira".to_string()),
//!     ..Default::default()
//! };
//! for entry in store.query(&filter)? {
//!     println!("{} {}", entry.id, entry.version);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`entry`] - Catalogue entry data model and stream (de)serialization
//! - [`validate`] - Structural validation of catalogue entries
//! - [`store`] - Immutable, in-memory catalogue store
//! - [`query`] - Compatibility-aware query engine
//! - [`reducer`] - Release reduction for the generator
//! - [`bundle`] - Plugin bundle inspection
//! - [`host`] - Release host HTTP client
//! - [`icon`] - Inline icon encoding
//! - [`config`] - Generator configuration
//! - [`error`] - Error types and result handling

pub mod bundle;
pub mod config;
pub mod entry;
pub mod error;
pub mod host;
pub mod icon;
pub mod query;
pub mod reducer;
pub mod store;
pub mod validate;
pub mod version;

pub use bundle::{BundleManifest, MANIFEST_NAME};
pub use config::{GeneratorConfig, ProjectConfig};
pub use entry::{entries_from_reader, entries_to_writer, PluginEntry};
pub use error::{Error, Result};
pub use host::{HostClient, Project, ReleaseAsset, ReleaseCandidate, DEFAULT_API_URL};
pub use icon::{icon_data_uri, svg_data_uri};
pub use query::{query, PluginFilter, SortField};
pub use reducer::{bucket_newest, reduce_releases, BundleSource};
pub use store::Store;
pub use validate::{validate_entries, validate_entry};
