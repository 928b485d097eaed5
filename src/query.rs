//! Compatibility-aware query engine
//!
//! Resolves a [`PluginFilter`] against a catalogue into an ordered,
//! paginated result. Filtering stages apply in a fixed order — server-version
//! compatibility, id restriction, text search, denylist — then results
//! collapse to the single newest version per plugin id, sort on the requested
//! field, and paginate. The same query against the same catalogue always
//! yields identical output.
//!
//! # Examples
//!
//! ```
//! use pluginmart::{query, PluginFilter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let filter = PluginFilter {
//!     server_version: Some("5.12.0".to_string()),
//!     search: Some("jira".to_string()),
//!     ..Default::default()
//! };
//! let results = query(&[], &filter)?;
//! assert!(results.is_empty());
//! # Ok(())
//! # }
//! ```

use crate::version::{parse_server_version, parse_version};
use crate::{Error, PluginEntry, Result};
use semver::Version;
use std::collections::HashMap;
use std::str::FromStr;

/// Field to order query results by.
///
/// Every ordering uses the plugin id as a stable secondary key so that
/// results are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Case-insensitive ascending plugin name (the default).
    #[default]
    Name,
    /// Ascending plugin id.
    Id,
    /// Ascending release-asset timestamp; entries without one sort first.
    UpdatedAt,
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "name" => Ok(SortField::Name),
            "id" => Ok(SortField::Id),
            "updated" | "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(Error::Other(format!("unknown sort field {:?}", other))),
        }
    }
}

/// A caller's filter/sort/page request against the catalogue.
///
/// One descriptor per request; the transport it arrives over (HTTP query
/// string, CLI flags) is the surrounding glue's concern.
#[derive(Debug, Clone, Default)]
pub struct PluginFilter {
    /// Only return plugins compatible with this server version.
    pub server_version: Option<String>,

    /// Restrict to a single plugin id.
    pub plugin_id: Option<String>,

    /// Case-insensitive substring match over plugin name and description.
    pub search: Option<String>,

    /// Plugin ids to exclude, e.g. administratively disabled plugins. This
    /// is an external input, never computed here.
    pub excluded_ids: Vec<String>,

    /// Zero-based page index.
    pub page: usize,

    /// Page size; zero means return everything unpaginated.
    pub per_page: usize,

    pub sort: SortField,
}

impl PluginFilter {
    /// Build a filter from key/value parameters, the transport-agnostic
    /// query input boundary. Unknown keys are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut filter = PluginFilter::default();

        for (key, value) in pairs {
            match key {
                "server_version" => filter.server_version = Some(value.to_string()),
                "plugin_id" => filter.plugin_id = Some(value.to_string()),
                "search" => filter.search = Some(value.to_string()),
                "page" => {
                    filter.page = value
                        .parse()
                        .map_err(|_| Error::Other(format!("invalid page {:?}", value)))?;
                }
                "per_page" => {
                    filter.per_page = value
                        .parse()
                        .map_err(|_| Error::Other(format!("invalid per_page {:?}", value)))?;
                }
                "sort" => filter.sort = value.parse()?,
                _ => {}
            }
        }

        Ok(filter)
    }
}

/// Resolve a filter against a catalogue slice.
///
/// The result is always a subset of `entries` with at most one entry per
/// plugin id. A page index beyond the available range yields an empty
/// result, never an error.
pub fn query(entries: &[PluginEntry], filter: &PluginFilter) -> Result<Vec<PluginEntry>> {
    let server_version = filter
        .server_version
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(parse_server_version)
        .transpose()?;

    let search = filter
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    // Per plugin id, keep only the newest version that survives filtering.
    let mut newest: HashMap<&str, (Version, &PluginEntry)> = HashMap::new();

    for entry in entries {
        if !matches(entry, filter, server_version.as_ref(), search.as_deref())? {
            continue;
        }

        let version = parse_version(&entry.id, &entry.version)?;
        let replace = match newest.get(entry.id.as_str()) {
            // Equal versions should not occur in a well-formed catalogue;
            // prefer the later asset timestamp when they do.
            Some((best, kept)) => {
                version > *best || (version == *best && entry.updated_at > kept.updated_at)
            }
            None => true,
        };
        if replace {
            newest.insert(&entry.id, (version, entry));
        }
    }

    let mut results: Vec<&PluginEntry> = newest.into_values().map(|(_, e)| e).collect();

    results.sort_by(|a, b| match filter.sort {
        SortField::Name => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id)),
        SortField::Id => a.id.cmp(&b.id),
        SortField::UpdatedAt => a
            .updated_at
            .cmp(&b.updated_at)
            .then_with(|| a.id.cmp(&b.id)),
    });

    let page = if filter.per_page == 0 {
        results
    } else {
        results
            .into_iter()
            .skip(filter.page.saturating_mul(filter.per_page))
            .take(filter.per_page)
            .collect()
    };

    Ok(page.into_iter().cloned().collect())
}

fn matches(
    entry: &PluginEntry,
    filter: &PluginFilter,
    server_version: Option<&Version>,
    search: Option<&str>,
) -> Result<bool> {
    if let Some(server_version) = server_version {
        if let Some(min) = entry.min_server_version() {
            let min = parse_version(&entry.id, min)?;
            if min > *server_version {
                return Ok(false);
            }
        }
    }

    if let Some(plugin_id) = filter.plugin_id.as_deref().filter(|id| !id.is_empty()) {
        if entry.id != plugin_id {
            return Ok(false);
        }
    }

    if let Some(needle) = search {
        let in_name = entry.name.to_lowercase().contains(needle);
        let in_description = entry.description.to_lowercase().contains(needle);
        if !in_name && !in_description {
            return Ok(false);
        }
    }

    if filter.excluded_ids.iter().any(|id| *id == entry.id) {
        return Ok(false);
    }

    Ok(true)
}
