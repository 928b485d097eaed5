//! Semantic version parsing shared by the reducer and the query engine
//!
//! Both sides of the system order plugins by version: the reducer keeps the
//! newest plugin per minimum-server-version bucket, and the query engine
//! collapses filtered results to the newest version per plugin id. Keeping
//! the parse helpers in one place guarantees both use identical ordering
//! semantics, with errors that name the offending plugin.

use crate::{Error, Result};
use semver::Version;

/// Parse a plugin version string, citing the plugin id on failure.
pub fn parse_version(id: &str, version: &str) -> Result<Version> {
    Version::parse(version).map_err(|source| Error::InvalidVersion {
        id: id.to_string(),
        version: version.to_string(),
        source,
    })
}

/// Parse a caller-supplied server version from a query descriptor.
pub fn parse_server_version(version: &str) -> Result<Version> {
    Version::parse(version).map_err(|source| Error::InvalidServerVersion {
        version: version.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        let version = parse_version("com.example.demo", "1.2.3").unwrap();
        assert_eq!(version, Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_version_cites_plugin_id() {
        let err = parse_version("com.example.demo", "not-a-version").unwrap_err();
        assert!(err.to_string().contains("com.example.demo"));
        assert!(err.to_string().contains("not-a-version"));
    }

    #[test]
    fn test_empty_version_is_an_error() {
        assert!(parse_version("com.example.demo", "").is_err());
    }

    #[test]
    fn test_parse_server_version() {
        assert!(parse_server_version("5.10.0").is_ok());
        let err = parse_server_version("5.10").unwrap_err();
        assert!(err.to_string().contains("failed to parse server version"));
    }
}
