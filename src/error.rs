use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse stream: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to validate plugins: {0}")]
    Validate(#[source] Box<Error>),

    #[error("plugin id is empty for entry {position}")]
    InvalidEntry { position: usize },

    #[error("failed to parse version {version:?} for plugin {id}: {source}")]
    InvalidVersion {
        id: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("failed to parse server version {version:?}: {source}")]
    InvalidServerVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("failed to find {0} in plugin bundle")]
    ManifestMissing(String),

    #[error("failed to parse plugin manifest: {0}")]
    ManifestInvalid(#[source] serde_json::Error),

    #[error("found multiple signatures {asset} for release {release}")]
    MultipleSignatures { release: String, asset: String },

    #[error("version is empty for plugin {id}")]
    VersionRequired { id: String },

    #[error("failed to process release {release}: {source}")]
    Release {
        release: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Other(String),
}
