//! Generator configuration
//!
//! The generator is driven by a TOML file listing the plugin projects to
//! crawl and, per project, an optional fallback icon for plugins that ship
//! none in their bundle.
//!
//! ```toml
//! owner = "acme"
//! include_pre_release = true
//!
//! [[projects]]
//! repo = "acme-plugin-demo"
//! icon = "data/icons/demo.svg"
//!
//! [[projects]]
//! repo = "acme-plugin-todo"
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Release-host organization owning the plugin projects.
    pub owner: String,

    /// Whether pre-release versions enter the catalogue.
    #[serde(default = "default_include_pre_release")]
    pub include_pre_release: bool,

    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Repository name under the configured owner.
    pub repo: String,

    /// Fallback icon, a local path or an http(s) URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

fn default_include_pre_release() -> bool {
    true
}

impl GeneratorConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::Other(format!(
                "config file {} not found",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: GeneratorConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
