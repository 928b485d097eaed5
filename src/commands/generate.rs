use anyhow::{Context, Result};
use pluginmart::{
    entries_from_reader, entries_to_writer, icon_data_uri, reduce_releases, GeneratorConfig,
    HostClient, PluginEntry,
};
use std::fs::{self, File};
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

pub fn run(
    config_path: String,
    existing: Option<String>,
    include_pre_release: Option<bool>,
    token: Option<String>,
    api_url: String,
) -> Result<()> {
    let config = GeneratorConfig::load(&config_path)
        .with_context(|| format!("failed to load config {}", config_path))?;
    let include_pre_release = include_pre_release.unwrap_or(config.include_pre_release);

    let existing_entries: Vec<PluginEntry> = match existing {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("failed to open existing database {}", path))?;
            entries_from_reader(file)
                .with_context(|| format!("failed to read existing database {}", path))?
        }
        None => Vec::new(),
    };

    let host = HostClient::new(api_url, token, FETCH_TIMEOUT)?;

    let mut catalogue = Vec::new();
    for project in &config.projects {
        tracing::debug!(repo = %project.repo, "querying project");

        let metadata = host
            .project(&config.owner, &project.repo)
            .with_context(|| format!("failed to get project {}", project.repo))?;
        let releases = host
            .releases(&config.owner, &project.repo)
            .with_context(|| format!("failed to list releases for {}", project.repo))?;
        if releases.is_empty() {
            tracing::warn!(repo = %project.repo, "no releases found for project");
            continue;
        }

        let mut entries = reduce_releases(
            &releases,
            &metadata.html_url,
            include_pre_release,
            &existing_entries,
            &host,
        )
        .with_context(|| format!("failed to reduce releases for project {}", project.repo))?;

        // Plugins that ship no icon fall back to the configured project icon.
        for entry in &mut entries {
            if entry.icon_data.is_empty() {
                if let Some(icon) = &project.icon {
                    let data = fetch_icon(&host, icon)
                        .with_context(|| format!("failed to fetch icon for {}", project.repo))?;
                    entry.icon_data = icon_data_uri(&data)
                        .with_context(|| format!("failed to encode icon at {}", icon))?;
                }
            }
        }

        catalogue.extend(entries);
    }

    entries_to_writer(std::io::stdout().lock(), &catalogue)
        .context("failed to encode catalogue")?;

    Ok(())
}

fn fetch_icon(host: &HostClient, icon: &str) -> Result<Vec<u8>> {
    if icon.starts_with("http") {
        tracing::debug!(url = %icon, "fetching icon from url");
        return Ok(host.fetch(icon)?);
    }

    tracing::debug!(path = %icon, "reading icon from path");
    Ok(fs::read(icon)?)
}
