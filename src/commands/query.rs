use anyhow::{Context, Result};
use pluginmart::{entries_to_writer, PluginFilter, Store};
use std::fs::File;

#[allow(clippy::too_many_arguments)]
pub fn run(
    database: String,
    server_version: Option<String>,
    plugin_id: Option<String>,
    search: Option<String>,
    page: usize,
    per_page: usize,
    sort: String,
    json: bool,
) -> Result<()> {
    let file = File::open(&database)
        .with_context(|| format!("failed to open database {}", database))?;
    let store = Store::new(file).with_context(|| format!("failed to load {}", database))?;

    let filter = PluginFilter {
        server_version,
        plugin_id,
        search,
        excluded_ids: Vec::new(),
        page,
        per_page,
        sort: sort.parse()?,
    };
    let results = store.query(&filter)?;

    if json {
        entries_to_writer(std::io::stdout().lock(), &results)?;
        return Ok(());
    }

    if results.is_empty() {
        println!("No plugins matched.");
        return Ok(());
    }

    println!(
        "Found {} plugin{}:",
        results.len(),
        if results.len() == 1 { "" } else { "s" }
    );
    for entry in &results {
        if entry.description.is_empty() {
            println!("  {} {} - {}", entry.id, entry.version, entry.name);
        } else {
            println!(
                "  {} {} - {} ({})",
                entry.id, entry.version, entry.name, entry.description
            );
        }
    }

    Ok(())
}
