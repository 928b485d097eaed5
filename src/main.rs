use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Pluginmart - catalogue generator and query tool for messaging-platform plugins
#[derive(Parser)]
#[command(name = "pluginmart")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output debug logs
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the plugins.json catalogue from the release host
    Generate {
        /// Path to the generator configuration file
        #[arg(long, default_value = "marketplace.toml")]
        config: String,

        /// An existing plugins.json to streamline incremental updates
        #[arg(long)]
        existing: Option<String>,

        /// Whether to include pre-release versions (overrides the config)
        #[arg(long)]
        include_pre_release: Option<bool>,

        /// Optional release-host API token for authenticated requests
        #[arg(long)]
        token: Option<String>,

        /// Release-host API base URL
        #[arg(long, default_value = pluginmart::DEFAULT_API_URL)]
        api_url: String,
    },

    /// Query a generated catalogue
    Query {
        /// Path to the plugins.json catalogue
        database: String,

        /// Only return plugins compatible with this server version
        #[arg(long)]
        server_version: Option<String>,

        /// Restrict to a single plugin id
        #[arg(long)]
        plugin_id: Option<String>,

        /// Case-insensitive search over plugin name and description
        #[arg(long)]
        search: Option<String>,

        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Page size; zero returns everything
        #[arg(long, default_value_t = 0)]
        per_page: usize,

        /// Sort field: name, id, or updated
        #[arg(long, default_value = "name")]
        sort: String,

        /// Print results as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("pluginmart=debug")
    } else {
        EnvFilter::new("pluginmart=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate {
            config,
            existing,
            include_pre_release,
            token,
            api_url,
        } => commands::generate::run(config, existing, include_pre_release, token, api_url),
        Commands::Query {
            database,
            server_version,
            plugin_id,
            search,
            page,
            per_page,
            sort,
            json,
        } => commands::query::run(
            database,
            server_version,
            plugin_id,
            search,
            page,
            per_page,
            sort,
            json,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
