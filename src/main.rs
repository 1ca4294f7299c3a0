use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use match_standings::api::state::AppState;
use match_standings::api::{build_app, SelectionParams};
use match_standings::config::AppConfig;
use match_standings::export::osu::OsuClient;
use match_standings::export::{parse_mappool, parse_mp_links, write_dataset, Exporter};
use match_standings::render::render_dashboard;
use match_standings::storage::{load_dataset, DatasetLocation, LoadedDataset};

#[derive(Parser)]
#[command(name = "match-standings")]
#[command(about = "Tournament score standings with per-player drop counts")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard API server
    Serve {
        /// Dataset file path or URL
        #[arg(long)]
        dataset: Option<String>,

        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Directory of front-end files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Print the standings tables
    Show {
        /// Dataset file path or URL
        #[arg(long)]
        dataset: Option<String>,

        /// Worst scores to drop per player
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        drop: String,

        /// Only these players (comma-separated user ids)
        #[arg(long)]
        players: Option<String>,

        /// Maps for the custom leaderboard (comma-separated beatmap ids)
        #[arg(long)]
        maps: Option<String>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Build the dataset from osu! multiplayer matches
    Export {
        /// osu! API v1 key
        #[arg(long, env = "OSU_API_KEY", hide_env_values = true)]
        api_key: String,

        /// File with one match link per line
        #[arg(long)]
        mp_links: Option<PathBuf>,

        /// JSON object of slot to beatmap id
        #[arg(long)]
        mappool: Option<PathBuf>,

        /// Output dataset path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Delay between API requests in milliseconds
        #[arg(long)]
        request_delay_ms: Option<u64>,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn load(config: &AppConfig, location: Option<String>) -> Result<LoadedDataset> {
    let location = location.unwrap_or_else(|| config.dataset.location.clone());
    let source = DatasetLocation::parse(&location)
        .into_source(Duration::from_secs(config.dataset.timeout_seconds))?;
    let loaded = load_dataset(source.as_ref())
        .await
        .with_context(|| format!("Failed to load dataset from {}", location))?;
    Ok(loaded)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(Path::new(&cli.config))
        .with_context(|| format!("Failed to load config {}", cli.config))?;

    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_tracing(log_level, cli.json_logs);

    tracing::info!("Starting match-standings v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            dataset,
            host,
            port,
            static_dir,
        } => {
            let loaded = load(&config, dataset).await?;
            let state = AppState::new(loaded, config.features);

            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }
            if static_dir.is_some() {
                server.static_dir = static_dir;
            }

            let app = build_app(state, &server);
            let addr = format!("{}:{}", server.host, server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Show {
            dataset,
            drop,
            players,
            maps,
            json,
        } => {
            let loaded = load(&config, dataset).await?;
            let state = AppState::new(loaded, config.features);

            let mut engine = state.engine();
            SelectionParams {
                drop: Some(drop),
                players,
                maps,
            }
            .apply(&mut engine)?;

            let dashboard = engine.compute_dashboard()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print!("{}", render_dashboard(&dashboard, engine.features()));
            }
        }
        Commands::Export {
            api_key,
            mp_links,
            mappool,
            output,
            request_delay_ms,
        } => {
            let export = &config.export;
            let mp_links = mp_links.unwrap_or_else(|| export.mp_links_file.clone());
            let mappool = mappool.unwrap_or_else(|| export.mappool_file.clone());
            let output = output.unwrap_or_else(|| export.output_file.clone());
            let delay = Duration::from_millis(request_delay_ms.unwrap_or(export.request_delay_ms));

            let links = parse_mp_links(
                &std::fs::read_to_string(&mp_links)
                    .with_context(|| format!("Failed to read {:?}", mp_links))?,
            );
            let pool = parse_mappool(
                &std::fs::read_to_string(&mappool)
                    .with_context(|| format!("Failed to read {:?}", mappool))?,
            )?;
            tracing::info!("Exporting {} maps from {} match links", pool.len(), links.len());

            let base_url = url::Url::parse(&export.api_base_url)?;
            let client = OsuClient::new(
                base_url,
                api_key,
                Duration::from_secs(config.dataset.timeout_seconds),
            )?;
            let dataset = Exporter::new(client, delay).build(&links, &pool).await?;

            write_dataset(&output, &dataset)?;
            println!("Wrote to {}", output.display());
        }
    }

    Ok(())
}
