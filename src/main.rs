//! CLI entry point for the crash dashboard.
//!
//! Provides subcommands for serving the interactive dashboard, rendering its
//! pages to disk, and summarizing the accident dataset.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crash_dashboard::config::{DEFAULT_CONFIG_PATH, DashboardConfig};
use crash_dashboard::dashboard::html::{render_dashboard, render_death_toggle, render_map_tabs};
use crash_dashboard::dashboard::DEATH_TOGGLES;
use crash_dashboard::output::{print_json, print_pretty, write_page, write_table};
use crash_dashboard::pipeline::{build_dashboard, load_accident_data, publish_documents};
use crash_dashboard::server;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "crash_dashboard")]
#[command(about = "Highway fatal-accident analysis dashboard", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Port to listen on (overrides config and DASHBOARD_PORT)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Accident dataset path or URL (overrides config and DASHBOARD_DATA_PATH)
    #[arg(short, long, global = true, value_name = "FILE_OR_URL")]
    data: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dashboard and serve it over HTTP
    Serve,
    /// Write the map documents and static dashboard pages to disk
    Render {
        /// Directory to write pages to (defaults to the configured output_dir)
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// Log the aggregate tables and write each as CSV
    Summary {
        /// Directory to write CSV tables to (defaults to the configured output_dir)
        #[arg(short, long)]
        output_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/crash_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("crash_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::load_or_default(&cli.config)?;
    config.apply_env()?;
    config.apply_cli(cli.port, cli.data);

    match cli.command {
        Commands::Serve => {
            let dashboard = build_dashboard(&config).await?;
            publish_documents(&dashboard, &config.output_dir)?;

            if config.credentials.is_some() {
                info!("Basic auth enabled");
            }
            let app = server::router(Arc::new(dashboard), config.credentials.as_ref());
            server::serve(config.socket_addr(), app).await?;
        }
        Commands::Render { output_dir } => {
            let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            let dashboard = build_dashboard(&config).await?;
            publish_documents(&dashboard, &dir)?;

            let toggles: Vec<String> = DEATH_TOGGLES.iter().map(|t| t.to_string()).collect();
            let pages = [
                (
                    "index.html",
                    render_dashboard(&dashboard, &dashboard.initial_selection())?,
                ),
                (
                    "deaths.html",
                    render_death_toggle(&dashboard.death_panels(&toggles))?,
                ),
                ("maps.html", render_map_tabs(&dashboard)),
            ];
            for (name, html) in &pages {
                let path = write_page(&dir, name, html)?;
                info!(path = %path.display(), "Page rendered");
            }
        }
        Commands::Summary { output_dir } => {
            let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            let data = load_accident_data(&config).await?;

            print_pretty(&data.analysis);
            print_json(&data.stats)?;
            print_json(&data.analysis)?;

            std::fs::create_dir_all(&dir)?;
            let dir = Path::new(&dir);
            write_table(dir.join("seasonal.csv"), &data.analysis.seasonal)?;
            write_table(dir.join("monthly.csv"), &data.analysis.monthly)?;
            write_table(dir.join("weekday.csv"), &data.analysis.weekday)?;
            write_table(dir.join("hourly.csv"), &data.analysis.hourly)?;
            info!(dir = %dir.display(), "Summary tables written");
        }
    }

    Ok(())
}
