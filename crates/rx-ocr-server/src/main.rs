use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use rx_ocr_core::{DatasetIndex, Extractor};
use rx_ocr_server::{build_router, init_logging, AppState, ScanService, ServerConfig};

#[derive(Parser)]
#[command(name = "rx-ocr")]
#[command(about = "Extract medicines and doses from prescription images")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the OCR HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Medicine dataset CSV
        #[arg(short, long)]
        dataset: Option<PathBuf>,
    },
    /// Extract medicines from an OCR transcript and print them as JSON
    Extract {
        /// Transcript file, or `-` for stdin
        input: PathBuf,
        /// Medicine dataset CSV
        #[arg(short, long)]
        dataset: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::from_env();

    init_logging(&config.log_level, cli.json || config.log_json);

    match cli.command {
        Commands::Serve { port, dataset } => {
            let config = ServerConfig {
                port: port.unwrap_or(config.port),
                dataset_path: dataset.unwrap_or(config.dataset_path),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Extract { input, dataset } => {
            let text = read_transcript(&input)?;
            let index = DatasetIndex::load_or_empty(dataset.unwrap_or(config.dataset_path));
            let extraction = Extractor::new(&index).extract(&text);
            println!("{}", serde_json::to_string_pretty(&extraction)?);
        }
    }

    Ok(())
}

async fn run_server(config: ServerConfig) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        dataset = %config.dataset_path.display(),
        engine = %config.ocr_command,
        "Starting Rx-OCR server"
    );

    let service = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || ScanService::from_config(&config))
            .await
            .context("dataset loading task failed")?
    };
    let state = Arc::new(AppState {
        service,
        port: config.port,
    });
    let app = build_router(state, config.max_upload_bytes);

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.listen_addr()))?;
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn read_transcript(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read transcript from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read transcript {}", input.display()))
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
