use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;

use pje_scraper::logging::setup_logging;
use pje_scraper::{web, ProcessService, ScraperConfig, Strategy};

#[derive(Parser, Debug)]
#[command(version, about = "PJe consulta pública process lookup")]
struct Args {
    /// Log level for this crate (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Navigation strategy: session or browser
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Delay between movement pages, in milliseconds
    #[arg(long)]
    page_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: SocketAddr,
    },
    /// Look up one case and print it as JSON
    Fetch { case_key: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(&args.log_level);

    let mut config = ScraperConfig::from_env();
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy);
    }
    if args.headed {
        config = config.with_headless(false);
    }
    if let Some(ms) = args.page_delay_ms {
        config = config.with_page_delay(Duration::from_millis(ms));
    }

    let service = ProcessService::new(config);

    match args.command {
        Command::Serve { addr } => match web::serve(Arc::new(service), addr).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Server stopped: {}", e);
                ExitCode::FAILURE
            }
        },
        Command::Fetch { case_key } => match service.fetch(&case_key).await {
            Ok(Some(details)) => match serde_json::to_string_pretty(&details) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("Failed to serialize result: {}", e);
                    ExitCode::FAILURE
                }
            },
            Ok(None) => {
                eprintln!("Process not found: {case_key}");
                ExitCode::from(2)
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        },
    }
}
