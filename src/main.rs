//! calculator-service - arithmetic operations over HTTP with structured request logging

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use calculator_service::api::{self, AppState};
use calculator_service::calc;
use calculator_service::config::{Config, DEFAULT_CONFIG_FILE};
use calculator_service::logging::{self, OperationLog};
use calculator_service::types::{CalcResponse, ErrorResponse, Operands, Operation};

#[derive(Parser)]
#[command(name = "calculator-service")]
#[command(about = "Arithmetic operations over HTTP with structured request logging")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./calculator.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Directory for combined.log and error.log
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Evaluate one operation locally and print the JSON body
    Calc {
        /// Operation to apply
        #[arg(value_enum)]
        operation: Operation,

        /// Operands (one for sqrt, two otherwise)
        #[arg(allow_negative_numbers = true)]
        operands: Vec<String>,
    },

    /// Write a default config file
    Init {
        /// Where to write it
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment before logging so RUST_LOG can come from .env
    let _ = dotenvy::dotenv();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port, host, log_dir } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(dir) = log_dir {
                config.logging.dir = dir;
            }

            // Flushes the log files when main returns
            let _log_guard = logging::init(&config.logging, cli.verbose)?;

            serve(config).await?;
        }

        Commands::Calc { operation, operands } => {
            logging::init_console(cli.verbose);

            let given = operands.len();
            let Some(operands) = Operands::for_operation(operation, operands) else {
                anyhow::bail!(
                    "{} takes {} operand(s), got {}",
                    operation,
                    operation.arity(),
                    given
                );
            };
            match calc::evaluate(operation, &operands) {
                Ok(result) => println!("{}", serde_json::to_string(&CalcResponse { result })?),
                Err(err) => {
                    println!("{}", serde_json::to_string(&ErrorResponse::new(err.to_string()))?);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init { path } => {
            logging::init_console(cli.verbose);

            let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }

            info!("Writing default config to {:?}", path);
            config.save(&path)?;

            println!("✓ Config written to {}", path.display());
        }
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let state = AppState::new(OperationLog::new(config.service_name.as_str()));
    let router = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting HTTP server on {}", addr);

    println!("Calculator microservice is running on http://localhost:{}", config.port);
    println!("  Combined log: {}", config.logging.combined_path().display());
    println!("  Error log:    {}", config.logging.error_path().display());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
