//! Predecir CLI - prediction service for registry-versioned models
//!
//! # Commands
//!
//! - `serve` - Bind the configured model and start the HTTP service
//! - `info` - Show version and endpoint information

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use predecir::{
    api::{create_router, AppState},
    config::AppConfig,
    error::{PredecirError, Result},
    registry::{ModelUri, RegistryClient},
};

/// Predecir - HTTP façade over a registry-versioned classification model
#[derive(Parser)]
#[command(name = "predecir")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the prediction service
    ///
    /// Examples:
    ///   predecir serve
    ///   predecir serve --config config/app.json --host 0.0.0.0
    Serve {
        /// Path to the JSON configuration file
        #[arg(short, long, default_value = "config/app.json")]
        config: String,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
    },
    /// Show version info
    Info,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { config, host } => serve(&config, &host).await,
        Commands::Info => {
            print_info();
            Ok(())
        }
    };

    // Startup errors are fatal: no partial-service mode
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn print_info() {
    println!("predecir {}", predecir::VERSION);
    println!();
    println!("Endpoints:");
    println!("  GET  /                 - Greeting / liveness probe");
    println!("  GET  /health           - Health check");
    println!("  GET  /metrics          - Prometheus metrics");
    println!("  POST /default_payment  - Credit-default prediction (task-dependent)");
    println!("  POST /has_diabetes     - Diabetes prediction (task-dependent)");
}

/// Run the startup gate and serve until shutdown
///
/// Order matters: configuration, then model binding, then the listener.
/// Traffic is only accepted once a usable handle is held.
async fn serve(config_path: &str, host: &str) -> Result<()> {
    println!("Starting prediction service...");

    let config = AppConfig::load(config_path)?;
    let port = config.service_port()?;
    let state = bind_model(&config).await?;
    let route = state.task().route().to_string();
    let app = create_router(state);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| PredecirError::config(format!("invalid listen address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| PredecirError::config(format!("failed to bind {addr}: {e}")))?;

    println!("Server listening on http://{addr}");
    println!();
    println!("Endpoints:");
    println!("  GET  /        - Greeting / liveness probe");
    println!("  GET  /health  - Health check");
    println!("  GET  /metrics - Prometheus metrics");
    println!("  POST {route}  - Prediction");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PredecirError::inference(format!("server error: {e}")))?;

    println!("Prediction service shut down");
    Ok(())
}

/// Resolve the configured model reference into ready-to-serve state
///
/// The one blocking step of startup: either a handle comes back or the
/// error propagates and the process exits. No retry on first failure.
async fn bind_model(config: &AppConfig) -> Result<AppState> {
    let tracking_uri = config.tracking_uri()?;
    let uri = ModelUri::new(config.model_name.clone(), config.model_version.clone());

    let client = RegistryClient::new(tracking_uri)?;
    let model = client.resolve(&uri).await?;

    println!("Model loaded: {uri}");
    Ok(AppState::new(
        Arc::new(model),
        config.task,
        uri.to_string(),
    ))
}

async fn shutdown_signal() {
    // Failure to install the handler means we can never shut down cleanly
    if tokio::signal::ctrl_c().await.is_ok() {
        println!("Shutting down...");
    }
}
