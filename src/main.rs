//! Todo Service
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id → trace → timeout → request log middleware
//!                                                         │
//!                                                         ▼
//!                                               ┌──────────────────┐
//!                                               │ todos.rs/logs.rs │
//!                                               └────────┬─────────┘
//!                                          ┌─────────────┴─────────────┐
//!                                          ▼                           ▼
//!                                  ┌──────────────┐          ┌──────────────────┐
//!                                  │  TodoStore   │          │ LoggingFacility  │
//!                                  │ (one mutex)  │          │ request + todo   │
//!                                  └──────────────┘          └────────┬─────────┘
//!                                                                     ▼
//!                                                 logs/requests.log, logs/todos.log, stdout
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use todo_service::config::ConfigWatcher;
use todo_service::lifecycle::{signals, startup};
use todo_service::observability::{self, metrics};
use todo_service::{Shutdown, TodoServer};

#[derive(Parser)]
#[command(name = "todo-service")]
#[command(about = "In-memory todo list over HTTP", long_about = None)]
struct Args {
    /// TOML configuration file. Watched for log level changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = startup::resolve_config(args.config.as_deref(), args.bind.as_deref())?;

    observability::init_tracing(&config.observability.tracing_filter);
    tracing::info!("todo-service v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        log_directory = %config.logging.directory,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = TodoServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let mut server_task = tokio::spawn(server.run(listener, config_updates, server_shutdown));

    tokio::select! {
        _ = signals::wait_for_signal() => {
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => result??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
