//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, request logging)
//! - Bind server to listener
//! - Apply configuration reloads to the log channels
//! - Stop on the shutdown signal

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::request::{request_log_middleware, X_REQUEST_ID};
use crate::http::{logs, todos};
use crate::lifecycle::ShutdownSignal;
use crate::observability::logging::LoggingFacility;
use crate::todo::TodoStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TodoStore>,
    pub logging: Arc<LoggingFacility>,
}

/// HTTP server for the todo service.
pub struct TodoServer {
    router: Router,
    state: AppState,
    config: ServiceConfig,
}

impl TodoServer {
    /// Create a server whose log channels write to the files in `config.logging`.
    ///
    /// Existing log files are truncated.
    pub fn new(config: ServiceConfig) -> io::Result<Self> {
        let logging = LoggingFacility::from_config(&config.logging)?;
        Ok(Self::with_logging(config, logging))
    }

    /// Create a server around an already built logging facility.
    pub fn with_logging(config: ServiceConfig, logging: LoggingFacility) -> Self {
        let state = AppState {
            store: Arc::new(TodoStore::new()),
            logging: Arc::new(logging),
        };
        let router = Self::build_router(&config, state.clone());

        Self {
            router,
            state,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/todo/health", get(todos::health))
            .route(
                "/todo",
                post(todos::create_todo)
                    .put(todos::update_status)
                    .delete(todos::delete_todo),
            )
            .route("/todo/size", get(todos::count_todos))
            .route("/todo/content", get(todos::list_todos))
            .route("/logs/level", get(logs::get_level).put(logs::set_level))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                request_log_middleware,
            ))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configuration updates arriving on `config_updates` change the log
    /// channel levels. Once `shutdown` fires, in-flight requests drain and
    /// the update task is joined before this returns.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let updates = tokio::spawn(apply_config_updates(
            self.state.logging.clone(),
            config_updates,
            shutdown.clone(),
        ));

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.fired().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        // Still running if the listener failed before shutdown fired.
        updates.abort();
        let _ = updates.await;

        served?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the fully layered router, for driving the service in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Apply reloaded log levels until the update channel closes or shutdown fires.
async fn apply_config_updates(
    logging: Arc<LoggingFacility>,
    mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
    mut shutdown: ShutdownSignal,
) {
    while let Some(Some(config)) = shutdown.run_until(config_updates.recv()).await {
        logging.apply_config(&config.logging);
    }
    tracing::debug!("Config update task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use crate::lifecycle::Shutdown;
    use crate::observability::logging::LogLevel;

    fn quiet_logging(dir: &tempfile::TempDir) -> LoggingConfig {
        LoggingConfig {
            directory: dir.path().display().to_string(),
            console_echo: false,
            ..LoggingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_shutdown_joins_update_task() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            logging: quiet_logging(&dir),
            ..ServiceConfig::default()
        };
        let server = TodoServer::new(config).unwrap();
        let logging = server.state().logging.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = Shutdown::new();
        // The sender outlives the server, so only shutdown can end the task.
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(server.run(listener, updates_rx, shutdown.subscribe()));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("server should stop after shutdown")
            .unwrap()
            .unwrap();

        assert!(updates_tx.send(ServiceConfig::default()).is_err());
        assert_eq!(Arc::strong_count(&logging), 1);
    }

    #[tokio::test]
    async fn test_updates_apply_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let logging = Arc::new(LoggingFacility::from_config(&quiet_logging(&dir)).unwrap());
        let shutdown = Shutdown::new();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(apply_config_updates(
            logging.clone(),
            updates_rx,
            shutdown.subscribe(),
        ));

        let mut config = ServiceConfig::default();
        config.logging.request_level = LogLevel::Debug;
        updates_tx.send(config).unwrap();
        for _ in 0..50 {
            if logging.request_channel().level() == LogLevel::Debug {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(logging.request_channel().level(), LogLevel::Debug);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("update task should stop on shutdown")
            .unwrap();
        assert!(updates_tx.send(ServiceConfig::default()).is_err());
    }
}
