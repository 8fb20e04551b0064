//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use todo_service::config::ServiceConfig;
use todo_service::{Shutdown, TodoServer};

/// A server running on an ephemeral port with its logs in a temp directory.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<ServiceConfig>,
    pub log_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn request_log(&self) -> String {
        std::fs::read_to_string(self.log_path("requests.log")).unwrap_or_default()
    }

    pub fn todo_log(&self) -> String {
        std::fs::read_to_string(self.log_path("todos.log")).unwrap_or_default()
    }

    fn log_path(&self, file: &str) -> PathBuf {
        self.log_dir.path().join(file)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config pointing the log files at `log_dir`, without console echo.
pub fn test_config(log_dir: &TempDir) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.logging.directory = log_dir.path().display().to_string();
    config.logging.console_echo = false;
    config
}

/// Start a server and wait until it accepts connections.
pub async fn start_server() -> TestServer {
    let log_dir = tempfile::tempdir().unwrap();
    let config = test_config(&log_dir);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server = TodoServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    TestServer {
        addr,
        shutdown,
        config_updates,
        log_dir,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Epoch milliseconds one hour from now.
#[allow(dead_code)]
pub fn future_due_date() -> i64 {
    chrono::Utc::now().timestamp_millis() + 3_600_000
}
