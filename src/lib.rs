//! Todo Service Library
//!
//! An in-memory todo list served over HTTP, with two runtime-adjustable
//! log channels (request activity and todo activity).

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod todo;

pub use config::ServiceConfig;
pub use http::TodoServer;
pub use lifecycle::Shutdown;
