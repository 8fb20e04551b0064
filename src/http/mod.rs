//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace and timeout layers)
//!     → request.rs (reserve request number, request channel logging)
//!     → todos.rs / logs.rs (parse input, call store or logging facility)
//!     → response.rs (result payloads, error status codes)
//!     → Send to client
//! ```

pub mod logs;
pub mod request;
pub mod response;
pub mod server;
pub mod todos;

pub use request::X_REQUEST_ID;
pub use response::{ApiError, ErrorBody, ResultBody};
pub use server::{AppState, TodoServer};
