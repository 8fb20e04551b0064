//! Todo management subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → types.rs (parse status / filter / sort key from query strings)
//!     → store.rs (validate, mutate or query under one lock)
//!     → error.rs (client-facing failure reasons)
//! ```
//!
//! # Design Decisions
//! - Memory-resident only; the collection does not survive a restart
//! - Ids are sequential and never reused
//! - Titles are unique among stored todos
//! - Status changes are explicit; nothing moves a todo to LATE on its own

pub mod error;
pub mod store;
pub mod types;

pub use error::{TodoError, TodoResult};
pub use store::TodoStore;
pub use types::{
    Created, Listing, NewTodo, SortKey, StatusFilter, Todo, TodoDetails, TodoStatus,
};
