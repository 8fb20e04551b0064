//! Todo domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::todo::error::TodoError;

/// Lifecycle status of a todo.
///
/// Transitions are driven only by explicit status updates; a todo whose due
/// date has passed stays `Pending` until a client marks it otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoStatus {
    Pending,
    Late,
    Done,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "PENDING",
            TodoStatus::Late => "LATE",
            TodoStatus::Done => "DONE",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TodoStatus::Pending),
            "LATE" => Ok(TodoStatus::Late),
            "DONE" => Ok(TodoStatus::Done),
            other => Err(TodoError::InvalidStatus(other.to_string())),
        }
    }
}

/// Status predicate used by count and list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(TodoStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: TodoStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("ALL"),
            StatusFilter::Only(status) => f.write_str(status.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(StatusFilter::All),
            other => other
                .parse::<TodoStatus>()
                .map(StatusFilter::Only)
                .map_err(|_| TodoError::InvalidFilter(other.to_string())),
        }
    }
}

/// Field used to order listed todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    DueDate,
    Title,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Id => "ID",
            SortKey::DueDate => "DUE_DATE",
            SortKey::Title => "TITLE",
        })
    }
}

impl FromStr for SortKey {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ID" => Ok(SortKey::Id),
            "DUE_DATE" => Ok(SortKey::DueDate),
            "TITLE" => Ok(SortKey::Title),
            other => Err(TodoError::InvalidSortKey(other.to_string())),
        }
    }
}

/// A stored todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Sequential identifier, assigned by the store.
    pub id: u64,
    /// Title, unique among stored todos.
    pub title: String,
    /// Free text body.
    pub content: String,
    /// Due date in epoch milliseconds.
    pub due_date: i64,
    pub status: TodoStatus,
}

/// Fields supplied by a client when creating a todo.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub content: String,
    pub due_date: i64,
}

/// Everything but the title of a todo being created.
#[derive(Debug, Clone)]
pub struct TodoDetails {
    pub content: String,
    pub due_date: i64,
}

/// Result of a successful create.
#[derive(Debug, Clone)]
pub struct Created {
    pub id: u64,
    /// Number of todos stored before this one was added.
    pub previous_count: usize,
}

/// Result of a list query.
#[derive(Debug, Clone)]
pub struct Listing {
    pub todos: Vec<Todo>,
    /// Size of the whole collection, regardless of filter.
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("LATE".parse::<TodoStatus>().unwrap(), TodoStatus::Late);
        assert!(matches!(
            "late".parse::<TodoStatus>(),
            Err(TodoError::InvalidStatus(s)) if s == "late"
        ));
        assert!("ALL".parse::<TodoStatus>().is_err());
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "DONE".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(TodoStatus::Done)
        );
        assert!(matches!(
            "SOME".parse::<StatusFilter>(),
            Err(TodoError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("DUE_DATE".parse::<SortKey>().unwrap(), SortKey::DueDate);
        assert!(matches!(
            "id".parse::<SortKey>(),
            Err(TodoError::InvalidSortKey(_))
        ));
    }

    #[test]
    fn test_todo_json_shape() {
        let todo = Todo {
            id: 3,
            title: "A".into(),
            content: "x".into(),
            due_date: 1_700_000_000_000,
            status: TodoStatus::Pending,
        };
        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "title": "A",
                "content": "x",
                "dueDate": 1_700_000_000_000i64,
                "status": "PENDING",
            })
        );
    }
}
