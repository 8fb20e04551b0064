//! Todo store error definitions.

use thiserror::Error;

/// Client-input failures raised by todo operations.
///
/// Display strings are the messages returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    /// Another stored todo already uses this title.
    #[error("Error: TODO with the title {0} already exists in the system")]
    DuplicateTitle(String),

    /// Due date lies before the moment of creation.
    #[error("Error: Can't create new TODO that its due date is in the past")]
    PastDueDate,

    #[error("Error: Invalid input")]
    InvalidFilter(String),

    #[error("Error: Invalid input")]
    InvalidSortKey(String),

    #[error("Error: Invalid input")]
    InvalidStatus(String),

    /// No todo has the given id. Holds the id as the client sent it.
    #[error("Error: no such TODO with id {0}")]
    NotFound(String),

    /// Request body or query string could not be interpreted.
    #[error("Error: Invalid input")]
    InvalidInput(String),
}

impl TodoError {
    /// Text written to the todo log channel for this failure.
    pub fn log_message(&self) -> String {
        match self {
            TodoError::DuplicateTitle(title) => format!(
                "Error: TODO with the title [{}] already exists in the system",
                title
            ),
            other => other.to_string(),
        }
    }
}

/// Result type for todo operations.
pub type TodoResult<T> = Result<T, TodoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TodoError::DuplicateTitle("groceries".into());
        assert_eq!(
            err.to_string(),
            "Error: TODO with the title groceries already exists in the system"
        );
        assert_eq!(
            TodoError::NotFound("7".into()).to_string(),
            "Error: no such TODO with id 7"
        );
        assert_eq!(
            TodoError::InvalidSortKey("NAME".into()).to_string(),
            "Error: Invalid input"
        );
    }

    #[test]
    fn test_log_message_brackets_title() {
        assert_eq!(
            TodoError::DuplicateTitle("a".into()).log_message(),
            "Error: TODO with the title [a] already exists in the system"
        );
        assert_eq!(TodoError::PastDueDate.log_message(), TodoError::PastDueDate.to_string());
    }
}
