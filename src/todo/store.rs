//! In-memory todo collection.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::observability::metrics;
use crate::todo::error::{TodoError, TodoResult};
use crate::todo::types::{
    Created, Listing, NewTodo, SortKey, StatusFilter, Todo, TodoDetails, TodoStatus,
};

struct StoreInner {
    /// Todos in insertion order.
    todos: Vec<Todo>,
    next_id: u64,
}

/// A thread-safe todo collection.
///
/// One mutex guards both the collection and the id counter, so every
/// operation observes and mutates them atomically.
pub struct TodoStore {
    inner: Mutex<StoreInner>,
}

impl TodoStore {
    /// Create an empty store. The first todo gets id 1.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                todos: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Add a todo, checking the due date against the current wall clock.
    pub fn create(&self, new: NewTodo) -> TodoResult<Created> {
        self.create_at(new, now_millis())
    }

    /// Add a todo as if the current time were `now_ms`.
    ///
    /// The title check runs before the due date check.
    pub fn create_at(&self, new: NewTodo, now_ms: i64) -> TodoResult<Created> {
        let details = TodoDetails {
            content: new.content,
            due_date: new.due_date,
        };
        self.insert_at(new.title, now_ms, move || Ok(details))
    }

    /// Add a todo whose remaining fields are only read once `title` is known
    /// to be free.
    ///
    /// A duplicate title is reported even when `details` would fail.
    pub fn create_with<F>(&self, title: String, details: F) -> TodoResult<Created>
    where
        F: FnOnce() -> TodoResult<TodoDetails>,
    {
        self.insert_at(title, now_millis(), details)
    }

    fn insert_at<F>(&self, title: String, now_ms: i64, details: F) -> TodoResult<Created>
    where
        F: FnOnce() -> TodoResult<TodoDetails>,
    {
        let mut inner = self.inner.lock().expect("todo store mutex poisoned");

        if inner.todos.iter().any(|t| t.title == title) {
            return Err(TodoError::DuplicateTitle(title));
        }
        let TodoDetails { content, due_date } = details()?;
        if due_date < now_ms {
            return Err(TodoError::PastDueDate);
        }

        let id = inner.next_id;
        let previous_count = inner.todos.len();
        inner.todos.push(Todo {
            id,
            title,
            content,
            due_date,
            status: TodoStatus::Pending,
        });
        inner.next_id += 1;

        metrics::record_todo_count(inner.todos.len());
        Ok(Created { id, previous_count })
    }

    /// Number of todos matching `filter`.
    pub fn count(&self, filter: StatusFilter) -> usize {
        let inner = self.inner.lock().expect("todo store mutex poisoned");
        inner.todos.iter().filter(|t| filter.matches(t.status)).count()
    }

    /// Todos matching `filter`, ordered ascending by `sort`.
    ///
    /// Ties keep insertion order.
    pub fn list(&self, filter: StatusFilter, sort: SortKey) -> Listing {
        let inner = self.inner.lock().expect("todo store mutex poisoned");
        let total = inner.todos.len();
        let mut todos: Vec<Todo> = inner
            .todos
            .iter()
            .filter(|t| filter.matches(t.status))
            .cloned()
            .collect();
        drop(inner);

        match sort {
            SortKey::Id => todos.sort_by_key(|t| t.id),
            SortKey::DueDate => todos.sort_by_key(|t| t.due_date),
            SortKey::Title => todos.sort_by(|a, b| a.title.cmp(&b.title)),
        }

        Listing { todos, total }
    }

    /// Set the status of todo `id`, returning the status it had before.
    pub fn update_status(&self, id: u64, status: TodoStatus) -> TodoResult<TodoStatus> {
        let mut inner = self.inner.lock().expect("todo store mutex poisoned");
        let todo = inner
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;

        let previous = todo.status;
        todo.status = status;
        Ok(previous)
    }

    /// Remove todo `id`, returning how many todos remain.
    pub fn delete(&self, id: u64) -> TodoResult<usize> {
        let mut inner = self.inner.lock().expect("todo store mutex poisoned");
        let index = inner
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;

        inner.todos.remove(index);
        metrics::record_todo_count(inner.todos.len());
        Ok(inner.todos.len())
    }

    /// Total number of stored todos.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("todo store mutex poisoned").todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
