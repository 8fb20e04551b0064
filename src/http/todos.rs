//! Todo endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::http::response::{ApiError, ResultBody};
use crate::http::server::AppState;
use crate::observability::logging::{LogChannel, RequestContext};
use crate::todo::{SortKey, StatusFilter, Todo, TodoDetails, TodoError, TodoStatus};

/// Body of `POST /todo`.
///
/// Only `title` is typed here. The other fields are interpreted after the
/// title has been checked, so a duplicate title wins over any other defect.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, rename = "dueDate")]
    pub due_date: Value,
}

impl CreateTodoRequest {
    /// Interpret `content` and `dueDate`.
    fn details(content: Value, due_date: Value) -> Result<TodoDetails, TodoError> {
        let content = match content {
            Value::Null => String::new(),
            Value::String(text) => text,
            other => return Err(TodoError::InvalidInput(format!("content {}", other))),
        };
        let due_date = due_date_millis(&due_date)
            .ok_or_else(|| TodoError::InvalidInput(format!("dueDate {}", due_date)))?;

        Ok(TodoDetails { content, due_date })
    }
}

/// Epoch milliseconds from a JSON number or numeric string.
///
/// Fractional values are truncated. Anything else is `None`.
pub fn due_date_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    }
}

fn truncate(ms: f64) -> Option<i64> {
    ms.is_finite().then(|| ms.trunc() as i64)
}

#[derive(Debug, Deserialize)]
pub struct CountParams {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateParams {
    pub id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

/// Log a failure on the todo channel and turn it into a response error.
fn reject(log: &LogChannel, ctx: &RequestContext, err: TodoError) -> ApiError {
    log.error(ctx.number, &err.log_message());
    ApiError::Todo(err)
}

/// Unwrap query parameters, treating a malformed query string as invalid input.
fn query_params<T>(
    log: &LogChannel,
    ctx: &RequestContext,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| reject(log, ctx, TodoError::InvalidInput(e.body_text())))
}

/// Parse a client-supplied id. Anything that is not an id cannot match a todo.
fn parse_id(raw: &str) -> Result<u64, TodoError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| TodoError::NotFound(raw.to_string()))
}

/// `GET /todo/health`
pub async fn health() -> &'static str {
    "OK"
}

/// `POST /todo`
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<Json<ResultBody<u64>>, ApiError> {
    let log = state.logging.todo_channel();

    let Json(CreateTodoRequest {
        title,
        content,
        due_date,
    }) = body.map_err(|e| reject(log, &ctx, TodoError::InvalidInput(e.body_text())))?;

    let created = state
        .store
        .create_with(title.clone(), || CreateTodoRequest::details(content, due_date))
        .map_err(|e| reject(log, &ctx, e))?;

    log.info(ctx.number, &format!("Creating new TODO with Title [{}]", title));
    log.debug(
        ctx.number,
        &format!(
            "Currently there are {} Todos in the system. New TODO will be assigned with id {}",
            created.previous_count, created.id
        ),
    );

    Ok(ResultBody::new(created.id))
}

/// `GET /todo/size?status=`
pub async fn count_todos(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<CountParams>, QueryRejection>,
) -> Result<Json<ResultBody<usize>>, ApiError> {
    let log = state.logging.todo_channel();
    let params = query_params(log, &ctx, query)?;

    let filter = params
        .status
        .unwrap_or_default()
        .parse::<StatusFilter>()
        .map_err(|e| reject(log, &ctx, e))?;
    let count = state.store.count(filter);

    log.info(
        ctx.number,
        &format!("Total TODOs count for state {} is {}", filter, count),
    );
    Ok(ResultBody::new(count))
}

/// `GET /todo/content?status=&sortBy=`
///
/// `status` defaults to `ALL` and `sortBy` to `ID`. The sort key is
/// validated before the filter.
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ResultBody<Vec<Todo>>>, ApiError> {
    let log = state.logging.todo_channel();
    let params = query_params(log, &ctx, query)?;
    let status = params.status.unwrap_or_else(|| "ALL".to_string());
    let sort_by = params.sort_by.unwrap_or_else(|| "ID".to_string());

    log.info(
        ctx.number,
        &format!(
            "Extracting todos content. Filter: {} | Sorting by: {}",
            status, sort_by
        ),
    );

    let sort = sort_by
        .parse::<SortKey>()
        .map_err(|e| reject(log, &ctx, e))?;
    let filter = status
        .parse::<StatusFilter>()
        .map_err(|e| reject(log, &ctx, e))?;
    let listing = state.store.list(filter, sort);

    log.debug(
        ctx.number,
        &format!(
            "There are a total of {} todos in the system. The result holds {} todos",
            listing.total,
            listing.todos.len()
        ),
    );
    Ok(ResultBody::new(listing.todos))
}

/// `PUT /todo?id=&status=`
///
/// Returns the status the todo had before the update.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<UpdateParams>, QueryRejection>,
) -> Result<Json<ResultBody<TodoStatus>>, ApiError> {
    let log = state.logging.todo_channel();
    let params = query_params(log, &ctx, query)?;
    let raw_id = params.id.unwrap_or_default();
    let raw_status = params.status.unwrap_or_default();

    log.info(
        ctx.number,
        &format!("Update TODO id [{}] state to {}", raw_id, raw_status),
    );

    let status = raw_status
        .parse::<TodoStatus>()
        .map_err(|e| reject(log, &ctx, e))?;
    let previous = parse_id(&raw_id)
        .and_then(|id| state.store.update_status(id, status))
        .map_err(|e| reject(log, &ctx, e))?;

    log.debug(
        ctx.number,
        &format!(
            "Todo id [{}] state change: {} --> {}",
            raw_id, previous, status
        ),
    );
    Ok(ResultBody::new(previous))
}

/// `DELETE /todo?id=`
///
/// Returns the number of todos left.
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<Json<ResultBody<usize>>, ApiError> {
    let log = state.logging.todo_channel();
    let params = query_params(log, &ctx, query)?;
    let raw_id = params.id.unwrap_or_default();

    let remaining = parse_id(&raw_id)
        .and_then(|id| state.store.delete(id))
        .map_err(|e| reject(log, &ctx, e))?;

    log.info(ctx.number, &format!("Removing todo id {}", raw_id));
    log.debug(
        ctx.number,
        &format!(
            "After removing todo id [{}] there are {} TODOs in the system",
            raw_id, remaining
        ),
    );
    Ok(ResultBody::new(remaining))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_date_forms() {
        let parse = |json: &str| due_date_millis(&serde_json::from_str(json).unwrap());

        assert_eq!(parse("1700000000000"), Some(1_700_000_000_000));
        assert_eq!(parse("1700000000000.75"), Some(1_700_000_000_000));
        assert_eq!(parse("\"1700000000000\""), Some(1_700_000_000_000));
        assert_eq!(parse("\" 42.9 \""), Some(42));
        assert_eq!(parse("\"tomorrow\""), None);
        assert_eq!(parse("null"), None);
        assert_eq!(parse("[1]"), None);
    }

    #[test]
    fn test_create_body_is_lenient_past_the_title() {
        let body: CreateTodoRequest =
            serde_json::from_str(r#"{"title":"t","content":5,"dueDate":{"at":1}}"#).unwrap();
        assert_eq!(body.title, "t");
        assert!(CreateTodoRequest::details(body.content, body.due_date).is_err());

        let body: CreateTodoRequest =
            serde_json::from_str(r#"{"title":"t","dueDate":"12"}"#).unwrap();
        let details = CreateTodoRequest::details(body.content, body.due_date).unwrap();
        assert_eq!(details.content, "");
        assert_eq!(details.due_date, 12);

        assert!(serde_json::from_str::<CreateTodoRequest>(r#"{"title":3,"dueDate":1}"#).is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert_eq!(parse_id("abc").unwrap_err(), TodoError::NotFound("abc".into()));
        assert_eq!(parse_id("-1").unwrap_err(), TodoError::NotFound("-1".into()));
    }
}
