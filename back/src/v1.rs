use std::sync::Arc;

use api::v1::{CreateTodo, Health, Message, Stats, Todo, UpdateTodo, Welcome};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    store::TodoStore,
};

pub fn router() -> Router<Arc<TodoStore>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/stats", get(get_stats))
}

/// `docs` has no route behind it; existing clients read the field, so it stays.
async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: String::from("Welcome to TODO API"),
        docs: String::from("/docs"),
        health: String::from("/health"),
    })
}

async fn health() -> Json<Health> {
    Json(Health {
        status: String::from("healthy"),
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Deserialize)]
struct ListParams {
    completed: Option<String>,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

async fn list_todos(
    State(store): State<Arc<TodoStore>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Todo>>> {
    let Query(params) = params.map_err(|rejection| {
        Error::field(&["query"], rejection.body_text(), "query_invalid")
    })?;

    let completed = match params.completed.as_deref() {
        Some(value) => Some(parse_bool(value).ok_or_else(|| {
            Error::field(
                &["query", "completed"],
                "Input should be a valid boolean, unable to interpret input",
                "bool_parsing",
            )
        })?),
        None => None,
    };

    Ok(Json(store.list(completed).await))
}

/// Resolves a `/todos/:id` segment. Any integer is well formed; one that does
/// not fit a `u64` can never name a record.
fn todo_id(id: Result<Path<String>, PathRejection>) -> Result<u64> {
    let Path(raw) = id?;

    let digits = raw.strip_prefix(['-', '+']).unwrap_or(&raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::field(
            &["path", "id"],
            "Input should be a valid integer, unable to parse string as an integer",
            "int_parsing",
        ));
    }

    raw.parse().map_err(|_| Error::NotFound(raw.clone()))
}

async fn get_todo(
    State(store): State<Arc<TodoStore>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Todo>> {
    let id = todo_id(id)?;
    Ok(Json(store.get(id).await?))
}

async fn create_todo(
    State(store): State<Arc<TodoStore>>,
    input: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>)> {
    let Json(input) = input?;
    let new = input.validate()?;
    let todo = store.create(new).await;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(store): State<Arc<TodoStore>>,
    id: Result<Path<String>, PathRejection>,
    input: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>> {
    let id = todo_id(id)?;

    // An unknown id is reported before any body problems.
    store.get(id).await?;

    let Json(input) = input?;
    let patch = input.validate()?;
    Ok(Json(store.update(id, patch).await?))
}

async fn delete_todo(
    State(store): State<Arc<TodoStore>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Message>> {
    let id = todo_id(id)?;
    store.delete(id).await?;

    Ok(Json(Message {
        message: format!("TODO {id} deleted successfully"),
    }))
}

async fn get_stats(State(store): State<Arc<TodoStore>>) -> Json<Stats> {
    Json(store.stats().await)
}
