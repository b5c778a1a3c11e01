use axum::{body::Bytes, extract::{Path, State}, routing::{get, post}, Router, Json};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use crate::{
    application::todo_service::TodoService,
    domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo},
    http::types::ApiError,
};

pub const ROUTE: &str = "/todo4";

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route(ROUTE, post(create_todo::<S>).get(list_todos::<S>))
        .route(&format!("{ROUTE}/:id"), get(get_todo::<S>).put(update_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

async fn create_todo<S: TodoService>(State(state): State<AppState<S>>, body: Bytes) -> Result<Json<Todo>, ApiError> {
    tracing::info!("Creating a new todo list item");
    let input: CreateTodo = parse_body(&body)?;
    let todo = state.service.create(input).await?;
    tracing::info!(id = %todo.id, "created todo");
    Ok(Json(todo))
}

async fn list_todos<S: TodoService>(State(state): State<AppState<S>>) -> Result<Json<Vec<Todo>>, ApiError> {
    tracing::info!("Getting todo list items");
    Ok(Json(state.service.list().await?))
}

async fn get_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<Todo>, ApiError> {
    tracing::info!(%id, "Getting todo item by id");
    match state.service.get(TodoId(id.clone())).await? {
        Some(t) => Ok(Json(t)),
        None => {
            tracing::info!("Item {id} not found");
            Err(ApiError::NotFound)
        }
    }
}

async fn update_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>, body: Bytes) -> Result<Json<Todo>, ApiError> {
    tracing::info!(%id, "Updating todo item");
    let input: UpdateTodo = parse_body(&body)?;
    state.service.update(TodoId(id), input).await?.map(Json).ok_or(ApiError::NotFound)
}

async fn delete_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    tracing::info!(%id, "Deleting todo item");
    if state.service.delete(TodoId(id)).await? { Ok(StatusCode::OK) } else { Err(ApiError::NotFound) }
}

// Malformed bodies are server errors here, not axum's 4xx rejection.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> { Ok(serde_json::from_slice(body)?) }
