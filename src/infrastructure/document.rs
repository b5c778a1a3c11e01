//! Mapping between stored JSON documents and [`Todo`] records.
//!
//! Documents are read field by field instead of being deserialized wholesale,
//! so a document written by another client (missing optional fields, extra
//! system properties) still maps cleanly, while a document without an identity
//! or creation time is rejected.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::{
    repository::StoreError,
    todo::{Todo, TodoId},
};

pub const ID: &str = "id";
pub const CREATED_TIME: &str = "createdTime";
pub const TASK_DESCRIPTION: &str = "taskDescription";
pub const IS_COMPLETED: &str = "isCompleted";

pub fn to_document(todo: &Todo) -> Value {
    let mut doc = Map::new();
    doc.insert(ID.into(), Value::String(todo.id.0.clone()));
    doc.insert(CREATED_TIME.into(), Value::String(todo.created_time.to_rfc3339()));
    doc.insert(
        TASK_DESCRIPTION.into(),
        todo.task_description.clone().map(Value::String).unwrap_or(Value::Null),
    );
    doc.insert(IS_COMPLETED.into(), Value::Bool(todo.is_completed));
    Value::Object(doc)
}

pub fn from_document(doc: &Value) -> Result<Todo, StoreError> {
    let obj = doc.as_object().ok_or_else(|| malformed("<unknown>", "document is not an object"))?;

    let id = match obj.get(ID) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(malformed("<unknown>", "missing string `id`")),
    };

    let created_time = match obj.get(CREATED_TIME) {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| malformed(&id, &format!("invalid `{CREATED_TIME}`: {e}")))?,
        _ => return Err(malformed(&id, &format!("missing `{CREATED_TIME}`"))),
    };

    let task_description = match obj.get(TASK_DESCRIPTION) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(malformed(&id, &format!("`{TASK_DESCRIPTION}` is not a string"))),
    };

    let is_completed = match obj.get(IS_COMPLETED) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(malformed(&id, &format!("`{IS_COMPLETED}` is not a boolean"))),
    };

    Ok(Todo { id: TodoId(id), created_time, task_description, is_completed })
}

fn malformed(id: &str, reason: &str) -> StoreError {
    StoreError::MalformedDocument { id: id.to_string(), reason: reason.to_string() }
}
