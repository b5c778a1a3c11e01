use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TodoId(pub String);

impl TodoId {
    pub fn new() -> Self { Self(Uuid::new_v4().to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for TodoId {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self { Self(value) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub created_time: DateTime<Utc>,
    pub task_description: Option<String>,
    pub is_completed: bool,
}

impl Todo {
    /// A fresh, not yet completed todo with a service-assigned id.
    pub fn new(task_description: Option<String>) -> Self {
        Self { id: TodoId::new(), created_time: Utc::now(), task_description, is_completed: false }
    }

    /// Completion is always overwritten; the description only when the
    /// update carries a non-empty one.
    pub fn apply(&mut self, update: UpdateTodo) {
        self.is_completed = update.is_completed;
        if let Some(d) = update.task_description.filter(|d| !d.is_empty()) {
            self.task_description = Some(d);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    #[serde(default)]
    pub task_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub task_description: Option<String>,
}
