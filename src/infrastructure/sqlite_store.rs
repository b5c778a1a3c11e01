use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};

use super::document::{from_document, to_document};
use crate::domain::{
    repository::{SortOrder, StoreResult, TodoRepository},
    todo::{Todo, TodoId},
};

/// The todo collection, one JSON document per row. `_ts` is assigned on
/// insert and never rewritten, so it orders by insertion time.
#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoRepository {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = if is_in_memory(database_url) {
            // every connection to :memory: opens its own database
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = options.connect(database_url).await?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

pub fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Creates the database file and its parent directories for file-backed URLs.
pub fn prepare_sqlite_file(database_url: &str) -> std::io::Result<()> {
    if is_in_memory(database_url) { return Ok(()); }
    let Some(path) = database_url.strip_prefix("sqlite://") else { return Ok(()) };
    let path = path.split('?').next().unwrap_or(path);
    // Windows absolute paths arrive as /C:/path
    let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
        &path[1..]
    } else {
        path
    };
    use std::{fs, fs::OpenOptions, path::Path};
    let p = Path::new(path);
    if let Some(parent) = p.parent() { if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; } }
    if !p.exists() {
        OpenOptions::new().create(true).append(true).open(p)?;
    }
    Ok(())
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                _ts INTEGER NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: &TodoId) -> StoreResult<Option<Todo>> {
        let row = sqlx::query("SELECT body FROM tasks WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&*self.pool)
            .await?;
        row.map(|r| parse_body(r.get("body"))).transpose()
    }

    async fn list(&self, order: SortOrder) -> StoreResult<Vec<Todo>> {
        let sql = match order {
            SortOrder::Descending => "SELECT body FROM tasks ORDER BY _ts DESC, rowid DESC",
            SortOrder::Ascending => "SELECT body FROM tasks ORDER BY _ts ASC, rowid ASC",
        };
        let rows = sqlx::query(sql).fetch_all(&*self.pool).await?;
        rows.into_iter().map(|r| parse_body(r.get("body"))).collect()
    }

    async fn insert(&self, todo: &Todo) -> StoreResult<()> {
        let body = serde_json::to_string(&to_document(todo))?;
        sqlx::query("INSERT INTO tasks (id, body, _ts) VALUES (?1, ?2, ?3)")
            .bind(todo.id.as_str())
            .bind(body)
            .bind(Utc::now().timestamp_millis())
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn replace(&self, todo: &Todo) -> StoreResult<bool> {
        let body = serde_json::to_string(&to_document(todo))?;
        let result = sqlx::query("UPDATE tasks SET body = ?2 WHERE id = ?1")
            .bind(todo.id.as_str())
            .bind(body)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &TodoId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id.as_str())
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn parse_body(body: String) -> StoreResult<Todo> {
    let doc: serde_json::Value = serde_json::from_str(&body)?;
    from_document(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::StoreError;
    use crate::domain::todo::UpdateTodo;

    async fn store() -> SqliteTodoRepository {
        let repo = SqliteTodoRepository::connect("sqlite::memory:").await.unwrap();
        repo.init().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn insert_then_get() {
        let repo = store().await;
        let todo = Todo::new(Some("Buy milk".into()));
        repo.insert(&todo).await.unwrap();
        assert_eq!(repo.get(&todo.id).await.unwrap(), Some(todo));
        assert_eq!(repo.get(&TodoId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn init_is_repeatable() {
        let repo = store().await;
        repo.init().await.unwrap();
    }

    #[tokio::test]
    async fn list_orders_by_insertion() {
        let repo = store().await;
        let mut ids = Vec::new();
        for i in 0..3 {
            let todo = Todo::new(Some(format!("task {i}")));
            repo.insert(&todo).await.unwrap();
            ids.push(todo.id);
        }

        let newest_first: Vec<_> = repo.list(SortOrder::Descending).await.unwrap().into_iter().map(|t| t.id).collect();
        let mut expected = ids.clone();
        expected.reverse();
        assert_eq!(newest_first, expected);

        let oldest_first: Vec<_> = repo.list(SortOrder::Ascending).await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(oldest_first, ids);
    }

    #[tokio::test]
    async fn replace_keeps_insertion_position() {
        let repo = store().await;
        let mut first = Todo::new(Some("first".into()));
        let second = Todo::new(Some("second".into()));
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        first.apply(UpdateTodo { is_completed: true, task_description: None });
        assert!(repo.replace(&first).await.unwrap());

        let listed = repo.list(SortOrder::Descending).await.unwrap();
        assert_eq!(listed, vec![second, first]);
    }

    #[tokio::test]
    async fn replace_and_delete_report_missing() {
        let repo = store().await;
        let todo = Todo::new(None);
        assert!(!repo.replace(&todo).await.unwrap());
        assert!(!repo.delete(&todo.id).await.unwrap());

        repo.insert(&todo).await.unwrap();
        assert!(repo.delete(&todo.id).await.unwrap());
        assert!(!repo.delete(&todo.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_id_is_a_store_error() {
        let repo = store().await;
        let todo = Todo::new(None);
        repo.insert(&todo).await.unwrap();
        assert!(matches!(repo.insert(&todo).await, Err(StoreError::Database(_))));
    }

    #[tokio::test]
    async fn corrupt_document_surfaces_as_error() {
        let repo = store().await;
        sqlx::query("INSERT INTO tasks (id, body, _ts) VALUES ('x', '{\"id\":\"x\"}', 0)")
            .execute(&*repo.pool)
            .await
            .unwrap();
        let err = repo.get(&TodoId("x".into())).await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedDocument { .. }));
    }

    #[tokio::test]
    async fn file_backed_store_persists_across_connections() {
        let dir = std::env::temp_dir().join(format!("todo-api-{}", TodoId::new()));
        let url = format!("sqlite://{}", dir.join("nested").join("todos.db").display());
        prepare_sqlite_file(&url).unwrap();

        let todo = Todo::new(Some("persisted".into()));
        {
            let repo = SqliteTodoRepository::connect(&url).await.unwrap();
            repo.init().await.unwrap();
            repo.insert(&todo).await.unwrap();
            repo.pool.close().await;
        }
        let repo = SqliteTodoRepository::connect(&url).await.unwrap();
        repo.init().await.unwrap();
        assert_eq!(repo.get(&todo.id).await.unwrap(), Some(todo));
        repo.pool.close().await;
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:todos?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://todos.db"));
    }
}
