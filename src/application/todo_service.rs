use crate::domain::repository::{SortOrder, StoreResult, TodoRepository};
use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};
use async_trait::async_trait;

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn create(&self, input: CreateTodo) -> StoreResult<Todo>;
    async fn get(&self, id: TodoId) -> StoreResult<Option<Todo>>;
    /// Newest first.
    async fn list(&self) -> StoreResult<Vec<Todo>>;
    async fn update(&self, id: TodoId, input: UpdateTodo) -> StoreResult<Option<Todo>>;
    async fn delete(&self, id: TodoId) -> StoreResult<bool>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn create(&self, input: CreateTodo) -> StoreResult<Todo> {
        let todo = Todo::new(input.task_description);
        self.repo.insert(&todo).await?;
        Ok(todo)
    }

    async fn get(&self, id: TodoId) -> StoreResult<Option<Todo>> { self.repo.get(&id).await }

    async fn list(&self) -> StoreResult<Vec<Todo>> { self.repo.list(SortOrder::Descending).await }

    async fn update(&self, id: TodoId, input: UpdateTodo) -> StoreResult<Option<Todo>> {
        let Some(mut todo) = self.repo.get(&id).await? else { return Ok(None) };
        todo.apply(input);
        // deleted between the lookup and the replace
        if !self.repo.replace(&todo).await? {
            return Ok(None);
        }
        Ok(Some(todo))
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> { self.repo.delete(&id).await }
}
