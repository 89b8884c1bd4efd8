use crate::caller::UserId;
use crate::errors::{TodoError, TodoResult};
use crate::todo::{Todo, TodoId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// 一覧取得の結果。`count` はページではなく対象範囲全体の件数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPage {
    pub data: Vec<Todo>,
    pub count: usize,
}

/// ToDo ストアの抽象
///
/// 各メソッドはストア上で 1 つのアトミックな操作に対応する。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn get(&self, id: &TodoId) -> TodoResult<Option<Todo>>;

    /// `owner` が `None` の場合は全所有者が対象
    async fn list(&self, owner: Option<UserId>, skip: usize, limit: usize)
        -> TodoResult<TodoPage>;

    /// 同じ ID が既に存在する場合は `Store` エラー
    async fn insert(&self, todo: &Todo) -> TodoResult<()>;

    /// 既存レコードを丸ごと置き換える。存在しなければ `NotFound`。
    async fn update(&self, todo: &Todo) -> TodoResult<()>;

    /// 削除できた場合は `true`
    async fn delete(&self, id: &TodoId) -> TodoResult<bool>;
}

/// 簡易な InMemory 実装（開発/テスト用）
#[derive(Default)]
pub struct InMemoryTodoRepository {
    todos: Mutex<HashMap<TodoId, Todo>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> TodoResult<std::sync::MutexGuard<'_, HashMap<TodoId, Todo>>> {
        self.todos
            .lock()
            .map_err(|_| TodoError::store("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn get(&self, id: &TodoId) -> TodoResult<Option<Todo>> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn list(
        &self,
        owner: Option<UserId>,
        skip: usize,
        limit: usize,
    ) -> TodoResult<TodoPage> {
        let todos = self.lock()?;
        let mut matched: Vec<&Todo> = todos
            .values()
            .filter(|todo| owner.map_or(true, |owner| todo.owner_id == owner))
            .collect();
        matched.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        let count = matched.len();
        let data = matched.into_iter().skip(skip).take(limit).cloned().collect();
        Ok(TodoPage { data, count })
    }

    async fn insert(&self, todo: &Todo) -> TodoResult<()> {
        let mut todos = self.lock()?;
        if todos.contains_key(&todo.id) {
            return Err(TodoError::store(format!("duplicate todo id: {}", todo.id)));
        }
        todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn update(&self, todo: &Todo) -> TodoResult<()> {
        let mut todos = self.lock()?;
        match todos.get_mut(&todo.id) {
            Some(current) => {
                *current = todo.clone();
                Ok(())
            }
            None => Err(TodoError::NotFound(todo.id)),
        }
    }

    async fn delete(&self, id: &TodoId) -> TodoResult<bool> {
        Ok(self.lock()?.remove(id).is_some())
    }
}
