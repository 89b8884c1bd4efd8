use chrono::{DateTime, Utc};
use domain::{Todo, TodoId, TodoPage, UserId};
use serde::{Deserialize, Serialize};

/// ToDo のレスポンス表現
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPublic {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<Todo> for TodoPublic {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            owner_id: todo.owner_id,
            created_at: todo.created_at,
        }
    }
}

/// GET /todos レスポンス。`count` はページではなく対象範囲全体の件数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodosPublic {
    pub data: Vec<TodoPublic>,
    pub count: usize,
}

impl From<TodoPage> for TodosPublic {
    fn from(page: TodoPage) -> Self {
        Self {
            data: page.data.into_iter().map(TodoPublic::from).collect(),
            count: page.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// GET /todos のクエリパラメータ
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    /// サービスの簡易ステータス
    pub status: &'static str,
}
