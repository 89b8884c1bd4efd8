use crate::errors::{TodoError, TodoResult};
use crate::todo::Todo;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(id: &str) -> Option<Self> {
        Uuid::parse_str(id).ok().map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 認証済みの呼び出し元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub is_superuser: bool,
}

impl Caller {
    pub fn user(id: UserId) -> Self {
        Self {
            id,
            is_superuser: false,
        }
    }

    pub fn superuser(id: UserId) -> Self {
        Self {
            id,
            is_superuser: true,
        }
    }

    /// 所有者本人またはスーパーユーザーのみ許可
    pub fn can_access(&self, todo: &Todo) -> bool {
        self.is_superuser || todo.owner_id == self.id
    }

    pub fn authorize(&self, todo: &Todo) -> TodoResult<()> {
        if self.can_access(todo) {
            Ok(())
        } else {
            Err(TodoError::Forbidden)
        }
    }

    /// 一覧取得の対象範囲。`None` は全所有者。
    pub fn owner_scope(&self) -> Option<UserId> {
        if self.is_superuser {
            None
        } else {
            Some(self.id)
        }
    }
}
