use crate::todo::TodoId;
use thiserror::Error;

/// ToDo リソース操作のエラー
///
/// 存在確認は所有権確認より先に行うため、他人の存在しない ID を問い合わせても
/// `NotFound` になる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("ToDo not found: {0}")]
    NotFound(TodoId),

    #[error("Not enough permissions")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl TodoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

pub type TodoResult<T> = Result<T, TodoError>;
