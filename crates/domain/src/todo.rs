use crate::caller::UserId;
use crate::errors::{TodoError, TodoResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// タイトルの最大文字数
pub const TITLE_MAX_LEN: usize = 255;
/// 説明の最大文字数
pub const DESCRIPTION_MAX_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub Uuid);

impl TodoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// パスパラメータなどの文字列から TodoId を作成
    pub fn parse(id: &str) -> TodoResult<Self> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| TodoError::validation(format!("invalid todo id: {id}")))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 永続化される ToDo レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// 入力から新しい ToDo を作る。所有者は必ず呼び出し元になる。
    pub fn new(input: TodoCreate, owner_id: UserId) -> Self {
        Self {
            id: TodoId::new(),
            title: input.title,
            description: input.description,
            owner_id,
            created_at: Utc::now(),
        }
    }

    /// 指定されたフィールドだけを上書きする。`id` と `owner_id` は対象外。
    pub fn apply(&mut self, update: TodoUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
    }
}

/// 作成リクエスト。ペイロード中の `owner_id` は受け取らない。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodoCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl TodoCreate {
    pub fn validate(&self) -> TodoResult<()> {
        validate_title(&self.title)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

/// 部分更新リクエスト
///
/// `description` はキーが無ければ変更なし、`null` ならクリアする。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
}

impl TodoUpdate {
    pub fn validate(&self) -> TodoResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(Some(description)) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn validate_title(title: &str) -> TodoResult<()> {
    if title.is_empty() {
        return Err(TodoError::validation("title cannot be empty"));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(TodoError::validation(format!(
            "title must be at most {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> TodoResult<()> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(TodoError::validation(format!(
            "description must be at most {DESCRIPTION_MAX_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_todo() -> Todo {
        Todo::new(
            TodoCreate {
                title: "Buy milk".to_string(),
                description: Some("2 bottles".to_string()),
            },
            UserId::new(),
        )
    }

    #[test]
    fn test_create_payload_ignores_owner_id() {
        // Arrange: owner_id を含むペイロード
        let payload = serde_json::json!({
            "title": "Buy milk",
            "owner_id": "00000000-0000-0000-0000-000000000001"
        });

        // Act
        let input: TodoCreate = serde_json::from_value(payload).unwrap();
        let owner = UserId::new();
        let todo = Todo::new(input, owner);

        // Assert: 所有者は呼び出し元
        assert_eq!(todo.owner_id, owner);
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description, None);
    }

    #[test]
    fn test_update_distinguishes_absent_and_null_description() {
        let absent: TodoUpdate = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.description, None);

        let null: TodoUpdate = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let value: TodoUpdate = serde_json::from_str(r#"{"description":"d"}"#).unwrap();
        assert_eq!(value.description, Some(Some("d".to_string())));
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut todo = sample_todo();
        let before = todo.clone();

        todo.apply(TodoUpdate {
            title: Some("Buy oat milk".to_string()),
            description: None,
        });

        assert_eq!(todo.title, "Buy oat milk");
        assert_eq!(todo.description, before.description);
        assert_eq!(todo.id, before.id);
        assert_eq!(todo.owner_id, before.owner_id);
        assert_eq!(todo.created_at, before.created_at);
    }

    #[test]
    fn test_apply_null_description_clears_it() {
        let mut todo = sample_todo();
        todo.apply(TodoUpdate {
            title: None,
            description: Some(None),
        });
        assert_eq!(todo.description, None);
        assert_eq!(todo.title, "Buy milk");
    }

    #[test]
    fn test_validation_rejects_bad_titles() {
        let empty = TodoCreate {
            title: String::new(),
            description: None,
        };
        assert!(matches!(empty.validate(), Err(TodoError::Validation(_))));

        let long = TodoCreate {
            title: "a".repeat(TITLE_MAX_LEN + 1),
            description: None,
        };
        assert!(matches!(long.validate(), Err(TodoError::Validation(_))));

        let max = TodoCreate {
            title: "あ".repeat(TITLE_MAX_LEN),
            description: Some("b".repeat(DESCRIPTION_MAX_LEN)),
        };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_whitespace_only_title_is_accepted() {
        let create = TodoCreate {
            title: "   ".to_string(),
            description: None,
        };
        assert!(create.validate().is_ok());

        let update = TodoUpdate {
            title: Some(" ".to_string()),
            description: None,
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_update_validation_checks_only_present_fields() {
        assert!(TodoUpdate::default().validate().is_ok());
        assert!(TodoUpdate::default().is_empty());

        let bad = TodoUpdate {
            title: Some(String::new()),
            description: None,
        };
        assert!(matches!(bad.validate(), Err(TodoError::Validation(_))));

        let long_description = TodoUpdate {
            title: None,
            description: Some(Some("d".repeat(DESCRIPTION_MAX_LEN + 1))),
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_todo_id_parse() {
        let id = TodoId::new();
        assert_eq!(TodoId::parse(&id.to_string()).unwrap(), id);
        assert!(matches!(
            TodoId::parse("not-a-uuid"),
            Err(TodoError::Validation(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_apply_never_changes_identity(
            title in proptest::option::of("[a-z]{1,20}"),
            description in proptest::option::of(proptest::option::of("[a-z]{0,20}")),
        ) {
            let mut todo = sample_todo();
            let before = todo.clone();

            todo.apply(TodoUpdate { title: title.clone(), description: description.clone() });

            prop_assert_eq!(todo.id, before.id);
            prop_assert_eq!(todo.owner_id, before.owner_id);
            prop_assert_eq!(todo.title, title.unwrap_or(before.title));
            prop_assert_eq!(todo.description, description.unwrap_or(before.description));
        }
    }
}
