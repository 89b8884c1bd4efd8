use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use domain::{Todo, TodoError, TodoId, UserId};
use std::collections::HashMap;

pub const ENTITY_TYPE_TODO: &str = "Todo";
pub const OWNER_INDEX: &str = "GSI1";
const METADATA_SK: &str = "METADATA";

/// DynamoDB Single Table Design のキー構造
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoKeys {
    pub pk: String,
    pub sk: String,
}

impl TodoKeys {
    pub fn for_todo(id: &TodoId) -> Self {
        Self {
            pk: format!("TODO#{id}"),
            sk: METADATA_SK.to_string(),
        }
    }

    pub fn to_key_map(&self) -> HashMap<String, AttributeValue> {
        HashMap::from([
            ("PK".to_string(), AttributeValue::S(self.pk.clone())),
            ("SK".to_string(), AttributeValue::S(self.sk.clone())),
        ])
    }
}

/// 所有者インデックス（GSI1）のパーティションキー
pub fn owner_partition_key(owner: &UserId) -> String {
    format!("OWNER#{owner}")
}

/// ToDo を DynamoDB アイテムに変換
pub fn todo_to_item(todo: &Todo) -> HashMap<String, AttributeValue> {
    let created_at = todo.created_at.to_rfc3339();
    let mut item = TodoKeys::for_todo(&todo.id).to_key_map();

    item.insert(
        "EntityType".to_string(),
        AttributeValue::S(ENTITY_TYPE_TODO.to_string()),
    );
    item.insert(
        "GSI1PK".to_string(),
        AttributeValue::S(owner_partition_key(&todo.owner_id)),
    );
    item.insert(
        "GSI1SK".to_string(),
        AttributeValue::S(format!("{created_at}#{}", todo.id)),
    );
    item.insert("id".to_string(), AttributeValue::S(todo.id.to_string()));
    item.insert(
        "owner_id".to_string(),
        AttributeValue::S(todo.owner_id.to_string()),
    );
    item.insert("title".to_string(), AttributeValue::S(todo.title.clone()));
    if let Some(description) = &todo.description {
        item.insert(
            "description".to_string(),
            AttributeValue::S(description.clone()),
        );
    }
    item.insert("created_at".to_string(), AttributeValue::S(created_at));

    item
}

/// DynamoDB アイテムから ToDo を復元
pub fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<Todo, TodoError> {
    let id = TodoId::parse(string_attr(item, "id")?)
        .map_err(|_| TodoError::store("stored todo has an invalid id"))?;
    let owner_id = UserId::parse(string_attr(item, "owner_id")?)
        .ok_or_else(|| TodoError::store(format!("stored todo {id} has an invalid owner_id")))?;
    let created_at = DateTime::parse_from_rfc3339(string_attr(item, "created_at")?)
        .map_err(|e| TodoError::store(format!("stored todo {id} has an invalid created_at: {e}")))?
        .with_timezone(&Utc);
    let description = match item.get("description") {
        Some(_) => Some(string_attr(item, "description")?.to_string()),
        None => None,
    };

    Ok(Todo {
        id,
        title: string_attr(item, "title")?.to_string(),
        description,
        owner_id,
        created_at,
    })
}

fn string_attr<'a>(
    item: &'a HashMap<String, AttributeValue>,
    name: &str,
) -> Result<&'a str, TodoError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| TodoError::store(format!("attribute {name} missing or not a string")))
}
