use crate::models::{
    item_to_todo, owner_partition_key, todo_to_item, TodoKeys, ENTITY_TYPE_TODO, OWNER_INDEX,
};
use crate::DynamoDbClient;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue, Select};
use domain::{Todo, TodoError, TodoId, TodoPage, TodoRepository, TodoResult, UserId};
use std::collections::HashMap;
use tracing::debug;

type Item = HashMap<String, AttributeValue>;

/// Query/Scan 1 ページ分の結果
struct Chunk {
    items: Vec<Item>,
    count: usize,
    last_evaluated_key: Option<Item>,
}

/// DynamoDB を使った ToDo リポジトリ
///
/// 所有者ごとの一覧は GSI1 への Query、全件は Scan で取得する。
#[derive(Clone)]
pub struct DynamoDbTodoRepository {
    db: DynamoDbClient,
}

impl DynamoDbTodoRepository {
    pub fn new(db: DynamoDbClient) -> Self {
        Self { db }
    }

    async fn fetch_chunk(
        &self,
        owner: Option<UserId>,
        select: Select,
        start_key: Option<Item>,
    ) -> TodoResult<Chunk> {
        match owner {
            Some(owner) => {
                let output = self
                    .db
                    .client()
                    .query()
                    .table_name(self.db.table_name())
                    .index_name(OWNER_INDEX)
                    .key_condition_expression("GSI1PK = :owner")
                    .expression_attribute_values(
                        ":owner",
                        AttributeValue::S(owner_partition_key(&owner)),
                    )
                    .scan_index_forward(true)
                    .select(select)
                    .set_exclusive_start_key(start_key)
                    .send()
                    .await
                    .map_err(|e| self.db.convert_error(e))?;

                Ok(Chunk {
                    items: output.items.unwrap_or_default(),
                    count: output.count.max(0) as usize,
                    last_evaluated_key: output.last_evaluated_key,
                })
            }
            None => {
                let output = self
                    .db
                    .client()
                    .scan()
                    .table_name(self.db.table_name())
                    .filter_expression("EntityType = :entity_type")
                    .expression_attribute_values(
                        ":entity_type",
                        AttributeValue::S(ENTITY_TYPE_TODO.to_string()),
                    )
                    .select(select)
                    .set_exclusive_start_key(start_key)
                    .send()
                    .await
                    .map_err(|e| self.db.convert_error(e))?;

                Ok(Chunk {
                    items: output.items.unwrap_or_default(),
                    count: output.count.max(0) as usize,
                    last_evaluated_key: output.last_evaluated_key,
                })
            }
        }
    }

    /// 対象範囲全体の件数
    async fn count(&self, owner: Option<UserId>) -> TodoResult<usize> {
        let mut total = 0;
        let mut start_key = None;
        loop {
            let chunk = self.fetch_chunk(owner, Select::Count, start_key).await?;
            total += chunk.count;
            match chunk.last_evaluated_key {
                Some(key) => start_key = Some(key),
                None => return Ok(total),
            }
        }
    }

    /// 先頭から `wanted` 件まで読み進める
    async fn collect(&self, owner: Option<UserId>, wanted: usize) -> TodoResult<Vec<Todo>> {
        let mut todos = Vec::new();
        let mut start_key = None;
        while todos.len() < wanted {
            let chunk = self
                .fetch_chunk(owner, Select::AllAttributes, start_key)
                .await?;
            for item in &chunk.items {
                todos.push(item_to_todo(item)?);
            }
            match chunk.last_evaluated_key {
                Some(key) => start_key = Some(key),
                None => break,
            }
        }
        Ok(todos)
    }
}

#[async_trait]
impl TodoRepository for DynamoDbTodoRepository {
    async fn get(&self, id: &TodoId) -> TodoResult<Option<Todo>> {
        let output = self
            .db
            .client()
            .get_item()
            .table_name(self.db.table_name())
            .set_key(Some(TodoKeys::for_todo(id).to_key_map()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| self.db.convert_error(e))?;

        output.item.as_ref().map(item_to_todo).transpose()
    }

    async fn list(
        &self,
        owner: Option<UserId>,
        skip: usize,
        limit: usize,
    ) -> TodoResult<TodoPage> {
        let count = self.count(owner).await?;
        let data = if limit == 0 || skip >= count {
            Vec::new()
        } else {
            self.collect(owner, skip.saturating_add(limit))
                .await?
                .into_iter()
                .skip(skip)
                .take(limit)
                .collect()
        };

        debug!(count, returned = data.len(), "DynamoDBからToDo一覧を取得しました");
        Ok(TodoPage { data, count })
    }

    async fn insert(&self, todo: &Todo) -> TodoResult<()> {
        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(todo_to_item(todo)))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| {
                let duplicate = e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception());
                if duplicate {
                    TodoError::store(format!("duplicate todo id: {}", todo.id))
                } else {
                    self.db.convert_error(e)
                }
            })?;
        Ok(())
    }

    async fn update(&self, todo: &Todo) -> TodoResult<()> {
        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(todo_to_item(todo)))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception());
                if missing {
                    TodoError::NotFound(todo.id)
                } else {
                    self.db.convert_error(e)
                }
            })?;
        Ok(())
    }

    async fn delete(&self, id: &TodoId) -> TodoResult<bool> {
        let output = self
            .db
            .client()
            .delete_item()
            .table_name(self.db.table_name())
            .set_key(Some(TodoKeys::for_todo(id).to_key_map()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| self.db.convert_error(e))?;

        Ok(output.attributes.is_some_and(|attrs| !attrs.is_empty()))
    }
}
