//! ToDo リソースの操作
//!
//! 呼び出し元とストアは毎回引数で受け取り、リクエスト間で状態は持たない。

use crate::caller::Caller;
use crate::errors::{TodoError, TodoResult};
use crate::repository::{TodoPage, TodoRepository};
use crate::todo::{Todo, TodoCreate, TodoId, TodoUpdate};
use tracing::{debug, info};

/// 一覧取得のデフォルト上限
pub const DEFAULT_LIMIT: usize = 100;

/// ToDo を作成する。所有者は入力に関係なく呼び出し元。
pub async fn create_todo(
    store: &dyn TodoRepository,
    caller: &Caller,
    input: TodoCreate,
) -> TodoResult<Todo> {
    input.validate()?;

    let todo = Todo::new(input, caller.id);
    store.insert(&todo).await?;

    info!(todo_id = %todo.id, owner_id = %todo.owner_id, "ToDoを作成しました");
    Ok(todo)
}

/// スーパーユーザーは全件、それ以外は自分の ToDo のみ
pub async fn list_todos(
    store: &dyn TodoRepository,
    caller: &Caller,
    skip: usize,
    limit: usize,
) -> TodoResult<TodoPage> {
    let page = store.list(caller.owner_scope(), skip, limit).await?;

    debug!(
        user_id = %caller.id,
        is_superuser = caller.is_superuser,
        skip,
        limit,
        returned = page.data.len(),
        count = page.count,
        "ToDo一覧を取得しました"
    );
    Ok(page)
}

pub async fn get_todo(
    store: &dyn TodoRepository,
    caller: &Caller,
    id: &TodoId,
) -> TodoResult<Todo> {
    load_authorized(store, caller, id).await
}

/// 指定されたフィールドのみ更新する（マージ）
pub async fn update_todo(
    store: &dyn TodoRepository,
    caller: &Caller,
    id: &TodoId,
    input: TodoUpdate,
) -> TodoResult<Todo> {
    let mut todo = load_authorized(store, caller, id).await?;
    input.validate()?;

    if input.is_empty() {
        return Ok(todo);
    }

    todo.apply(input);
    store.update(&todo).await?;

    info!(todo_id = %todo.id, user_id = %caller.id, "ToDoを更新しました");
    Ok(todo)
}

/// 物理削除。削除後の取得は `NotFound` になる。
pub async fn delete_todo(
    store: &dyn TodoRepository,
    caller: &Caller,
    id: &TodoId,
) -> TodoResult<()> {
    load_authorized(store, caller, id).await?;

    if !store.delete(id).await? {
        return Err(TodoError::NotFound(*id));
    }

    info!(todo_id = %id, user_id = %caller.id, "ToDoを削除しました");
    Ok(())
}

/// 存在確認 → 所有権確認の順で行う
async fn load_authorized(
    store: &dyn TodoRepository,
    caller: &Caller,
    id: &TodoId,
) -> TodoResult<Todo> {
    let todo = store.get(id).await?.ok_or(TodoError::NotFound(*id))?;
    caller.authorize(&todo)?;
    Ok(todo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::UserId;
    use crate::repository::InMemoryTodoRepository;

    fn create_input(title: &str) -> TodoCreate {
        TodoCreate {
            title: title.to_string(),
            description: Some("memo".to_string()),
        }
    }

    #[tokio::test]
    async fn test_buy_milk_scenario() {
        // Arrange
        let store = InMemoryTodoRepository::new();
        let alice = Caller::user(UserId::new());
        let bob = Caller::user(UserId::new());
        let admin = Caller::superuser(UserId::new());

        // Act
        let created = create_todo(&store, &alice, create_input("Buy milk"))
            .await
            .unwrap();

        // Assert
        let fetched = get_todo(&store, &alice, &created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.owner_id, alice.id);

        assert_eq!(
            get_todo(&store, &bob, &created.id).await,
            Err(TodoError::Forbidden)
        );
        assert_eq!(get_todo(&store, &admin, &created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_list_counts_scenario() {
        let store = InMemoryTodoRepository::new();
        let alice = Caller::user(UserId::new());
        let bob = Caller::user(UserId::new());
        let admin = Caller::superuser(UserId::new());

        for i in 0..3 {
            create_todo(&store, &alice, create_input(&format!("a{i}")))
                .await
                .unwrap();
        }
        for i in 0..2 {
            create_todo(&store, &bob, create_input(&format!("b{i}")))
                .await
                .unwrap();
        }

        let mine = list_todos(&store, &alice, 0, DEFAULT_LIMIT).await.unwrap();
        assert_eq!(mine.count, 3);
        assert_eq!(mine.data.len(), 3);
        assert!(mine.data.iter().all(|t| t.owner_id == alice.id));

        let all = list_todos(&store, &admin, 0, DEFAULT_LIMIT).await.unwrap();
        assert_eq!(all.count, 5);
        assert_eq!(all.data.len(), 5);

        let page = list_todos(&store, &alice, 0, 2).await.unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.data.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found_for_everyone() {
        let store = InMemoryTodoRepository::new();
        let missing = TodoId::new();

        for caller in [
            Caller::user(UserId::new()),
            Caller::superuser(UserId::new()),
        ] {
            assert_eq!(
                get_todo(&store, &caller, &missing).await,
                Err(TodoError::NotFound(missing))
            );
            assert_eq!(
                update_todo(&store, &caller, &missing, TodoUpdate::default()).await,
                Err(TodoError::NotFound(missing))
            );
            assert_eq!(
                delete_todo(&store, &caller, &missing).await,
                Err(TodoError::NotFound(missing))
            );
        }
    }

    #[tokio::test]
    async fn test_foreign_record_is_forbidden_for_update_and_delete() {
        let store = InMemoryTodoRepository::new();
        let alice = Caller::user(UserId::new());
        let bob = Caller::user(UserId::new());
        let todo = create_todo(&store, &alice, create_input("secret"))
            .await
            .unwrap();

        let update = TodoUpdate {
            title: Some("hijacked".to_string()),
            description: None,
        };
        assert_eq!(
            update_todo(&store, &bob, &todo.id, update).await,
            Err(TodoError::Forbidden)
        );
        assert_eq!(
            delete_todo(&store, &bob, &todo.id).await,
            Err(TodoError::Forbidden)
        );

        // 変更されていない
        assert_eq!(get_todo(&store, &alice, &todo.id).await.unwrap(), todo);
    }

    #[tokio::test]
    async fn test_superuser_can_update_and_delete_any_record() {
        let store = InMemoryTodoRepository::new();
        let alice = Caller::user(UserId::new());
        let admin = Caller::superuser(UserId::new());
        let todo = create_todo(&store, &alice, create_input("chores"))
            .await
            .unwrap();

        let updated = update_todo(
            &store,
            &admin,
            &todo.id,
            TodoUpdate {
                title: Some("laundry".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "laundry");
        assert_eq!(updated.owner_id, alice.id);

        delete_todo(&store, &admin, &todo.id).await.unwrap();
        assert_eq!(
            get_todo(&store, &alice, &todo.id).await,
            Err(TodoError::NotFound(todo.id))
        );
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let store = InMemoryTodoRepository::new();
        let alice = Caller::user(UserId::new());
        let todo = create_todo(&store, &alice, create_input("Buy milk"))
            .await
            .unwrap();

        let updated = update_todo(
            &store,
            &alice,
            &todo.id,
            TodoUpdate {
                title: Some("Buy bread".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "Buy bread");
        assert_eq!(updated.description, Some("memo".to_string()));
        assert_eq!(updated.owner_id, alice.id);
        assert_eq!(updated.created_at, todo.created_at);
        assert_eq!(get_todo(&store, &alice, &todo.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_invalid_input_does_not_touch_store() {
        let store = InMemoryTodoRepository::new();
        let alice = Caller::user(UserId::new());

        let err = create_todo(&store, &alice, create_input("")).await.unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
        assert_eq!(list_todos(&store, &alice, 0, 10).await.unwrap().count, 0);

        let todo = create_todo(&store, &alice, create_input("ok")).await.unwrap();
        let err = update_todo(
            &store,
            &alice,
            &todo.id,
            TodoUpdate {
                title: Some(String::new()),
                description: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
        assert_eq!(get_todo(&store, &alice, &todo.id).await.unwrap(), todo);
    }
}
