use std::collections::BTreeMap;

use api::v1::{NewTodo, Stats, Todo, TodoPatch};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// The in-memory todo table.
///
/// Ids come from a counter that only moves forward, so the map's id order is
/// also creation order.
#[derive(Debug)]
pub struct TodoStore {
    table: Mutex<TodoTable>,
}

#[derive(Debug)]
struct TodoTable {
    next_id: u64,
    todos: BTreeMap<u64, Todo>,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self {
            table: Mutex::new(TodoTable {
                next_id: 1,
                todos: BTreeMap::new(),
            }),
        }
    }
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self, completed: Option<bool>) -> Vec<Todo> {
        let table = self.table.lock().await;
        table
            .todos
            .values()
            .filter(|todo| completed.map_or(true, |completed| todo.completed == completed))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: u64) -> Result<Todo> {
        let table = self.table.lock().await;
        table
            .todos
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub async fn create(&self, new: NewTodo) -> Todo {
        let mut table = self.table.lock().await;

        let id = table.next_id;
        table.next_id += 1;

        let now = Utc::now();
        let todo = Todo {
            id,
            title: new.title,
            description: new.description,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        table.todos.insert(id, todo.clone());

        info!(
            id = todo.id,
            title = %todo.title,
            "created todo"
        );

        todo
    }

    /// Applies the fields present in `patch`. An empty patch leaves the
    /// record, including `updated_at`, untouched.
    pub async fn update(&self, id: u64, patch: TodoPatch) -> Result<Todo> {
        let mut table = self.table.lock().await;
        let todo = table
            .todos
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if patch.is_empty() {
            debug!(id, "empty update");
            return Ok(todo.clone());
        }

        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(description) = patch.description {
            todo.description = description;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        todo.updated_at = Utc::now().max(todo.created_at);

        info!(
            id = todo.id,
            title = %todo.title,
            completed = todo.completed,
            "updated todo"
        );

        Ok(todo.clone())
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        let mut table = self.table.lock().await;
        table
            .todos
            .remove(&id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        info!(id, "deleted todo");

        Ok(())
    }

    pub async fn stats(&self) -> Stats {
        let table = self.table.lock().await;
        let completed = table.todos.values().filter(|todo| todo.completed).count();
        Stats::from_counts(table.todos.len(), completed)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use api::v1::CreateTodo;

    use super::*;

    fn new_todo(title: &str) -> NewTodo {
        CreateTodo::new(title).validate().unwrap()
    }

    fn complete() -> TodoPatch {
        TodoPatch {
            completed: Some(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = TodoStore::new();

        for expected in 1..=3 {
            let todo = store.create(new_todo("task")).await;
            assert_eq!(todo.id, expected);
            assert!(!todo.completed);
            assert_eq!(todo.created_at, todo.updated_at);
        }
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = TodoStore::new();
        store.create(new_todo("first")).await;
        let second = store.create(new_todo("second")).await;

        store.delete(second.id).await.unwrap();
        assert!(matches!(
            store.get(second.id).await,
            Err(Error::NotFound(id)) if id == "2"
        ));

        let third = store.create(new_todo("third")).await;
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = TodoStore::new();
        store.create(new_todo("task")).await;

        assert!(matches!(
            store.get(999).await,
            Err(Error::NotFound(id)) if id == "999"
        ));
        assert!(matches!(
            store.update(999, complete()).await,
            Err(Error::NotFound(id)) if id == "999"
        ));
        assert!(matches!(
            store.delete(999).await,
            Err(Error::NotFound(id)) if id == "999"
        ));
    }

    #[tokio::test]
    async fn update_merges_present_fields() {
        let store = TodoStore::new();
        let new = CreateTodo::new("Original")
            .with_description("Original desc")
            .validate()
            .unwrap();
        let created = store.create(new).await;

        let patch = TodoPatch {
            title: Some(String::from("New Title")),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).await.unwrap();

        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.description.as_deref(), Some("Original desc"));
        assert!(!updated.completed);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn update_refreshes_updated_at() {
        let store = TodoStore::new();
        let created = store.create(new_todo("task")).await;

        tokio::time::sleep(Duration::from_millis(5)).await;

        let updated = store.update(created.id, complete()).await.unwrap();
        assert!(updated.completed);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_can_clear_description() {
        let store = TodoStore::new();
        let new = CreateTodo::new("task")
            .with_description("details")
            .validate()
            .unwrap();
        let created = store.create(new).await;

        let patch = TodoPatch {
            description: Some(None),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).await.unwrap();
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn empty_update_keeps_timestamp() {
        let store = TodoStore::new();
        let created = store.create(new_todo("task")).await;

        let updated = store
            .update(created.id, TodoPatch::default())
            .await
            .unwrap();
        assert_eq!(updated, created);
    }

    #[tokio::test]
    async fn list_filters_by_completion() {
        let store = TodoStore::new();
        let first = store.create(new_todo("first")).await;
        store.create(new_todo("second")).await;
        store.create(new_todo("third")).await;
        store.update(first.id, complete()).await.unwrap();

        let ids = |todos: Vec<Todo>| todos.into_iter().map(|todo| todo.id).collect::<Vec<_>>();
        assert_eq!(ids(store.list(None).await), [1, 2, 3]);
        assert_eq!(ids(store.list(Some(true)).await), [1]);
        assert_eq!(ids(store.list(Some(false)).await), [2, 3]);
    }

    #[tokio::test]
    async fn stats_counts_completed() {
        let store = TodoStore::new();
        assert_eq!(store.stats().await, Stats::from_counts(0, 0));

        let first = store.create(new_todo("first")).await;
        store.create(new_todo("second")).await;
        store.update(first.id, complete()).await.unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.completion_rate, "50.0%");
    }
}
