use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};
use tokio::sync::OnceCell;

use crate::domain::{
    error::{StorageError, TodoError, TodoResult},
    repository::ListStore,
    todo_list::{ListId, Task, TodoList},
};

#[derive(Clone)]
pub struct SqliteListStore {
    pool: Arc<Pool<Sqlite>>,
    schema: Arc<OnceCell<()>>,
}

impl SqliteListStore {
    /// Opens the pool. The schema is created lazily by the first operation.
    pub async fn connect(database_url: &str) -> TodoResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = if is_in_memory(database_url) {
            // Each connection to :memory: is a separate database, so pin a single one.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().max_connections(5).connect_with(options).await?
        };
        Ok(Self { pool: Arc::new(pool), schema: Arc::new(OnceCell::new()) })
    }

    /// Waits for the schema, creating it if nobody has yet. Concurrent callers
    /// share the same initialization.
    async fn ready(&self) -> TodoResult<&Pool<Sqlite>> {
        self.schema.get_or_try_init(|| create_schema(&self.pool)).await?;
        Ok(&*self.pool)
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

async fn create_schema(pool: &Pool<Sqlite>) -> TodoResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS todo_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            tasks TEXT NOT NULL,
            last_modified INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    // Not used by any query yet; part of the record layout.
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_todo_lists_title ON todo_lists (title)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_todo_lists_last_modified ON todo_lists (last_modified)")
        .execute(pool)
        .await?;
    tracing::info!("todo_lists schema ready");
    Ok(())
}

#[async_trait]
impl ListStore for SqliteListStore {
    async fn init(&self) -> TodoResult<()> {
        self.ready().await?;
        Ok(())
    }

    async fn list_all(&self) -> TodoResult<Vec<TodoList>> {
        let pool = self.ready().await?;
        let rows = sqlx::query("SELECT id, title, tasks, last_modified FROM todo_lists")
            .fetch_all(pool)
            .await?;
        rows.into_iter().map(row_to_list).collect()
    }

    async fn get(&self, id: ListId) -> TodoResult<TodoList> {
        let pool = self.ready().await?;
        let row = sqlx::query("SELECT id, title, tasks, last_modified FROM todo_lists WHERE id = ?1")
            .bind(id.0)
            .fetch_optional(pool)
            .await?;
        match row {
            Some(row) => row_to_list(row),
            None => Err(TodoError::list_not_found(id)),
        }
    }

    async fn save(&self, list: &mut TodoList) -> TodoResult<ListId> {
        let pool = self.ready().await?;
        let tasks = serde_json::to_string(&list.tasks).map_err(StorageError::Encode)?;
        let now = Utc::now().timestamp_millis();

        let id = match list.id {
            None => {
                let result = sqlx::query("INSERT INTO todo_lists (title, tasks, last_modified) VALUES (?1, ?2, ?3)")
                    .bind(&list.title)
                    .bind(&tasks)
                    .bind(now)
                    .execute(pool)
                    .await?;
                ListId(result.last_insert_rowid())
            }
            Some(id) => {
                let result = sqlx::query("UPDATE todo_lists SET title = ?2, tasks = ?3, last_modified = ?4 WHERE id = ?1")
                    .bind(id.0)
                    .bind(&list.title)
                    .bind(&tasks)
                    .bind(now)
                    .execute(pool)
                    .await?;
                // A deleted list stays deleted: never upsert.
                if result.rows_affected() == 0 {
                    tracing::warn!(%id, "save rejected, list no longer exists");
                    return Err(TodoError::list_not_found(id));
                }
                id
            }
        };

        list.id = Some(id);
        list.last_modified = from_millis(now);
        tracing::debug!(%id, tasks = list.tasks.len(), "list saved");
        Ok(id)
    }

    async fn delete(&self, id: ListId) -> TodoResult<()> {
        let pool = self.ready().await?;
        let result = sqlx::query("DELETE FROM todo_lists WHERE id = ?1")
            .bind(id.0)
            .execute(pool)
            .await?;
        tracing::debug!(%id, removed = result.rows_affected(), "list deleted");
        Ok(())
    }
}

fn from_millis(ms: i64) -> DateTime<Utc> { DateTime::from_timestamp_millis(ms).unwrap_or_default() }

fn row_to_list(row: SqliteRow) -> TodoResult<TodoList> {
    let id = ListId(row.try_get("id")?);
    let title: String = row.try_get("title")?;
    let tasks_json: String = row.try_get("tasks")?;
    let last_modified: i64 = row.try_get("last_modified")?;

    let tasks: Vec<Task> = serde_json::from_str(&tasks_json).map_err(|source| StorageError::Corrupt { id, source })?;

    Ok(TodoList { id: Some(id), title, tasks, last_modified: from_millis(last_modified) })
}
