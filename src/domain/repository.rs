use async_trait::async_trait;

use super::error::TodoResult;
use super::settings::Settings;
use super::todo_list::{ListId, TodoList};

/// Durable collection of todo lists.
#[async_trait]
pub trait ListStore: Send + Sync + 'static {
    /// Sets up the schema. Idempotent; every other operation calls it implicitly.
    async fn init(&self) -> TodoResult<()>;
    /// Every stored list, in no particular order.
    async fn list_all(&self) -> TodoResult<Vec<TodoList>>;
    async fn get(&self, id: ListId) -> TodoResult<TodoList>;
    /// Inserts when `list.id` is `None`, otherwise overwrites that record. Writes the
    /// assigned id and the fresh `last_modified` back into `list`.
    ///
    /// Saving under an id that is no longer stored fails with `NotFound`.
    async fn save(&self, list: &mut TodoList) -> TodoResult<ListId>;
    /// Removing an id that does not exist succeeds.
    async fn delete(&self, id: ListId) -> TodoResult<()>;
}

/// Small key/value area for values that live outside the list collection.
/// Best-effort: reads fall back to defaults and write failures are only logged.
pub trait PreferenceStore: Send + Sync + 'static {
    fn active_list_id(&self) -> Option<ListId>;
    fn set_active_list_id(&self, id: Option<ListId>);
    /// Initializes and persists default settings on first access.
    fn settings(&self) -> Settings;
    fn save_settings(&self, settings: &Settings);
}
