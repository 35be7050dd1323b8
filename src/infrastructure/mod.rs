pub mod json_preferences;
pub mod speech;
pub mod sqlite_store;
