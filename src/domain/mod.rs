pub mod error;
pub mod repository;
pub mod settings;
pub mod speech;
pub mod todo_list;
