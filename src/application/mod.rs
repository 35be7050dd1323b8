pub mod dictation;
pub mod focus;
pub mod gesture;
pub mod list_session;


pub use list_session::ListSession;
