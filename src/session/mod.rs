mod schema;
mod storage;

pub use schema::Session;
pub use storage::{get_session_path, load_session, resolve_session_path, write_session};
