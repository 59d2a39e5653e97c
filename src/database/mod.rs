pub mod manager;
pub mod memory_store;
pub mod models;
pub mod session_store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory_store::MemorySessionStore;
pub use session_store::{PgSessionStore, SessionStore};
