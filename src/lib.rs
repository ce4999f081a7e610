pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod stats;
pub mod storage;
pub mod store;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::{load_store, persist_store, KeyValueStore, MemoryStore};
pub use store::HabitStore;
