use crate::storage::MemoryStore;
use crate::store::HabitStore;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

pub type SharedHabits = Arc<Mutex<HabitStore<MemoryStore>>>;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub default_days: usize,
    pub habits: SharedHabits,
}

impl AppState {
    pub fn new(data_path: PathBuf, default_days: usize, habits: HabitStore<MemoryStore>) -> Self {
        Self {
            data_path,
            default_days,
            habits: Arc::new(Mutex::new(habits)),
        }
    }
}
