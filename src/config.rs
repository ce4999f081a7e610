//! Runtime configuration read from the environment.

use std::{env, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/state.json";
/// Window the page opens with before the user edits it.
pub const DEFAULT_PAGE_DAYS: usize = 14;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub default_days: usize,
}

impl AppConfig {
    /// Reads `PORT`, `APP_DATA_PATH` and `HABIT_DEFAULT_DAYS`; unset or
    /// unparseable values keep their defaults.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));
        let default_days = env::var("HABIT_DEFAULT_DAYS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_PAGE_DAYS);

        Self {
            port,
            data_path,
            default_days,
        }
    }
}
