use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one CSV file per record kind.
    pub data_dir: PathBuf,
    /// Rows of recent attendance on the dashboard.
    pub recent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            recent_limit: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_dir: lookup("PORTAL_DATA_DIR")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            recent_limit: lookup("PORTAL_RECENT_LIMIT")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.recent_limit),
        }
    }
}
