use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "typehaki")
    }

    /// Directory for runtime logs; prefers `~/.local/state/typehaki`.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("typehaki"))
        } else {
            Self::project().map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("typehaki.log"))
    }

    pub fn results_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.data_dir().join("results.csv"))
    }

    pub fn access_store_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.data_dir().join("registrations.json"))
    }
}
