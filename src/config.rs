use crate::error::{HakiError, Result};
use crate::scoring::WpmConvention;
use crate::session::{SessionConfig, DEFAULT_DURATION_SECS};
use crate::typing_policy::InputPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub duration_secs: u32,
    pub competition: bool,
    pub input_policy: InputPolicy,
    pub wpm_convention: WpmConvention,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            competition: false,
            input_policy: InputPolicy::default(),
            wpm_convention: WpmConvention::default(),
        }
    }
}

impl Config {
    /// Validated engine settings.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mut cfg = SessionConfig::new(self.duration_secs)?;
        cfg.competition = self.competition;
        cfg.input_policy = self.input_policy;
        cfg.wpm_convention = self.wpm_convention;
        Ok(cfg)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typehaki") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("typehaki_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like [`ConfigStore::load`] but reports why the file could not be used.
    pub fn try_load(&self) -> Result<Config> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice::<Config>(&bytes)?)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(HakiError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
