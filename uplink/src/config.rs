//! Deploy settings, resolved once at startup.

use auth::key::DEFAULT_KEY_FILES;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read from the working directory when present; defaults otherwise.
pub const SETTINGS_FILE: &str = "uplink.yaml";

fn default_key_paths() -> Vec<PathBuf> {
    DEFAULT_KEY_FILES.iter().map(PathBuf::from).collect()
}

fn default_local_template() -> PathBuf {
    PathBuf::from("remote-config.json")
}

fn default_merged_output() -> Option<PathBuf> {
    Some(PathBuf::from("remote-config.merged.json"))
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    /// Target project. May instead come from the service-account key.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Ordered candidate paths for the service-account key.
    #[serde(default = "default_key_paths")]
    pub key_paths: Vec<PathBuf>,

    /// The locally-authored parameter document.
    #[serde(default = "default_local_template")]
    pub local_template: PathBuf,

    /// Where the merged template is written for inspection before the
    /// publish. `null` disables the side file.
    #[serde(default = "default_merged_output")]
    pub merged_output: Option<PathBuf>,

    /// Service base URL override, for tests and staging.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            project_id: None,
            key_paths: default_key_paths(),
            local_template: default_local_template(),
            merged_output: default_merged_output(),
            endpoint: None,
        }
    }
}

impl Settings {
    /// Settings file in the working directory, or defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(SETTINGS_FILE);
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Settings::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let settings = serde_yaml::from_reader(file)?;

        Ok(settings)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load settings from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse settings: {0}")]
    ParseError(#[from] serde_yaml::Error),
}
