//! Application settings
//!
//! Nothing is read from disk; every value has a fixed default resolved against
//! the user's home directory at startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::fetcher::preview::DEFAULT_PREVIEW_SIZE;

/// Browser-like User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/116.0";

/// Name of the download directory under the home directory
const DOWNLOAD_DIR_NAME: &str = "Fetched_Images";

/// Name of the application's own directory under the home directory
const APP_DIR_NAME: &str = ".image_fetcher";

// Define error types for config handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to create {name} directory {path}: {source}")]
    CreateDirectory {
        name: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Result type alias for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Paths {
    pub download_directory: PathBuf,
    pub log_directory: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Network {
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PreviewSettings {
    pub max_dimension: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    pub log_level: String,
    pub log_format: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub paths: Paths,
    pub network: Network,
    pub preview: PreviewSettings,
    pub logging: Logging,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_home(dirs::home_dir().as_deref())
    }
}

impl AppConfig {
    /// Build the default settings rooted at `home`, or at the working
    /// directory when no home directory is known.
    pub fn with_home(home: Option<&Path>) -> Self {
        let base = home.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

        Self {
            paths: Paths {
                download_directory: base.join(DOWNLOAD_DIR_NAME),
                log_directory: base.join(APP_DIR_NAME).join("logs"),
            },
            network: Network {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout_secs: 30,
            },
            preview: PreviewSettings {
                max_dimension: DEFAULT_PREVIEW_SIZE,
            },
            logging: Logging {
                log_level: "info".to_string(),
                log_format: "json".to_string(),
            },
        }
    }

    /// Create the download and log directories if they are missing.
    pub fn ensure_directories(&self) -> ConfigResult<()> {
        Self::create_dir("download", &self.paths.download_directory)?;
        Self::create_dir("log", &self.paths.log_directory)?;
        Ok(())
    }

    fn create_dir(name: &'static str, path: &Path) -> ConfigResult<()> {
        if !path.exists() {
            info!("Creating {} directory: {}", name, path.display());
        }
        fs::create_dir_all(path).map_err(|source| ConfigError::CreateDirectory {
            name,
            path: path.to_path_buf(),
            source,
        })
    }
}
