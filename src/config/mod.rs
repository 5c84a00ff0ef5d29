use crate::errors::{AppError, AppResult};
use crate::models::DEFAULT_LIST_NAME;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_list_name")]
    pub default_list_name: String,
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

fn default_list_name() -> String {
    DEFAULT_LIST_NAME.to_string()
}

fn default_session_file() -> String {
    Config::session_file_path().to_string_lossy().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            default_list_name: default_list_name(),
            session_file: default_session_file(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("listinha")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".listinha")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("listinha.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("listinha.sqlite")
    }

    /// Return the full path of the cached session token
    pub fn session_file_path() -> PathBuf {
        Self::config_dir().join("listinha.session")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("could not parse {}: {e}", path.display())))
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB path: user provided or default
        let db_path = match custom_db {
            Some(raw) => crate::utils::path::resolve_db_path(&raw, &dir),
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Self::default()
        };

        // Write config file (skipped in test mode so test runs never
        // touch the real one)
        if !is_test {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| AppError::Config(format!("could not serialize config: {e}")))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        Ok(config)
    }
}
