//! Configuration and data-directory resolution for quizsync.

use anyhow::{Context, Result};
use quiz_client::Config;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "quizsync.toml";

/// Resolved configuration plus the directory holding local state.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Client configuration, data paths already absolute.
    pub config: Config,
    /// Directory for the database and queue file.
    pub data_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from command-line overrides.
    ///
    /// The config file is `explicit` if given, else `<config dir>/quizsync.toml`
    /// when it exists, else built-in defaults.
    pub fn resolve(explicit: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let dirs = directories::ProjectDirs::from("io", "quizsync", "quizsync");

        let config = match explicit {
            Some(path) => Config::from_file(path)?,
            None => match dirs.as_ref().map(|d| d.config_dir().join(CONFIG_FILE)) {
                Some(path) if path.exists() => Config::from_file(&path)?,
                _ => Config::default(),
            },
        };

        let data_dir = match data_dir {
            Some(dir) => dir,
            None => dirs
                .as_ref()
                .map(|d| d.data_dir().to_path_buf())
                .context("Could not determine home directory")?,
        };

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        Ok(Self {
            config: config.with_data_dir(&data_dir),
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_file_and_data_dir() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        std::fs::write(
            &config_path,
            "[server]\nbase_url = \"http://127.0.0.1:1\"\n[queue]\npath = \"outbox\"\n",
        )
        .unwrap();
        let data_dir = dir.path().join("data");

        let settings = Settings::resolve(Some(&config_path), Some(data_dir.clone())).unwrap();

        assert!(data_dir.is_dir());
        assert_eq!(settings.config.server.base_url, "http://127.0.0.1:1");
        assert_eq!(settings.config.queue.path, data_dir.join("outbox"));
        assert_eq!(settings.config.cache.database, data_dir.join("quizsync.db"));
    }

    #[test]
    fn unreadable_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(Settings::resolve(Some(&missing), Some(dir.path().to_path_buf())).is_err());
    }
}
