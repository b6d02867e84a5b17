//! Settings from `grid.toml`, the environment and the command line.
//!
//! Precedence, highest first: command line, `GRID_METADATA_DIR` (metadata
//! root only), config file, built-in default.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "grid.toml";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub const DEFAULT_METADATA_ROOT: &str = "metadata";
pub const DEFAULT_DATA_ROOT: &str = "data";

/// Contents of `grid.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub listen: Option<String>,
    pub metadata_root: Option<PathBuf>,
    pub data_root: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load `explicit` if given, else `grid.toml` in `dir` when present.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config file");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen: Option<SocketAddr>,
    pub metadata_root: Option<PathBuf>,
    pub data_root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub listen: SocketAddr,
    pub metadata_root: PathBuf,
    pub data_root: PathBuf,
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
        env_metadata_root: Option<PathBuf>,
    ) -> Result<Self> {
        let listen = match overrides.listen {
            Some(addr) => addr,
            None => {
                let raw = file.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
                raw.parse()
                    .with_context(|| format!("invalid listen address {raw:?}"))?
            }
        };
        let metadata_root = overrides
            .metadata_root
            .or(env_metadata_root)
            .or(file.metadata_root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_METADATA_ROOT));
        let data_root = overrides
            .data_root
            .or(file.data_root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT));
        Ok(Self {
            listen,
            metadata_root,
            data_root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings =
            Settings::resolve(FileConfig::parse("").unwrap(), Overrides::default(), None).unwrap();
        assert_eq!(settings.listen.to_string(), DEFAULT_LISTEN);
        assert_eq!(settings.metadata_root, PathBuf::from("metadata"));
        assert_eq!(settings.data_root, PathBuf::from("data"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("port = 8080").is_err());
    }

    #[test]
    fn bad_listen_address_is_an_error() {
        let file = FileConfig::parse(r#"listen = "localhost""#).unwrap();
        let err = Settings::resolve(file, Overrides::default(), None).unwrap_err();
        assert!(err.to_string().contains("invalid listen address"));
    }
}
