//! CLI configuration.
//!
//! Precedence, highest first: command-line flags, `ERATE_*` environment
//! variables, then the defaults compiled into `erate-client`.

use std::env::vars;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use erate_client::ClientConfig;
use erate_store::{FileStore, KeyValueStore};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    erate_api_url: Option<String>,
    erate_store_path: Option<PathBuf>,
    erate_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    client: ClientConfig,
    store_path: Option<PathBuf>,
}

impl CliConfig {
    /// Read the environment and apply `api_url` from the command line on top.
    pub fn init(api_url: Option<String>) -> Result<Self> {
        let raw: RawConfig =
            serde_env::from_iter(vars()).context("Failed to read ERATE_* environment variables")?;
        Ok(Self::from_raw(raw, api_url))
    }

    fn from_raw(raw: RawConfig, api_url: Option<String>) -> Self {
        let RawConfig {
            erate_api_url,
            erate_store_path,
            erate_timeout_secs,
        } = raw;

        let mut client = match api_url.or(erate_api_url) {
            Some(url) => {
                info!("Using API URL {url}");
                ClientConfig::new(url)
            }
            None => ClientConfig::default(),
        };
        if let Some(secs) = erate_timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }

        Self {
            client,
            store_path: erate_store_path,
        }
    }

    pub fn client(&self) -> &ClientConfig {
        &self.client
    }

    /// Store file: `ERATE_STORE_PATH` or the platform config directory.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => FileStore::default_path().context("Failed to determine config directory"),
        }
    }

    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        let path = self.store_path()?;
        info!("Using store {}", path.display());
        Ok(Arc::new(FileStore::new(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_default_url() {
        let raw: RawConfig = serde_env::from_iter(vec![
            ("ERATE_API_URL", "http://localhost:9000/"),
            ("ERATE_TIMEOUT_SECS", "30"),
            ("UNRELATED", "x"),
        ])
        .expect("RawConfig should deserialize");

        let config = CliConfig::from_raw(raw, None);
        assert_eq!(config.client().api_base_url, "http://localhost:9000");
        assert_eq!(config.client().timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_flag_beats_env() {
        let raw: RawConfig = serde_env::from_iter(vec![("ERATE_API_URL", "http://env")])
            .expect("RawConfig should deserialize");

        let config = CliConfig::from_raw(raw, Some("http://flag".to_owned()));
        assert_eq!(config.client().api_base_url, "http://flag");
    }

    #[test]
    fn test_defaults_without_env() {
        let config = CliConfig::from_raw(RawConfig::default(), None);
        assert_eq!(config.client(), &ClientConfig::default());
        assert_eq!(config.client().timeout, None);
    }

    #[test]
    fn test_store_path_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.toml");
        let raw: RawConfig = serde_env::from_iter(vec![(
            "ERATE_STORE_PATH",
            path.to_str().expect("utf-8 path"),
        )])
        .expect("RawConfig should deserialize");

        let config = CliConfig::from_raw(raw, None);
        assert_eq!(config.store_path().expect("path"), path);

        let store = config.open_store().expect("store");
        store.set("k", "v").expect("write");
        assert!(path.exists());
    }
}
