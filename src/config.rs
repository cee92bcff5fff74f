//! Runtime settings.
//!
//! Values come from, in order of precedence: command-line flags and their
//! environment variables, an optional YAML file passed with `--config`, and
//! the defaults below.
//!
//! ```yaml
//! proxy_url: http://127.0.0.1:8888/news
//! upstream_url: https://newsapi.org/v2
//! listen_address: 127.0.0.1:8888
//! data_dir: /home/me/.local/share/loopnews
//! request_timeout_secs: 15
//! ```

use crate::api::DEFAULT_UPSTREAM_URL;
use crate::cli::Cli;
use crate::error::{NewsError, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// The config file as written on disk; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub proxy_url: Option<String>,
    pub upstream_url: Option<String>,
    pub listen_address: Option<SocketAddr>,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    #[instrument(level = "info", fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| NewsError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: FileConfig = serde_yaml::from_str(&raw)
            .map_err(|e| NewsError::Config(format!("cannot parse {}: {e}", path.display())))?;
        debug!(?config, "Loaded config file");
        Ok(config)
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub proxy_url: String,
    pub upstream_url: String,
    pub listen_address: SocketAddr,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Settings {
    /// Resolve settings from parsed CLI arguments and the config file they
    /// point at, if any.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(Path::new(path))?,
            None => FileConfig::default(),
        };
        let settings = Self::merge(cli, file)?;
        info!(
            proxy_url = %settings.proxy_url,
            listen_address = %settings.listen_address,
            data_dir = %settings.data_dir.display(),
            "Resolved settings"
        );
        Ok(settings)
    }

    fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let listen_address = match cli.listen.or(file.listen_address) {
            Some(addr) => addr,
            None => DEFAULT_LISTEN_ADDRESS
                .parse()
                .map_err(|e| NewsError::Config(format!("bad default listen address: {e}")))?,
        };
        let data_dir = match cli.data_dir.clone().or(file.data_dir) {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let proxy_url = cli
            .proxy_url
            .clone()
            .or(file.proxy_url)
            .unwrap_or_else(|| format!("http://{listen_address}/news"));

        Ok(Self {
            proxy_url,
            upstream_url: file
                .upstream_url
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
            listen_address,
            data_dir,
            request_timeout: Duration::from_secs(
                file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }
}

/// `<platform data dir>/loopnews`.
fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("loopnews"))
        .ok_or_else(|| NewsError::Config("could not find a data directory; pass --data-dir".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["loopnews", "--data-dir", "/tmp/ln", "bookmarks", "list"]);
        let settings = Settings::merge(&cli, FileConfig::default()).unwrap();

        assert_eq!(settings.listen_address, "127.0.0.1:8888".parse().unwrap());
        assert_eq!(settings.proxy_url, "http://127.0.0.1:8888/news");
        assert_eq!(settings.upstream_url, "https://newsapi.org/v2");
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/ln"));
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_file_values_apply_and_cli_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "proxy_url: http://news.internal/news\nlisten_address: 0.0.0.0:9000\ndata_dir: /var/lib/ln\nrequest_timeout_secs: 3"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from(["loopnews", "-c", &path, "--data-dir", "/tmp/override", "bookmarks", "list"]);
        let settings = Settings::resolve(&cli).unwrap();

        assert_eq!(settings.proxy_url, "http://news.internal/news");
        assert_eq!(settings.listen_address, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/override"));
        assert_eq!(settings.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key: leaked").unwrap();
        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, NewsError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = FileConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, NewsError::Config(_)));
    }
}
