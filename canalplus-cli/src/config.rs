use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;

use canalplus_catalog::{CatalogConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use canalplus_engine::{
    DEFAULT_CHUNK_SIZE, DEFAULT_CONVERTERS, DEFAULT_PROGRESS_RATE, DownloadConfig, ProgressStyle,
    RemuxConfig,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};

const CONFIG_DIR: &str = "canalplus";
const CONFIG_FILE: &str = "config.toml";

/// Settings read from the TOML configuration file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api_base_url: String,
    pub user_agent: String,
    pub http_timeout_secs: f64,
    pub chunk_size: usize,
    pub progress_style: String,
    pub progress_rate: u32,
    pub converters: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_style: ProgressStyle::default().to_string(),
            progress_rate: DEFAULT_PROGRESS_RATE,
            converters: DEFAULT_CONVERTERS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load `path`, or the per-user file when no path is given.
    ///
    /// A missing per-user file means defaults; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!("Loaded configuration from '{}'", path.display());
                Self::parse(&text)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => Ok(Self::default()),
            Err(e) => Err(AppError::Config(format!(
                "cannot read '{}': {e}",
                path.display()
            ))),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn timeout(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.http_timeout_secs)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .ok_or_else(|| {
                AppError::Config(format!(
                    "invalid http_timeout_secs {}",
                    self.http_timeout_secs
                ))
            })
    }

    pub fn catalog_config(&self) -> Result<CatalogConfig> {
        Ok(CatalogConfig {
            base_url: self.api_base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.timeout()?,
        })
    }

    /// Download settings; the progress display is turned off when `quiet`,
    /// and terminal displays are turned off when stdout is not a terminal.
    pub fn download_config(&self, quiet: bool) -> Result<DownloadConfig> {
        let style: ProgressStyle = self.progress_style.parse().map_err(AppError::Config)?;
        Ok(DownloadConfig {
            chunk_size: self.chunk_size,
            timeout: self.timeout()?,
            progress_style: effective_style(style, quiet, io::stdout().is_terminal()),
            progress_rate: self.progress_rate,
        })
    }

    pub fn remux_config(&self, verbose: bool) -> RemuxConfig {
        RemuxConfig {
            converters: self.converters.clone(),
            verbose,
        }
    }
}

fn effective_style(style: ProgressStyle, quiet: bool, terminal: bool) -> ProgressStyle {
    match style {
        _ if quiet => ProgressStyle::None,
        ProgressStyle::Zenity => ProgressStyle::Zenity,
        _ if !terminal => ProgressStyle::None,
        style => style,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!((config.timeout().unwrap().as_secs_f64() - 9.1).abs() < 1e-6);
        assert_eq!(config.converters, vec!["ffmpeg", "avconv"]);
    }

    #[test]
    fn test_partial_file() {
        let config = AppConfig::parse(
            r#"
            http_timeout_secs = 20
            progress_style = "zenity"
            converters = ["/opt/ffmpeg/bin/ffmpeg"]
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(20));
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(
            config.download_config(false).unwrap().progress_style,
            ProgressStyle::Zenity
        );
        assert_eq!(
            config.remux_config(true).converters,
            vec!["/opt/ffmpeg/bin/ffmpeg"]
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(AppConfig::parse("chunk_size = \"big\"").is_err());
        assert!(AppConfig::parse("unknown_key = 1").is_err());

        let config = AppConfig::parse("progress_style = \"rainbow\"").unwrap();
        assert!(matches!(
            config.download_config(false),
            Err(AppError::Config(_))
        ));

        let config = AppConfig::parse("http_timeout_secs = 0.0").unwrap();
        assert!(config.catalog_config().is_err());
    }

    #[test]
    fn test_effective_style() {
        assert_eq!(
            effective_style(ProgressStyle::Bar, false, true),
            ProgressStyle::Bar
        );
        assert_eq!(
            effective_style(ProgressStyle::Bar, false, false),
            ProgressStyle::None
        );
        assert_eq!(
            effective_style(ProgressStyle::Zenity, false, false),
            ProgressStyle::Zenity
        );
        assert_eq!(
            effective_style(ProgressStyle::Zenity, true, false),
            ProgressStyle::None
        );
    }

    #[test]
    fn test_load_explicit_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(AppConfig::load(Some(&path)).is_err());

        std::fs::write(&path, "user_agent = \"test-agent\"\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.catalog_config().unwrap().user_agent, "test-agent");
    }
}
