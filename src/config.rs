use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::constants;

/// Persisted configuration, read from `config.toml` in the project config dir.
/// Every field is optional; missing values fall back to the embedded defaults.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct Config {
  pub endpoint: Option<String>,
  pub timeout_secs: Option<u64>,
  pub download_dir: Option<PathBuf>,
  pub theme_name: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "gramgrab") {
      let config_file = proj_dirs.config_dir().join("config.toml");
      if let Ok(content) = std::fs::read_to_string(config_file)
        && let Ok(config) = toml::from_str(&content)
      {
        return config;
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "gramgrab") {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("config.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }
}

/// Effective settings after merging CLI overrides, the config file, and
/// embedded defaults — CLI wins, then the file, then defaults.
#[derive(Debug, Clone)]
pub struct Settings {
  pub endpoint: String,
  pub timeout: Duration,
  pub download_dir: PathBuf,
}

impl Settings {
  pub fn resolve(
    config: &Config,
    cli_endpoint: Option<String>,
    cli_timeout_secs: Option<u64>,
    cli_download_dir: Option<PathBuf>,
  ) -> Self {
    let endpoint = cli_endpoint
      .or_else(|| config.endpoint.clone())
      .unwrap_or_else(|| constants().default_endpoint.clone());
    let timeout_secs =
      cli_timeout_secs.or(config.timeout_secs).unwrap_or(constants().request_timeout_secs);
    let download_dir = cli_download_dir
      .or_else(|| config.download_dir.clone())
      .unwrap_or_else(default_download_dir);
    Self { endpoint, timeout: Duration::from_secs(timeout_secs), download_dir }
  }
}

/// The user's download directory, or the current directory when the platform
/// doesn't expose one (e.g. headless environments).
fn default_download_dir() -> PathBuf {
  UserDirs::new()
    .and_then(|dirs| dirs.download_dir().map(|p| p.to_path_buf()))
    .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn settings_fall_back_to_embedded_defaults() {
    let settings = Settings::resolve(&Config::default(), None, None, None);
    assert_eq!(settings.endpoint, constants().default_endpoint);
    assert_eq!(settings.timeout, Duration::from_secs(constants().request_timeout_secs));
  }

  #[test]
  fn settings_prefer_config_file_over_defaults() {
    let config = Config {
      endpoint: Some("http://example.test/resolve".to_string()),
      timeout_secs: Some(5),
      download_dir: Some(PathBuf::from("/tmp/media")),
      theme_name: None,
    };
    let settings = Settings::resolve(&config, None, None, None);
    assert_eq!(settings.endpoint, "http://example.test/resolve");
    assert_eq!(settings.timeout, Duration::from_secs(5));
    assert_eq!(settings.download_dir, PathBuf::from("/tmp/media"));
  }

  #[test]
  fn settings_prefer_cli_over_config_file() {
    let config = Config { endpoint: Some("http://file.test/resolve".to_string()), ..Config::default() };
    let settings =
      Settings::resolve(&config, Some("http://cli.test/resolve".to_string()), Some(2), None);
    assert_eq!(settings.endpoint, "http://cli.test/resolve");
    assert_eq!(settings.timeout, Duration::from_secs(2));
  }

  #[test]
  fn config_toml_roundtrip() {
    let config = Config {
      endpoint: Some("http://example.test/resolve".to_string()),
      timeout_secs: Some(10),
      download_dir: None,
      theme_name: Some("paper".to_string()),
    };
    let toml = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&toml).unwrap();
    assert_eq!(parsed.endpoint, config.endpoint);
    assert_eq!(parsed.timeout_secs, config.timeout_secs);
    assert_eq!(parsed.theme_name, config.theme_name);
  }
}
