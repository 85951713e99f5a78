use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::NetworkId;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Network selected at startup
    pub network: Option<NetworkId>,

    /// Address prefilled in the input box
    pub address: Option<String>,

    /// Per-probe timeout in milliseconds
    pub timeout_ms: Option<u64>,

    pub log_level: Option<String>,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }
}

/// Result of loading the config file
#[derive(Debug, Default)]
pub struct Loaded {
    pub config: Config,
    /// Set when a file existed but could not be parsed
    pub warning: Option<String>,
}

pub fn load() -> Loaded {
    let Some(path) = config_path() else {
        return Loaded::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Loaded::default(),
    };
    parse(&content).unwrap_or_else(|err| Loaded {
        config: Config::default(),
        warning: Some(format!("Ignoring {}: {}", path.display(), err)),
    })
}

fn parse(content: &str) -> Result<Loaded, toml::de::Error> {
    let config = toml::from_str::<Config>(content)?;
    Ok(Loaded {
        config,
        warning: None,
    })
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("QUARTZ_SIGNAL_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("quartz-signal").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("quartz-signal").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "quartz-signal", "quartz-signal")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("quartz-signal"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("quartz-signal"));
    }
    directories::ProjectDirs::from("io", "quartz-signal", "quartz-signal")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_file_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("quartz-signal.log"))
}
