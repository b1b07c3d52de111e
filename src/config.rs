use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "openhermes2.5-mistral";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_BUFFER_SIZE: usize = 500;

const CONFIG_DIR_NAME: &str = "shellama";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub base_url: String,
    pub model: String,
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// On-disk shape. Every key is optional and overrides the matching default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<u64>,
    buffer_size: Option<usize>,
}

impl Config {
    /// `<config dir>/shellama/config.json`, e.g. `~/.config/shellama/config.json` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Defaults, then the config file at `path` if it exists, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => read_config_file(path)?,
            None => ConfigFile::default(),
        };
        Ok(Self::from_sources(file, |key| env::var(key).ok()))
    }

    fn from_sources(file: ConfigFile, mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = get_var("MODEL_BASE_URL")
            .or(file.base_url)
            .unwrap_or(defaults.base_url);
        let model = get_var("MODEL").or(file.model).unwrap_or(defaults.model);
        let file_timeout_secs = file
            .timeout
            .filter(|value| *value > 0)
            .unwrap_or(defaults.timeout_secs);
        let timeout_secs = parse_positive_u64(
            get_var("MODEL_TIMEOUT_SECS").as_deref(),
            file_timeout_secs,
        );
        let buffer_size = parse_usize(
            get_var("HISTORY_BUFFER_SIZE").as_deref(),
            file.buffer_size.unwrap_or(defaults.buffer_size),
        );

        Self {
            base_url,
            model,
            timeout_secs,
            buffer_size,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Writes the compiled-in defaults to `path`, creating parent directories.
    pub fn write_defaults(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "Config file '{}' already exists. Pass --force to overwrite it.",
                path.display()
            );
        }
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory '{}'", dir.display()))?;
        }

        let mut contents = Self::default().to_pretty_json()?;
        contents.push('\n');
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file '{}'", path.display()))
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read config file '{}'", path.display()));
        }
    };

    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_usize(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}
