//! Persisted user configuration
//!
//! A JSON object at `<config_dir>/citegen/config.json` holding default
//! style, locale, output format and in-text preference. Managed through
//! the `config` subcommand; any read, parse, or value error here is fatal
//! for the invocation.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use citegen_core::render::{OutputFormat, RenderOptions};

pub const CONFIG_KEYS: &[&str] = &["style", "locale", "format", "intext"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not locate a configuration directory")]
    NoConfigDir,
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown config key '{0}', expected one of: style, locale, format, intext")]
    UnknownKey(String),
    #[error("{0}")]
    InvalidValue(String),
}

/// On-disk shape; unset keys fall back to built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intext: Option<bool>,
}

impl FileConfig {
    pub fn path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("citegen").join("config.json"))
    }

    /// Load the config file; a missing file is an empty config, anything
    /// unreadable or unparsable is an error.
    pub fn load() -> Result<FileConfig, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: FileConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(format) = &self.format {
            OutputFormat::from_str(format).map_err(ConfigError::InvalidValue)?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "style" => Ok(self.style.clone().unwrap_or_else(|| "apa".to_string())),
            "locale" => Ok(self.locale.clone().unwrap_or_else(|| "en-US".to_string())),
            "format" => Ok(self.format.clone().unwrap_or_else(|| "text".to_string())),
            "intext" => Ok(self.intext.unwrap_or(false).to_string()),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "style" => self.style = Some(value.to_string()),
            "locale" => self.locale = Some(value.to_string()),
            "format" => {
                OutputFormat::from_str(value).map_err(ConfigError::InvalidValue)?;
                self.format = Some(value.to_string());
            }
            "intext" => {
                let parsed = value
                    .parse::<bool>()
                    .map_err(|_| ConfigError::InvalidValue(format!(
                        "invalid intext value '{}', expected true or false",
                        value
                    )))?;
                self.intext = Some(parsed);
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    pub fn reset(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "style" => self.style = None,
            "locale" => self.locale = None,
            "format" => self.format = None,
            "intext" => self.intext = None,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Merge file defaults with command-line overrides into the options
    /// object passed through the pipeline.
    pub fn render_options(
        &self,
        style: Option<String>,
        locale: Option<String>,
        format: Option<String>,
        intext: Option<bool>,
    ) -> Result<RenderOptions, ConfigError> {
        let format_name = format
            .or_else(|| self.format.clone())
            .unwrap_or_else(|| "text".to_string());
        let format = OutputFormat::from_str(&format_name).map_err(ConfigError::InvalidValue)?;

        Ok(RenderOptions {
            style: style
                .or_else(|| self.style.clone())
                .unwrap_or_else(|| "apa".to_string()),
            locale: locale
                .or_else(|| self.locale.clone())
                .unwrap_or_else(|| "en-US".to_string()),
            format,
            intext: intext.or(self.intext).unwrap_or(false),
        })
    }
}
