//! Optional config file holding CLI defaults.
//!
//! Values given on the command line always win over the file.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use repofetch_core::download::{
    CONNECT_TIMEOUT_SECS, DEFAULT_TRANSFER_DELAY, OutputLayout, READ_TIMEOUT_SECS,
};
use serde::Deserialize;

use crate::cli::Args;

/// TOML-backed file configuration for repofetch defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Default output directory.
    pub output_dir: Option<PathBuf>,
    /// Default comma-separated patterns.
    pub patterns: Option<String>,
    /// Flatten the output tree by default.
    pub flatten: Option<bool>,
    /// Pause after each file transfer, in milliseconds.
    pub transfer_delay_ms: Option<u64>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP whole-request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(delay) = self.transfer_delay_ms
            && delay > 60_000
        {
            bail!("Invalid config value for `transfer_delay_ms`: {delay}. Expected range: 0..=60000");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let Some(patterns) = &self.patterns
            && patterns.split(',').all(|p| p.trim().is_empty())
        {
            bail!("Invalid config value for `patterns`: no pattern in {patterns:?}");
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves the config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/repofetch/config.toml`
/// 2. `$HOME/.config/repofetch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    config_path_from(env_var_non_empty_os("XDG_CONFIG_HOME"), env_var_non_empty_os("HOME"))
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg_config_home) = xdg_config_home {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("repofetch")
                .join("config.toml"),
        );
    }
    let home = home?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("repofetch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads the config file from the default path, if one exists.
pub fn load_default_file_config() -> Result<Option<FileConfig>> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

/// Effective settings for one run after merging CLI and file values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub patterns: String,
    pub output_dir: PathBuf,
    pub layout: OutputLayout,
    pub transfer_delay: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

/// Merges CLI arguments over file defaults.
pub fn resolve_settings(args: &Args, file: Option<&FileConfig>) -> Result<RunSettings> {
    let file = file.cloned().unwrap_or_default();

    let Some(patterns) = args.patterns.clone().or(file.patterns) else {
        bail!(
            "No file patterns given\n  Suggestion: pass --patterns \".py,README.md\" or set `patterns` in the config file"
        );
    };

    let layout = if args.flatten || file.flatten.unwrap_or(false) {
        OutputLayout::Flatten
    } else {
        OutputLayout::Mirror
    };

    Ok(RunSettings {
        patterns,
        output_dir: args
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(".")),
        layout,
        transfer_delay: file
            .transfer_delay_ms
            .map_or(DEFAULT_TRANSFER_DELAY, Duration::from_millis),
        connect_timeout: Duration::from_secs(
            file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
        ),
        read_timeout: Duration::from_secs(file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS)),
    })
}
