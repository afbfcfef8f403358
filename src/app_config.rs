//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use x2pdf_core::CacheMode;
use x2pdf_core::fetch::MAX_RESULTS_RANGE;

/// TOML-style file configuration for x2pdf defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Default PDF output path.
    pub output_path: Option<PathBuf>,
    /// Default post cache path.
    pub cache_path: Option<PathBuf>,
    /// Default cache mode for `run`.
    pub cache_mode: Option<CacheMode>,
    /// Default number of posts to request.
    pub max_results: Option<u8>,
    /// API base URL override.
    pub api_base_url: Option<String>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// API client connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// API client read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// TrueType font embedded for body text.
    pub font_path: Option<PathBuf>,
    /// TrueType font embedded for headings.
    pub bold_font_path: Option<PathBuf>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(max_results) = self.max_results
            && !MAX_RESULTS_RANGE.contains(&max_results)
        {
            bail!(
                "Invalid config value for `max_results`: {max_results}. Expected range: {}..={}",
                MAX_RESULTS_RANGE.start(),
                MAX_RESULTS_RANGE.end()
            );
        }
        if let Some(api_base_url) = &self.api_base_url
            && api_base_url.trim().is_empty()
        {
            bail!("Invalid config value for `api_base_url`: must not be empty");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if self.bold_font_path.is_some() && self.font_path.is_none() {
            bail!("Config value `bold_font_path` requires `font_path`");
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

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Log level this setting selects when the command line says nothing.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/x2pdf/config.toml`
/// 2. `$HOME/.config/x2pdf/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join("x2pdf").join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("x2pdf")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let config = match resolve_default_config_path() {
        Some(path) if path.exists() => Some(load_file_config(&path)?),
        _ => None,
    };
    Ok(LoadedConfig { config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "output_path" => {
                cfg.output_path = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "cache_path" => {
                cfg.cache_path = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "cache_mode" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.cache_mode = Some(parsed.parse::<CacheMode>().with_context(|| {
                    format!("Invalid `cache_mode` value '{parsed}' on line {line_number}")
                })?);
            }
            "max_results" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                let n = u8::try_from(parsed).with_context(|| {
                    format!("`max_results` out of range on line {line_number}")
                })?;
                cfg.max_results = Some(n);
            }
            "api_base_url" => {
                cfg.api_base_url = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "font_path" => {
                cfg.font_path = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "bold_font_path" => {
                cfg.bold_font_path = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}
