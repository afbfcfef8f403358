//! Configuration lifecycle: load file config, merge CLI values over it.

use std::path::PathBuf;

use anyhow::Result;
use x2pdf_core::fetch::HttpTimeouts;
use x2pdf_core::{
    CacheMode, DEFAULT_API_BASE_URL, DEFAULT_CACHE_PATH, DEFAULT_MAX_RESULTS, DEFAULT_OUTPUT_PATH,
};

use crate::app_config::{FileConfig, load_default_file_config};
use crate::cli::{CacheModeArg, Cli, Command, FetchArgs, GlobalArgs};

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedConfig {
    pub(crate) log_level: &'static str,
    pub(crate) output_path: PathBuf,
    pub(crate) cache_path: PathBuf,
    pub(crate) cache_mode: CacheMode,
    pub(crate) max_results: u8,
    pub(crate) api_base_url: String,
    pub(crate) timeouts: HttpTimeouts,
    pub(crate) font_path: Option<PathBuf>,
    pub(crate) bold_font_path: Option<PathBuf>,
}

/// Loads the config file (if any) and merges the command line over it.
pub(crate) fn resolve_config(cli: &Cli) -> Result<ResolvedConfig> {
    let loaded = load_default_file_config()?;
    let (fetch, cache_mode) = match &cli.command {
        Command::Run { fetch, cache_mode } => (Some(fetch), *cache_mode),
        Command::Fetch { fetch } => (Some(fetch), None),
        Command::Export | Command::Categorize { .. } => (None, None),
    };
    Ok(merge_config(
        &cli.global,
        fetch,
        cache_mode,
        loaded.config.as_ref(),
    ))
}

/// Command line beats config file beats built-in default.
pub(crate) fn merge_config(
    global: &GlobalArgs,
    fetch: Option<&FetchArgs>,
    cache_mode: Option<CacheModeArg>,
    file_config: Option<&FileConfig>,
) -> ResolvedConfig {
    let file = file_config.cloned().unwrap_or_default();
    let log_level = resolve_log_level(global, &file);

    // A face given on the command line replaces both faces from the file.
    let (font_path, bold_font_path) = match &global.font {
        Some(font) => (Some(font.clone()), global.bold_font.clone()),
        None => (file.font_path, file.bold_font_path),
    };

    let defaults = HttpTimeouts::default();
    let timeouts = HttpTimeouts {
        connect_secs: file.connect_timeout_secs.unwrap_or(defaults.connect_secs),
        read_secs: file.read_timeout_secs.unwrap_or(defaults.read_secs),
    };

    ResolvedConfig {
        log_level,
        output_path: global
            .output
            .clone()
            .or(file.output_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
        cache_path: global
            .cache
            .clone()
            .or(file.cache_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
        cache_mode: cache_mode
            .map(CacheMode::from)
            .or(file.cache_mode)
            .unwrap_or_default(),
        max_results: fetch
            .and_then(|args| args.max_results)
            .or(file.max_results)
            .unwrap_or(DEFAULT_MAX_RESULTS),
        api_base_url: fetch
            .and_then(|args| args.api_base_url.clone())
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        timeouts,
        font_path,
        bold_font_path,
    }
}

fn resolve_log_level(global: &GlobalArgs, file: &FileConfig) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose > 0 {
        match global.verbose {
            1 => "debug",
            _ => "trace",
        }
    } else {
        file.verbosity.map_or("info", |verbosity| verbosity.log_level())
    }
}
