use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use x2pdf_core::{
    ApiCredentials, EmbeddedFonts, ExportOptions, PipelineOptions, TimelineClient, categorize,
    export_from_cache, fetch_to_cache, run_pipeline,
};

use crate::ProcessExit;
use crate::app::config_manager::{self, ResolvedConfig};
use crate::app::{progress_manager, terminal};
use crate::cli::{Cli, Command, FetchArgs};
use crate::output;

pub(crate) async fn run_x2pdf() -> Result<ProcessExit> {
    let cli = Cli::parse();
    let resolved = config_manager::resolve_config(&cli)?;

    let style = terminal::TerminalStyle::detect(&cli.global);
    terminal::init_tracing(resolved.log_level, style.color);
    debug!(?resolved, ?style, "Configuration resolved");
    let use_spinner = style.spinner;

    match &cli.command {
        Command::Categorize { text } => {
            println!("{}", categorize(&text.join(" ")));
        }
        Command::Export => {
            let options = export_options(&resolved)?;
            let report = export_from_cache(&resolved.cache_path, &options)
                .with_context(|| {
                    format!(
                        "Failed to export posts cached in '{}'",
                        resolved.cache_path.display()
                    )
                })?;
            output::print_lines(&output::export_report_lines(&report));
        }
        Command::Fetch { fetch } => {
            let client = build_client(&resolved)?;
            let posts = progress_manager::with_spinner(
                use_spinner,
                format!("Fetching posts of @{}...", username(fetch)),
                fetch_to_cache(
                    &client,
                    &fetch.username,
                    resolved.max_results,
                    &resolved.cache_path,
                ),
            )
            .await?;
            println!(
                "{}",
                output::fetch_report_line(posts.len(), &resolved.cache_path)
            );
        }
        Command::Run { fetch, .. } => {
            let export = export_options(&resolved)?;
            let client = build_client(&resolved)?;
            let options = PipelineOptions {
                username: fetch.username.clone(),
                max_results: resolved.max_results,
                cache_path: resolved.cache_path.clone(),
                cache_mode: resolved.cache_mode,
                export,
            };
            info!(username = %options.username, cache_mode = %options.cache_mode, "x2pdf starting");
            let report = progress_manager::with_spinner(
                use_spinner,
                format!("Exporting posts of @{}...", username(fetch)),
                run_pipeline(&client, &options),
            )
            .await?;
            output::print_lines(&output::export_report_lines(&report));
        }
    }

    Ok(ProcessExit::Success)
}

fn build_client(resolved: &ResolvedConfig) -> Result<TimelineClient> {
    let credentials = ApiCredentials::from_env()?;
    let client =
        TimelineClient::with_base_url(credentials, &resolved.api_base_url, resolved.timeouts)?;
    Ok(client)
}

fn export_options(resolved: &ResolvedConfig) -> Result<ExportOptions> {
    let fonts = match &resolved.font_path {
        Some(regular) => Some(
            EmbeddedFonts::load(regular, resolved.bold_font_path.as_deref())
                .context("Failed to load the PDF font")?,
        ),
        None => None,
    };
    Ok(ExportOptions {
        output_path: resolved.output_path.clone(),
        fonts,
        ..ExportOptions::default()
    })
}

fn username(fetch: &FetchArgs) -> &str {
    fetch.username.trim_start_matches('@')
}
