//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use x2pdf_core::CacheMode;

/// Fetch your recent posts, sort them into topics, and export them as a PDF.
#[derive(Parser, Debug)]
#[command(name = "x2pdf")]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// PDF output path [default: exports/X2PDF.pdf]
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Post cache file [default: tweets.json]
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,

    /// TrueType font to embed, for text outside Latin-1 [default: built-in Courier]
    #[arg(long, global = true, value_name = "TTF")]
    pub font: Option<PathBuf>,

    /// TrueType font for headings [default: the --font face]
    #[arg(long, global = true, value_name = "TTF", requires = "font")]
    pub bold_font: Option<PathBuf>,
}

/// Flags for subcommands that talk to the API.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Account to fetch, with or without a leading '@'
    pub username: String,

    /// Number of recent posts to request (5-100)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(5..=100))]
    pub max_results: Option<u8>,

    /// API base URL [default: https://api.twitter.com]
    #[arg(long)]
    pub api_base_url: Option<String>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch (or reuse cached) posts, categorize them, and export the PDF
    Run {
        #[command(flatten)]
        fetch: FetchArgs,

        /// How the post cache is used [default: refresh]
        #[arg(long, value_enum)]
        cache_mode: Option<CacheModeArg>,
    },
    /// Fetch posts and write them to the cache only
    Fetch {
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Export the PDF from the cache without touching the network
    Export,
    /// Print the category a piece of text would be filed under
    Categorize {
        /// Text to classify
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

/// Cache mode as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheModeArg {
    /// Always fetch, then overwrite the cache
    Refresh,
    /// Read the cache when present, otherwise fetch and write it
    Reuse,
    /// Always fetch and never write the cache
    Off,
}

impl From<CacheModeArg> for CacheMode {
    fn from(value: CacheModeArg) -> Self {
        match value {
            CacheModeArg::Refresh => Self::Refresh,
            CacheModeArg::Reuse => Self::Reuse,
            CacheModeArg::Off => Self::Off,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_run_parses_username_and_defaults() {
        let cli = Cli::try_parse_from(["x2pdf", "run", "someone"]).unwrap();
        assert_eq!(cli.global.verbose, 0);
        assert!(!cli.global.quiet);
        let Command::Run { fetch, cache_mode } = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(fetch.username, "someone");
        assert_eq!(fetch.max_results, None);
        assert_eq!(fetch.api_base_url, None);
        assert_eq!(cache_mode, None);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let cli = Cli::try_parse_from(["x2pdf", "-v", "export"]).unwrap();
        assert_eq!(cli.global.verbose, 1);

        let cli = Cli::try_parse_from(["x2pdf", "export", "-vv"]).unwrap();
        assert_eq!(cli.global.verbose, 2);

        let cli = Cli::try_parse_from(["x2pdf", "--verbose", "export", "--verbose"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let cli = Cli::try_parse_from(["x2pdf", "-q", "export"]).unwrap();
        assert!(cli.global.quiet);

        let cli = Cli::try_parse_from(["x2pdf", "export", "--quiet"]).unwrap();
        assert!(cli.global.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Cli::try_parse_from(["x2pdf", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Cli::try_parse_from(["x2pdf", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_missing_subcommand_is_error() {
        let err = Cli::try_parse_from(["x2pdf"]).unwrap_err();
        assert!(matches!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                | clap::error::ErrorKind::MissingSubcommand
        ));
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Cli::try_parse_from(["x2pdf", "export", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_run_requires_username() {
        let err = Cli::try_parse_from(["x2pdf", "run"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_max_results_bounds() {
        let cli = Cli::try_parse_from(["x2pdf", "fetch", "someone", "-n", "100"]).unwrap();
        let Command::Fetch { fetch } = cli.command else {
            panic!("expected fetch subcommand");
        };
        assert_eq!(fetch.max_results, Some(100));

        for rejected in ["4", "101"] {
            let err = Cli::try_parse_from(["x2pdf", "fetch", "someone", "-n", rejected])
                .unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_cache_mode_values() {
        let cli =
            Cli::try_parse_from(["x2pdf", "run", "someone", "--cache-mode", "reuse"]).unwrap();
        let Command::Run { cache_mode, .. } = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(cache_mode.map(CacheMode::from), Some(CacheMode::Reuse));

        let err = Cli::try_parse_from(["x2pdf", "run", "someone", "--cache-mode", "sometimes"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cli_paths_are_global() {
        let cli = Cli::try_parse_from([
            "x2pdf",
            "export",
            "--output",
            "out/report.pdf",
            "--cache",
            "data/posts.json",
        ])
        .unwrap();
        assert_eq!(cli.global.output, Some(PathBuf::from("out/report.pdf")));
        assert_eq!(cli.global.cache, Some(PathBuf::from("data/posts.json")));
    }

    #[test]
    fn test_cli_font_flags() {
        let cli = Cli::try_parse_from([
            "x2pdf",
            "export",
            "--font",
            "fonts/OpenSans-Regular.ttf",
            "--bold-font",
            "fonts/OpenSans-Bold.ttf",
        ])
        .unwrap();
        assert_eq!(
            cli.global.font,
            Some(PathBuf::from("fonts/OpenSans-Regular.ttf"))
        );
        assert_eq!(
            cli.global.bold_font,
            Some(PathBuf::from("fonts/OpenSans-Bold.ttf"))
        );

        let err = Cli::try_parse_from(["x2pdf", "export", "--bold-font", "b.ttf"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_categorize_joins_words() {
        let cli = Cli::try_parse_from(["x2pdf", "categorize", "buy", "the", "dip"]).unwrap();
        let Command::Categorize { text } = cli.command else {
            panic!("expected categorize subcommand");
        };
        assert_eq!(text.join(" "), "buy the dip");
    }
}
