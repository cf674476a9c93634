//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Collect, resolve and download Steam workshop items.
///
/// `fetch` scrapes listing pages for item references, `generate` resolves
/// references into direct archive addresses through a lookup service, and
/// `download` saves archives into a directory.
#[derive(Parser, Debug)]
#[command(name = "workshop-util")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Maximum concurrent tasks per stage (1-100, default 4)
    #[arg(short = 'c', long, global = true, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Lookup service endpoint used by `generate`
    #[arg(long, global = true, value_name = "URL")]
    pub lookup_url: Option<String>,

    /// Read defaults from this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Run modes.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape listing pages and collect unique item references
    #[command(visible_alias = "f")]
    Fetch {
        /// Write references to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        path: Option<PathBuf>,

        /// CSS selector for item links on listing pages
        #[arg(long, value_name = "SELECTOR")]
        selector: Option<String>,

        /// Listing page addresses
        pages: Vec<String>,
    },

    /// Resolve item references into direct download addresses
    #[command(visible_alias = "g")]
    Generate {
        /// Write resolved addresses to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        path: Option<PathBuf>,

        /// Application id the items belong to
        #[arg(long, alias = "appId", value_name = "ID")]
        app_id: Option<u32>,

        /// Also download resolved addresses into this directory
        #[arg(short, long, value_name = "DIR")]
        download: Option<PathBuf>,

        /// Item references, or files containing one reference per line
        inputs: Vec<String>,
    },

    /// Download direct addresses into a directory
    #[command(visible_alias = "d")]
    Download {
        /// Destination directory (created if missing)
        #[arg(short, long, value_name = "DIR")]
        path: Option<PathBuf>,

        /// Download addresses, or files containing one address per line
        inputs: Vec<String>,
    },
}

impl Command {
    /// Stable label used in logs and the final summary line.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Generate { .. } => "generate",
            Self::Download { .. } => "download",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Args::try_parse_from(["workshop-util"]);
        let err = result.unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn test_cli_fetch_defaults() {
        let args = Args::try_parse_from(["workshop-util", "fetch", "http://listing/1"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.concurrency.is_none());
        match args.command {
            Command::Fetch {
                path,
                selector,
                pages,
            } => {
                assert!(path.is_none());
                assert!(selector.is_none());
                assert_eq!(pages, vec!["http://listing/1"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_command_aliases() {
        let args = Args::try_parse_from(["workshop-util", "f", "http://p"]).unwrap();
        assert_eq!(args.command.label(), "fetch");

        let args = Args::try_parse_from(["workshop-util", "g", "refs.txt"]).unwrap();
        assert_eq!(args.command.label(), "generate");

        let args = Args::try_parse_from(["workshop-util", "d", "links.txt"]).unwrap();
        assert_eq!(args.command.label(), "download");
    }

    #[test]
    fn test_cli_generate_app_id_spellings() {
        for flag in ["--app-id", "--appId"] {
            let args =
                Args::try_parse_from(["workshop-util", "generate", flag, "636480", "r"]).unwrap();
            match args.command {
                Command::Generate { app_id, inputs, .. } => {
                    assert_eq!(app_id, Some(636_480));
                    assert_eq!(inputs, vec!["r"]);
                }
                other => panic!("unexpected command: {other:?}"),
            }
        }
    }

    #[test]
    fn test_cli_generate_app_id_optional_at_parse_time() {
        let args = Args::try_parse_from(["workshop-util", "generate", "r"]).unwrap();
        assert!(matches!(args.command, Command::Generate { app_id: None, .. }));
    }

    #[test]
    fn test_cli_generate_rejects_non_numeric_app_id() {
        let result = Args::try_parse_from(["workshop-util", "generate", "--app-id", "abc"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_generate_with_output_and_download() {
        let args = Args::try_parse_from([
            "workshop-util",
            "generate",
            "-p",
            "links.txt",
            "-d",
            "mods",
            "--app-id",
            "1",
            "refs.txt",
        ])
        .unwrap();
        match args.command {
            Command::Generate { path, download, .. } => {
                assert_eq!(path, Some(PathBuf::from("links.txt")));
                assert_eq!(download, Some(PathBuf::from("mods")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["workshop-util", "download", "-vv", "-c", "8", "links.txt"])
                .unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.concurrency, Some(8));
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["workshop-util", "-q", "fetch"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_concurrency_zero_rejected() {
        let result = Args::try_parse_from(["workshop-util", "-c", "0", "fetch"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_concurrency_over_max_rejected() {
        let result = Args::try_parse_from(["workshop-util", "-c", "101", "fetch"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_lookup_url_and_config() {
        let args = Args::try_parse_from([
            "workshop-util",
            "--lookup-url",
            "http://127.0.0.1:1/lookup",
            "--config",
            "/tmp/c.toml",
            "generate",
        ])
        .unwrap();
        assert_eq!(args.lookup_url.as_deref(), Some("http://127.0.0.1:1/lookup"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["workshop-util", "--version"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayVersion
        );
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["workshop-util", "fetch", "--invalid-flag"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::UnknownArgument
        );
    }
}
