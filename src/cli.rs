//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use subscout_core::DEFAULT_CONCURRENCY;
use subscout_core::download::DEFAULT_BASE_URL;

/// Find, rank, and fetch subtitles for a media title.
///
/// The path argument steers where subtitles land and what they should match:
/// an existing directory receives every subtitle of the chosen archives; an
/// existing file gets exactly one subtitle next to it with the same name
/// (`movie.avi` -> `movie.srt`). The path's name is also the query used to
/// rank the subtitle listing.
#[derive(Parser, Debug)]
#[command(name = "subscout")]
#[command(author, version, about)]
pub struct Args {
    /// Media title to search the catalog for
    #[arg(value_parser = non_blank)]
    pub query: String,

    /// Media file or directory the subtitles are for (defaults to the current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Subtitle language
    #[arg(short = 'l', long = "lang", default_value = "english")]
    pub language: String,

    /// Pick search results and subtitles interactively instead of taking the first
    #[arg(short, long)]
    pub interactive: bool,

    /// Prefer subtitles for the hearing impaired
    #[arg(long)]
    pub hi: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print one JSON object per downloaded subtitle archive
    #[arg(long)]
    pub json: bool,

    /// Retry budget for every request (defaults: search 30, listing 100, download 20)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(0..=1000))]
    pub max_retries: Option<u32>,

    /// Minimum delay between any two requests in milliseconds (0 to disable, max 60000)
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub rate_limit: u64,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Catalog origin
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

fn non_blank(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("please provide a query".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["subscout", "the matrix"]).unwrap();
        assert_eq!(args.query, "the matrix");
        assert_eq!(args.path, PathBuf::from("."));
        assert_eq!(args.language, "english");
        assert!(!args.interactive);
        assert!(!args.hi);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.json);
        assert_eq!(args.max_retries, None);
        assert_eq!(args.rate_limit, 300);
        assert_eq!(args.concurrency, 10); // DEFAULT_CONCURRENCY
        assert_eq!(args.base_url, "https://subscene.com");
    }

    #[test]
    fn test_cli_query_required() {
        let result = Args::try_parse_from(["subscout"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_blank_query_rejected() {
        let result = Args::try_parse_from(["subscout", "   "]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_query_trimmed() {
        let args = Args::try_parse_from(["subscout", "  line of duty "]).unwrap();
        assert_eq!(args.query, "line of duty");
    }

    #[test]
    fn test_cli_path_positional() {
        let args = Args::try_parse_from(["subscout", "line of duty", "/media/lod-s02e03.avi"])
            .unwrap();
        assert_eq!(args.path, PathBuf::from("/media/lod-s02e03.avi"));
    }

    #[test]
    fn test_cli_language_short_and_long() {
        let args = Args::try_parse_from(["subscout", "q", "-l", "dutch"]).unwrap();
        assert_eq!(args.language, "dutch");

        let args = Args::try_parse_from(["subscout", "q", "--lang", "farsi_persian"]).unwrap();
        assert_eq!(args.language, "farsi_persian");
    }

    #[test]
    fn test_cli_interactive_and_hi_flags() {
        let args = Args::try_parse_from(["subscout", "q", "-i", "--hi"]).unwrap();
        assert!(args.interactive);
        assert!(args.hi);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["subscout", "q", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["subscout", "q", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["subscout", "q", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["subscout", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["subscout", "q", "--invalid-flag"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    // ==================== Concurrency Tests ====================

    #[test]
    fn test_cli_concurrency_bounds() {
        let args = Args::try_parse_from(["subscout", "q", "-c", "1"]).unwrap();
        assert_eq!(args.concurrency, 1);

        let args = Args::try_parse_from(["subscout", "q", "--concurrency", "100"]).unwrap();
        assert_eq!(args.concurrency, 100);
    }

    #[test]
    fn test_cli_concurrency_zero_rejected() {
        let err = Args::try_parse_from(["subscout", "q", "-c", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_concurrency_over_max_rejected() {
        let err = Args::try_parse_from(["subscout", "q", "-c", "101"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    // ==================== Retry and Rate Limit Tests ====================

    #[test]
    fn test_cli_max_retries_flag() {
        let args = Args::try_parse_from(["subscout", "q", "-r", "0"]).unwrap();
        assert_eq!(args.max_retries, Some(0));

        let args = Args::try_parse_from(["subscout", "q", "--max-retries", "7"]).unwrap();
        assert_eq!(args.max_retries, Some(7));
    }

    #[test]
    fn test_cli_rate_limit_zero_disables() {
        let args = Args::try_parse_from(["subscout", "q", "--rate-limit", "0"]).unwrap();
        assert_eq!(args.rate_limit, 0);
    }

    #[test]
    fn test_cli_rate_limit_over_max_rejected() {
        let err = Args::try_parse_from(["subscout", "q", "--rate-limit", "60001"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_base_url_override() {
        let args =
            Args::try_parse_from(["subscout", "q", "--base-url", "http://127.0.0.1:8080"]).unwrap();
        assert_eq!(args.base_url, "http://127.0.0.1:8080");
    }
}
