//! CLI entry point for the subscout tool.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use subscout_core::catalog::{DOWNLOAD_RETRIES, LISTING_RETRIES, SEARCH_RETRIES};
use subscout_core::selection::subtitle_label;
use subscout_core::{
    CatalogClient, DownloadOrchestrator, FetchConfig, HttpClient, Language, OutputTarget,
    order_subtitles, rank_by,
};
use tracing::{debug, info, warn};

mod cli;
mod picker;
mod report;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Result lines go to stdout, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let Ok(language) = args.language.parse::<Language>();
    if !language.is_known() {
        warn!(%language, "language is not in the catalog's known set");
    }

    let target = OutputTarget::from_path(&args.path);

    let config = FetchConfig {
        base_url: args.base_url.clone(),
        rate_limit: Duration::from_millis(args.rate_limit),
        ..FetchConfig::default()
    };
    let http = HttpClient::from_config(&config)?;
    let catalog = CatalogClient::new(http, &config)?;

    let search_retries = args.max_retries.unwrap_or(SEARCH_RETRIES);
    let listing_retries = args.max_retries.unwrap_or(LISTING_RETRIES);
    let download_retries = args.max_retries.unwrap_or(DOWNLOAD_RETRIES);

    let mut results = catalog.search(&args.query, search_retries).await?;
    if results.is_empty() {
        bail!("no results");
    }
    rank_by(&args.query, &mut results, |record| record.title.clone());

    let stdout = io::stdout();
    let titles: Vec<String> = results.iter().map(|r| r.title.clone()).collect();
    let chosen = choose(&args, &titles)?;
    let chosen: Vec<_> = chosen.into_iter().filter_map(|i| results.get(i)).collect();

    if !args.quiet && !args.json {
        let mut out = stdout.lock();
        for record in &chosen {
            writeln!(out, "  {}", record.title)?;
        }
        writeln!(out)?;
    }

    let mut listing = Vec::new();
    for record in &chosen {
        listing.extend(catalog.subtitles(record, listing_retries).await?);
    }

    let ordered = order_subtitles(listing, &language, &target.file_query, args.hi);
    if ordered.is_empty() {
        bail!("no results");
    }

    let labels: Vec<String> = ordered.iter().map(subtitle_label).collect();
    let selected: Vec<_> = choose(&args, &labels)?
        .into_iter()
        .filter_map(|i| ordered.get(i).cloned())
        .collect();
    if selected.is_empty() {
        bail!("no results");
    }

    if !args.quiet && !args.json {
        let mut out = stdout.lock();
        for record in &selected {
            writeln!(out, "  {}", record.title)?;
        }
        writeln!(out)?;
    }

    info!(
        subtitles = selected.len(),
        directory = %target.directory.display(),
        base_name = target.base_name.as_deref(),
        "Downloading subtitles"
    );

    let orchestrator = DownloadOrchestrator::new(catalog, usize::from(args.concurrency))?;
    let result = orchestrator
        .get(
            selected,
            &target.directory,
            target.base_name.as_deref(),
            download_retries,
            |outcome| {
                if args.quiet {
                    return;
                }
                let mut out = stdout.lock();
                let written = if args.json {
                    report::write_json(&mut out, &outcome)
                } else {
                    report::write_text(&mut out, &outcome)
                };
                if let Err(e) = written {
                    warn!(error = %e, "failed to write result");
                }
            },
        )
        .await;

    let summary = result?;
    info!(
        completed = summary.completed(),
        total = summary.total(),
        "Download complete"
    );
    if !args.quiet && !args.json {
        writeln!(stdout.lock(), "Done")?;
    }

    Ok(())
}

/// Interactive selection, or the first entry.
fn choose(args: &Args, labels: &[String]) -> Result<Vec<usize>> {
    if !args.interactive {
        return Ok(vec![0]);
    }
    let stdin = io::stdin();
    let chosen = picker::choose(labels, &mut stdin.lock(), &mut io::stdout().lock())?;
    println!();
    Ok(chosen)
}
