use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::time::Duration;

use cinedex_enrich::async_util::run_with_events;
use cinedex_enrich::{
    Cache, CancelFlag, CastSource, EnrichEvent, EnrichOptions, EnrichReport, EnrichStats,
    EnrichmentSource, MovieRecord, ProviderSource, ReportEntry, enrich, merge,
};
use cinedex_tmdb::{Credentials, TmdbClient};

use crate::EnrichKind;
use crate::commands::cache::resolve_cache_dir;
use crate::io;

/// Build a validated TMDB client, with a spinner while connecting.
pub(crate) async fn connect_tmdb(timeout_secs: u64, quiet: bool) -> Option<Arc<TmdbClient>> {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("/-\\|"),
        );
        pb.set_message("Connecting to TMDB...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    };

    let creds = match Credentials::load() {
        Ok(c) => c,
        Err(e) => {
            pb.finish_and_clear();
            log::error!(
                "{} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            log::error!("");
            log::error!("Set TMDB_API_TOKEN, or run 'cinedex credentials set <token>'.");
            return None;
        }
    };

    match TmdbClient::new(creds, Duration::from_secs(timeout_secs)).await {
        Ok(client) => {
            pb.finish_and_clear();
            log::info!(
                "{} Connected to TMDB",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            );
            Some(Arc::new(client))
        }
        Err(e) => {
            pb.finish_and_clear();
            log::error!(
                "{} Failed to connect to TMDB: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            None
        }
    }
}

/// Run the enrich command.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run_enrich(
    kinds: Vec<EnrichKind>,
    input: PathBuf,
    genres: PathBuf,
    output: PathBuf,
    threads: usize,
    checkpoint_every: usize,
    max_attempts: u32,
    regions: Vec<String>,
    cache_dir: Option<PathBuf>,
    limit: Option<usize>,
    report: bool,
    quiet: bool,
    timeout: u64,
) {
    let mut records = match io::read_records(&input) {
        Ok(r) => r,
        Err(e) => {
            log::error!("Failed to read {}: {}", input.display(), e);
            std::process::exit(1);
        }
    };
    log::info!(
        "{} movie documents loaded from {}",
        records.len(),
        input.display()
    );
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    // Genre attachment needs no network; a missing table just skips it.
    match io::read_genres(&genres) {
        Ok(table) => {
            merge::attach_genres(&mut records, &table);
            log::info!("Attached genre names from {}", genres.display());
        }
        Err(e) if e.is_not_found() => {
            log::debug!("No genre table at {}, skipping", genres.display());
        }
        Err(e) => {
            log::warn!("Could not read genre table {}: {}", genres.display(), e);
        }
    }

    let cache_dir = resolve_cache_dir(cache_dir);
    let report_dir = output
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    rt.block_on(async {
        let client = match connect_tmdb(timeout, quiet).await {
            Some(c) => c,
            None => std::process::exit(1),
        };

        let cancel = CancelFlag::default();
        {
            // Ctrl-C arms the flag; items not yet dispatched are skipped and
            // stay retryable, checkpoints already taken survive.
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupt received, stopping after in-flight items...");
                    cancel.cancel();
                }
            });
        }

        let options = EnrichOptions {
            concurrency: threads,
            checkpoint_every,
            max_attempts,
            cancel,
        };

        let mut checkpoint_failed = false;
        for kind in kinds {
            let (enriched, had_error) = match kind {
                EnrichKind::Cast => {
                    run_kind(
                        CastSource::new(client.clone()),
                        records,
                        &cache_dir,
                        &options,
                        report.then_some(report_dir.as_path()),
                        quiet,
                    )
                    .await
                }
                EnrichKind::Providers => {
                    run_kind(
                        ProviderSource::new(client.clone(), regions.clone()),
                        records,
                        &cache_dir,
                        &options,
                        report.then_some(report_dir.as_path()),
                        quiet,
                    )
                    .await
                }
            };
            records = enriched;
            checkpoint_failed |= had_error;
        }

        if let Err(e) = io::write_json(&output, &records) {
            log::error!("Failed to write {}: {}", output.display(), e);
            std::process::exit(1);
        }
        log::info!(
            "{} {} enriched documents written to {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            records.len(),
            output.display(),
        );

        if checkpoint_failed {
            log::error!(
                "{} One or more cache checkpoints failed; fetched data may not be reusable next run",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            );
            std::process::exit(1);
        }
    });
}

/// Run one enrichment kind over the records: load its cache, drive the
/// coordinator while rendering events, then summarize.
async fn run_kind<S: EnrichmentSource>(
    source: S,
    records: Vec<MovieRecord>,
    cache_dir: &Path,
    options: &EnrichOptions,
    report_dir: Option<&Path>,
    quiet: bool,
) -> (Vec<MovieRecord>, bool) {
    let cache_path = cache_dir.join(format!("{}_cache.json", S::KIND));
    let mut cache = Cache::load(cache_path.clone());
    log::info!(
        "Enriching {} ({} cached entries in {})",
        S::KIND.if_supports_color(Stdout, |t| t.bold()),
        cache.len(),
        cache_path.display(),
    );

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::with_template("  [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=> "),
        );
        pb
    };

    let mut run_report = EnrichReport::new(S::KIND);

    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    let enrich_future = enrich(source, records, &mut cache, options, event_tx);

    let outcome = run_with_events(enrich_future, event_rx, |event| match event {
        EnrichEvent::Started {
            total,
            cached,
            pending,
        } => {
            pb.set_length(pending as u64);
            pb.println(format!(
                "  {} distinct movies: {} cached, {} to fetch",
                total, cached, pending
            ));
        }
        EnrichEvent::ItemCompleted {
            title,
            completed,
            pending,
            eta,
            ..
        } => {
            pb.set_position(completed as u64);
            pb.set_message(format!(
                "{}/{} done, ETA {} \u{2014} {}",
                completed,
                pending,
                format_eta(eta),
                title,
            ));
        }
        EnrichEvent::ItemFailed {
            id,
            title,
            error,
            completed,
            ..
        } => {
            pb.set_position(completed as u64);
            pb.println(format!(
                "  {} {} ({}): {}",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                title,
                id,
                error,
            ));
            run_report.add(ReportEntry::Failed { id, title, error });
        }
        EnrichEvent::ItemSkipped { id } => {
            run_report.add(ReportEntry::Skipped { id });
        }
        EnrichEvent::CheckpointWritten { entries } => {
            log::debug!("Checkpoint written ({} entries)", entries);
        }
        EnrichEvent::CheckpointFailed { error } => {
            pb.println(format!(
                "  {} Checkpoint failed: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                error,
            ));
        }
        EnrichEvent::Done { .. } => {}
    })
    .await;

    pb.finish_and_clear();
    print_summary(S::KIND, &outcome.stats, cache.len());

    if let Some(dir) = report_dir
        && !run_report.is_empty()
    {
        let path = dir.join(format!("{}_report.txt", S::KIND));
        match run_report.write_to_file(&path, &outcome.stats) {
            Ok(()) => log::info!("Report written to {}", path.display()),
            Err(e) => log::warn!("Could not write report {}: {}", path.display(), e),
        }
    }

    (outcome.records, outcome.checkpoint_error.is_some())
}

fn print_summary(kind: &str, stats: &EnrichStats, cache_entries: usize) {
    log::info!(
        "{} {}: {} fetched, {} cached, {} failed, {} skipped (cache now {} entries)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        kind.if_supports_color(Stdout, |t| t.bold()),
        stats.fetched,
        stats.cache_hits,
        stats.failed,
        stats.skipped,
        cache_entries,
    );
}

/// Render an ETA as a compact human-readable duration.
fn format_eta(eta: Option<Duration>) -> String {
    match eta {
        None => "--".to_string(),
        Some(d) => {
            let secs = d.as_secs();
            if secs >= 3600 {
                format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
            } else if secs >= 60 {
                format!("{}m {:02}s", secs / 60, secs % 60)
            } else {
                format!("{}s", secs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_eta_covers_magnitudes() {
        assert_eq!(format_eta(None), "--");
        assert_eq!(format_eta(Some(Duration::from_secs(42))), "42s");
        assert_eq!(format_eta(Some(Duration::from_secs(92))), "1m 32s");
        assert_eq!(format_eta(Some(Duration::from_secs(3720))), "1h 02m");
    }
}
