use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Duration;

use crate::cache::{Cache, CacheError};
use crate::merge;
use crate::progress::ProgressState;
use crate::record::MovieRecord;
use crate::source::EnrichmentSource;

/// Cooperative stop signal. The CLI arms it from Ctrl-C; workers check it
/// before fetching, so items not yet dispatched are skipped and remain
/// retryable on the next run. Checkpoints already taken are untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Width of the worker pool.
    pub concurrency: usize,
    /// Persist the cache after this many settled work items.
    pub checkpoint_every: usize,
    /// Fetch attempts per identifier before it is recorded as failed.
    /// 1 preserves skip-and-continue; higher values retry without backoff.
    pub max_attempts: u32,
    pub cancel: CancelFlag,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            concurrency: 10,
            checkpoint_every: 50,
            max_attempts: 1,
            cancel: CancelFlag::default(),
        }
    }
}

/// Counters from an enrichment run.
#[derive(Debug, Default, Clone)]
pub struct EnrichStats {
    /// Distinct identifiers seen in the input.
    pub ids_total: usize,
    /// Identifiers served from the loaded cache with no network call.
    pub cache_hits: usize,
    /// Successful fetches this run.
    pub fetched: u64,
    /// Failed fetches (left unenriched, not cached).
    pub failed: u64,
    /// Items skipped because the run was cancelled.
    pub skipped: u64,
    /// Checkpoints written, the final one included.
    pub checkpoints: u64,
}

/// Events emitted during a run for real-time progress reporting.
#[derive(Debug)]
pub enum EnrichEvent {
    Started {
        total: usize,
        cached: usize,
        pending: usize,
    },
    ItemCompleted {
        id: u64,
        title: String,
        completed: usize,
        pending: usize,
        eta: Option<Duration>,
    },
    ItemFailed {
        id: u64,
        title: String,
        error: String,
        completed: usize,
        pending: usize,
    },
    ItemSkipped {
        id: u64,
    },
    CheckpointWritten {
        entries: usize,
    },
    CheckpointFailed {
        error: String,
    },
    Done {
        stats: EnrichStats,
    },
}

/// What `enrich` hands back. A checkpoint failure does not abort the run
/// (the enriched records are still produced from memory); it is surfaced
/// here for the caller to escalate.
#[derive(Debug)]
pub struct EnrichOutcome {
    pub records: Vec<MovieRecord>,
    pub stats: EnrichStats,
    pub checkpoint_error: Option<CacheError>,
}

/// One unit of work for the pool.
struct WorkItem {
    id: u64,
    title: String,
}

/// Result of one worker's fetch, delivered through the stream.
enum FetchOutcome<P> {
    Fetched { id: u64, title: String, payload: P },
    Failed { id: u64, title: String, error: String },
    Skipped { id: u64 },
}

/// Enrich `records` with one kind of auxiliary data.
///
/// Identifiers already in `cache` cost zero network calls. The rest are
/// dispatched across a fixed-width worker pool; this coordinator is the
/// sole consumer of results and the sole mutator of the cache and the
/// progress counters, so neither needs a lock. The cache is persisted
/// every `checkpoint_every` settled items and once unconditionally at the
/// end, then applied to every record via the merge step.
pub async fn enrich<S: EnrichmentSource>(
    source: S,
    records: Vec<MovieRecord>,
    cache: &mut Cache<S::Payload>,
    options: &EnrichOptions,
    events: UnboundedSender<EnrichEvent>,
) -> EnrichOutcome {
    let mut stats = EnrichStats::default();
    let mut checkpoint_error: Option<CacheError> = None;

    // Partition distinct identifiers into cached and pending.
    let mut seen = HashSet::new();
    let mut pending_items = Vec::new();
    for record in &records {
        if !seen.insert(record.id) {
            continue;
        }
        if cache.contains(record.id) {
            stats.cache_hits += 1;
        } else {
            pending_items.push(WorkItem {
                id: record.id,
                title: record.title.clone(),
            });
        }
    }
    stats.ids_total = seen.len();

    let pending = pending_items.len();
    let _ = events.send(EnrichEvent::Started {
        total: stats.ids_total,
        cached: stats.cache_hits,
        pending,
    });

    log::debug!(
        "Enriching {}: {} distinct ids, {} cached, {} to fetch ({} workers)",
        S::KIND,
        stats.ids_total,
        stats.cache_hits,
        pending,
        options.concurrency,
    );

    let mut progress = ProgressState::start(pending);
    let checkpoint_every = options.checkpoint_every.max(1);
    let max_attempts = options.max_attempts.max(1);
    let cancel = options.cancel.clone();

    // Each fetch runs as its own task so it makes progress regardless of
    // whether the stream is being polled; buffer_unordered still bounds
    // how many are in flight at once.
    let mut outcomes = stream::iter(pending_items)
        .map(move |item| {
            let source = source.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if cancel.is_cancelled() {
                    return FetchOutcome::Skipped { id: item.id };
                }
                let mut attempt = 0;
                loop {
                    attempt += 1;
                    match source.fetch(item.id).await {
                        Ok(payload) => {
                            return FetchOutcome::Fetched {
                                id: item.id,
                                title: item.title,
                                payload,
                            };
                        }
                        Err(e) if attempt < max_attempts => {
                            log::debug!(
                                "Fetch attempt {}/{} for movie {} failed: {}",
                                attempt,
                                max_attempts,
                                item.id,
                                e,
                            );
                        }
                        Err(e) => {
                            return FetchOutcome::Failed {
                                id: item.id,
                                title: item.title,
                                error: e.to_string(),
                            };
                        }
                    }
                }
            })
        })
        .buffer_unordered(options.concurrency.max(1));

    // Reap completions in whatever order they settle.
    while let Some(joined) = outcomes.next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(join_err) => {
                log::debug!("Fetch task panicked: {}", join_err);
                stats.failed += 1;
                progress.advance();
                continue;
            }
        };

        match outcome {
            FetchOutcome::Fetched { id, title, payload } => {
                cache.insert(id, payload);
                stats.fetched += 1;
                progress.advance();
                let _ = events.send(EnrichEvent::ItemCompleted {
                    id,
                    title,
                    completed: progress.completed(),
                    pending,
                    eta: progress.eta(),
                });
            }
            FetchOutcome::Failed { id, title, error } => {
                stats.failed += 1;
                progress.advance();
                log::warn!("Enrichment fetch failed for movie {} ({}): {}", id, title, error);
                let _ = events.send(EnrichEvent::ItemFailed {
                    id,
                    title,
                    error,
                    completed: progress.completed(),
                    pending,
                });
            }
            FetchOutcome::Skipped { id } => {
                stats.skipped += 1;
                let _ = events.send(EnrichEvent::ItemSkipped { id });
                continue;
            }
        }

        if progress.completed() % checkpoint_every == 0 {
            write_checkpoint(cache, &mut stats, &mut checkpoint_error, &events);
        }
    }

    // Final unconditional checkpoint: a crash from here on loses nothing.
    write_checkpoint(cache, &mut stats, &mut checkpoint_error, &events);

    let records = merge::apply_enrichment::<S>(records, cache);

    let _ = events.send(EnrichEvent::Done {
        stats: stats.clone(),
    });

    EnrichOutcome {
        records,
        stats,
        checkpoint_error,
    }
}

/// Persist the cache, recording failure without aborting the run.
fn write_checkpoint<P: serde::Serialize + serde::de::DeserializeOwned>(
    cache: &Cache<P>,
    stats: &mut EnrichStats,
    checkpoint_error: &mut Option<CacheError>,
    events: &UnboundedSender<EnrichEvent>,
) {
    match cache.checkpoint() {
        Ok(()) => {
            stats.checkpoints += 1;
            let _ = events.send(EnrichEvent::CheckpointWritten {
                entries: cache.len(),
            });
        }
        Err(e) => {
            log::warn!(
                "Failed to checkpoint cache to {}: {}",
                cache.path().display(),
                e
            );
            let _ = events.send(EnrichEvent::CheckpointFailed {
                error: e.to_string(),
            });
            *checkpoint_error = Some(e);
        }
    }
}

#[cfg(test)]
#[path = "tests/enrich_tests.rs"]
mod tests;
