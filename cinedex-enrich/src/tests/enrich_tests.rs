use super::*;

use std::collections::HashSet as IdSet;
use std::sync::atomic::AtomicU64;

use cinedex_tmdb::TmdbError;
use tempfile::TempDir;
use tokio::sync::mpsc;

use crate::record::{ProviderMap, RegionAvailability};

/// Source with canned behavior: counts calls, fails for a chosen id set.
#[derive(Clone)]
struct MockSource {
    calls: Arc<AtomicU64>,
    fail: Arc<IdSet<u64>>,
}

impl MockSource {
    fn new(fail: &[u64]) -> Self {
        Self {
            calls: Arc::new(AtomicU64::new(0)),
            fail: Arc::new(fail.iter().copied().collect()),
        }
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EnrichmentSource for MockSource {
    type Payload = ProviderMap;

    const KIND: &'static str = "providers";

    async fn fetch(&self, id: u64) -> Result<Self::Payload, TmdbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.contains(&id) {
            Err(TmdbError::Api(format!("synthetic failure for {id}")))
        } else {
            Ok(payload_for(id))
        }
    }

    fn apply(record: &mut MovieRecord, payload: Option<&Self::Payload>) {
        record.providers = Some(payload.cloned().unwrap_or_default());
    }
}

fn payload_for(_id: u64) -> ProviderMap {
    let mut map = ProviderMap::new();
    map.insert(
        "FR".to_string(),
        RegionAvailability {
            flatrate: vec!["Netflix".to_string()],
            ..Default::default()
        },
    );
    map
}

fn record(id: u64) -> MovieRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Movie {id}"),
    }))
    .unwrap()
}

fn records(ids: &[u64]) -> Vec<MovieRecord> {
    ids.iter().copied().map(record).collect()
}

fn drain(rx: &mut mpsc::UnboundedReceiver<EnrichEvent>) -> Vec<EnrichEvent> {
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    events
}

#[tokio::test]
async fn cached_ids_issue_zero_fetches() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers_cache.json");

    let mut cache: Cache<ProviderMap> = Cache::load(path);
    cache.insert(1, payload_for(1));

    let source = MockSource::new(&[]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = enrich(
        source.clone(),
        records(&[1, 2]),
        &mut cache,
        &EnrichOptions::default(),
        tx,
    )
    .await;

    assert_eq!(source.calls(), 1);
    assert_eq!(outcome.stats.cache_hits, 1);
    assert_eq!(outcome.stats.fetched, 1);
    assert_eq!(outcome.records[0].providers.as_ref(), Some(&payload_for(1)));
    assert_eq!(outcome.records[1].providers.as_ref(), Some(&payload_for(2)));
    drain(&mut rx);
}

#[tokio::test]
async fn fetched_payloads_land_in_the_cache_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers_cache.json");

    let mut cache: Cache<ProviderMap> = Cache::load(path.clone());
    let (tx, _rx) = mpsc::unbounded_channel();
    enrich(
        MockSource::new(&[]),
        records(&[10, 11, 12]),
        &mut cache,
        &EnrichOptions::default(),
        tx,
    )
    .await;

    let reloaded: Cache<ProviderMap> = Cache::load(path);
    assert_eq!(reloaded.len(), 3);
    for id in [10, 11, 12] {
        assert!(reloaded.contains(id));
    }
}

#[tokio::test]
async fn partial_failure_defaults_failed_ids_and_caches_only_successes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers_cache.json");

    let mut cache: Cache<ProviderMap> = Cache::load(path.clone());
    let (tx, _rx) = mpsc::unbounded_channel();
    let outcome = enrich(
        MockSource::new(&[2]),
        records(&[1, 2]),
        &mut cache,
        &EnrichOptions::default(),
        tx,
    )
    .await;

    assert_eq!(outcome.stats.fetched, 1);
    assert_eq!(outcome.stats.failed, 1);

    // Failed id carries the empty default, not an absent field.
    let failed = serde_json::to_value(&outcome.records[1]).unwrap();
    assert_eq!(failed["providers"], serde_json::json!({}));
    let ok = serde_json::to_value(&outcome.records[0]).unwrap();
    assert_eq!(
        ok["providers"],
        serde_json::json!({"FR": {"rent": [], "buy": [], "flatrate": ["Netflix"]}})
    );

    // The cache file holds exactly the successes.
    let reloaded: Cache<ProviderMap> = Cache::load(path);
    assert!(reloaded.contains(1));
    assert!(!reloaded.contains(2));
    assert_eq!(reloaded.len(), 1);
}

#[tokio::test]
async fn checkpoints_follow_the_configured_cadence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers_cache.json");

    let mut cache: Cache<ProviderMap> = Cache::load(path.clone());
    let options = EnrichOptions {
        checkpoint_every: 2,
        ..Default::default()
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = enrich(
        MockSource::new(&[]),
        records(&[1, 2, 3, 4, 5]),
        &mut cache,
        &options,
        tx,
    )
    .await;

    // Periodic checkpoints at 2 and 4 completions, plus the final one.
    let periodic = drain(&mut rx)
        .iter()
        .filter(|e| matches!(e, EnrichEvent::CheckpointWritten { .. }))
        .count();
    assert_eq!(periodic, 3);
    assert_eq!(outcome.stats.checkpoints, 3);
    assert!(outcome.checkpoint_error.is_none());

    let reloaded: Cache<ProviderMap> = Cache::load(path);
    assert_eq!(reloaded.len(), 5);
}

#[tokio::test]
async fn second_run_is_a_full_cache_hit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers_cache.json");
    let input = records(&[1, 2, 3]);

    let first_source = MockSource::new(&[]);
    let mut cache: Cache<ProviderMap> = Cache::load(path.clone());
    let (tx, _rx) = mpsc::unbounded_channel();
    let first = enrich(
        first_source.clone(),
        input.clone(),
        &mut cache,
        &EnrichOptions::default(),
        tx,
    )
    .await;
    assert_eq!(first_source.calls(), 3);

    let second_source = MockSource::new(&[]);
    let mut cache: Cache<ProviderMap> = Cache::load(path);
    let (tx, _rx) = mpsc::unbounded_channel();
    let second = enrich(
        second_source.clone(),
        input,
        &mut cache,
        &EnrichOptions::default(),
        tx,
    )
    .await;

    assert_eq!(second_source.calls(), 0);
    assert_eq!(second.stats.cache_hits, 3);
    assert_eq!(
        serde_json::to_value(&first.records).unwrap(),
        serde_json::to_value(&second.records).unwrap()
    );
}

#[tokio::test]
async fn cancelled_run_skips_dispatch_but_keeps_cached_work() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers_cache.json");

    let mut cache: Cache<ProviderMap> = Cache::load(path.clone());
    cache.insert(1, payload_for(1));

    let options = EnrichOptions::default();
    options.cancel.cancel();

    let source = MockSource::new(&[]);
    let (tx, _rx) = mpsc::unbounded_channel();
    let outcome = enrich(
        source.clone(),
        records(&[1, 2, 3]),
        &mut cache,
        &options,
        tx,
    )
    .await;

    assert_eq!(source.calls(), 0);
    assert_eq!(outcome.stats.skipped, 2);
    assert_eq!(outcome.stats.cache_hits, 1);
    // Cached id still applied; skipped ids default.
    assert_eq!(outcome.records[0].providers.as_ref(), Some(&payload_for(1)));
    assert_eq!(
        outcome.records[1].providers.as_ref(),
        Some(&ProviderMap::new())
    );

    // The final checkpoint still ran.
    let reloaded: Cache<ProviderMap> = Cache::load(path);
    assert_eq!(reloaded.len(), 1);
}

#[tokio::test]
async fn duplicate_ids_are_fetched_once() {
    let dir = TempDir::new().unwrap();
    let mut cache: Cache<ProviderMap> = Cache::load(dir.path().join("providers_cache.json"));

    let source = MockSource::new(&[]);
    let (tx, _rx) = mpsc::unbounded_channel();
    let outcome = enrich(
        source.clone(),
        records(&[7, 7]),
        &mut cache,
        &EnrichOptions::default(),
        tx,
    )
    .await;

    assert_eq!(source.calls(), 1);
    assert_eq!(outcome.stats.ids_total, 1);
    assert_eq!(outcome.records[0].providers, outcome.records[1].providers);
}

#[tokio::test]
async fn bounded_retry_reattempts_up_to_the_limit() {
    let dir = TempDir::new().unwrap();
    let mut cache: Cache<ProviderMap> = Cache::load(dir.path().join("providers_cache.json"));

    let options = EnrichOptions {
        max_attempts: 3,
        ..Default::default()
    };
    let source = MockSource::new(&[9]);
    let (tx, _rx) = mpsc::unbounded_channel();
    let outcome = enrich(source.clone(), records(&[9]), &mut cache, &options, tx).await;

    assert_eq!(source.calls(), 3);
    assert_eq!(outcome.stats.failed, 1);
}
