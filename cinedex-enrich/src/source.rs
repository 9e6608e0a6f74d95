use std::future::Future;
use std::sync::Arc;

use cinedex_tmdb::TmdbClient;
use cinedex_tmdb::TmdbError;
use cinedex_tmdb::types::{CreditsResponse, WatchProvidersResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::record::{CastMember, MovieRecord, ProviderMap, RegionAvailability};

/// Cast entries kept per movie.
const MAX_CAST_ENTRIES: usize = 10;

/// Regions extracted when the caller does not override them.
pub const DEFAULT_REGIONS: &[&str] = &["FR", "US"];

/// One enrichment kind: how to fetch a payload for an identifier and how
/// to apply it (or its default) to a record.
///
/// The coordinator is generic over this seam, so each kind gets its own
/// cache file and field without the pipeline knowing about either.
pub trait EnrichmentSource: Clone + Send + Sync + 'static {
    type Payload: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Short name used for cache files and log lines.
    const KIND: &'static str;

    /// One network round trip for one identifier.
    fn fetch(&self, id: u64) -> impl Future<Output = Result<Self::Payload, TmdbError>> + Send;

    /// Set this kind's field on a record. `None` means no payload exists
    /// (never fetched, or the fetch failed) and must yield the empty
    /// default, not an absent field.
    fn apply(record: &mut MovieRecord, payload: Option<&Self::Payload>);
}

/// Cast-list enrichment via `/movie/{id}/credits`.
#[derive(Clone)]
pub struct CastSource {
    client: Arc<TmdbClient>,
}

impl CastSource {
    pub fn new(client: Arc<TmdbClient>) -> Self {
        Self { client }
    }
}

impl EnrichmentSource for CastSource {
    type Payload = Vec<CastMember>;

    const KIND: &'static str = "cast";

    async fn fetch(&self, id: u64) -> Result<Self::Payload, TmdbError> {
        let credits = self.client.movie_credits(id).await?;
        Ok(extract_cast(credits))
    }

    fn apply(record: &mut MovieRecord, payload: Option<&Self::Payload>) {
        record.cast = Some(payload.cloned().unwrap_or_default());
    }
}

/// Watch-provider enrichment via `/movie/{id}/watch/providers`.
#[derive(Clone)]
pub struct ProviderSource {
    client: Arc<TmdbClient>,
    regions: Arc<[String]>,
}

impl ProviderSource {
    pub fn new(client: Arc<TmdbClient>, regions: Vec<String>) -> Self {
        let regions = if regions.is_empty() {
            DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect()
        } else {
            regions
        };
        Self {
            client,
            regions: regions.into(),
        }
    }
}

impl EnrichmentSource for ProviderSource {
    type Payload = ProviderMap;

    const KIND: &'static str = "providers";

    async fn fetch(&self, id: u64) -> Result<Self::Payload, TmdbError> {
        let resp = self.client.watch_providers(id).await?;
        Ok(extract_providers(resp, &self.regions))
    }

    fn apply(record: &mut MovieRecord, payload: Option<&Self::Payload>) {
        record.providers = Some(payload.cloned().unwrap_or_default());
    }
}

/// Reduce a credits response to the leading cast entries.
pub fn extract_cast(credits: CreditsResponse) -> Vec<CastMember> {
    credits
        .cast
        .into_iter()
        .take(MAX_CAST_ENTRIES)
        .map(|c| CastMember {
            id: c.id,
            name: c.name,
            character: c.character,
            profile_path: c.profile_path,
        })
        .collect()
}

/// Reduce a watch-providers response to name lists for the requested
/// regions. Regions TMDB has no data for still appear, empty.
pub fn extract_providers(resp: WatchProvidersResponse, regions: &[String]) -> ProviderMap {
    let mut map = ProviderMap::new();
    for region in regions {
        let listing = resp.results.get(region).cloned().unwrap_or_default();
        map.insert(
            region.clone(),
            RegionAvailability {
                link: listing.link,
                rent: listing.rent.into_iter().map(|p| p.provider_name).collect(),
                buy: listing.buy.into_iter().map(|p| p.provider_name).collect(),
                flatrate: listing
                    .flatrate
                    .into_iter()
                    .map(|p| p.provider_name)
                    .collect(),
            },
        );
    }
    map
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
