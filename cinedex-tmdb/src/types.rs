use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response from `/movie/{id}/credits`.
///
/// TMDB omits sections it has no data for, so every field defaults.
#[derive(Debug, Deserialize)]
pub struct CreditsResponse {
    #[serde(default)]
    pub cast: Vec<CastCredit>,
}

/// One cast entry as TMDB returns it.
#[derive(Debug, Deserialize, Clone)]
pub struct CastCredit {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Response from `/movie/{id}/watch/providers`.
///
/// `results` maps ISO 3166-1 region codes ("FR", "US", ...) to the
/// availability listing for that region.
#[derive(Debug, Deserialize)]
pub struct WatchProvidersResponse {
    #[serde(default)]
    pub results: BTreeMap<String, RegionListing>,
}

/// Watch availability for one region. Any of the offer lists may be absent.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RegionListing {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub rent: Vec<ProviderRef>,
    #[serde(default)]
    pub buy: Vec<ProviderRef>,
    #[serde(default)]
    pub flatrate: Vec<ProviderRef>,
}

/// A provider reference inside an offer list.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderRef {
    pub provider_name: String,
}

/// One page from `/movie/popular`.
///
/// Movie documents are kept as raw JSON objects: discovery passes them
/// through to disk untouched and enrichment re-reads them later.
#[derive(Debug, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// Response from `/genre/movie/list`.
#[derive(Debug, Deserialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Response from `/authentication`, used to validate the bearer token.
#[derive(Debug, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status_message: Option<String>,
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
