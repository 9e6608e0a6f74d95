use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A movie document as loaded from `movies.json`.
///
/// Only the fields the pipeline touches are typed; everything else rides
/// along in `extra` so documents round-trip without loss. Enrichment
/// fields are `Option`s and absent until a run applies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genre_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<CastMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<ProviderMap>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One credited actor, at most ten per movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

/// Watch availability keyed by region code. BTreeMap keeps the serialized
/// cache and output stable across runs.
pub type ProviderMap = BTreeMap<String, RegionAvailability>;

/// Provider names for one region, split by offer type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RegionAvailability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub rent: Vec<String>,
    #[serde(default)]
    pub buy: Vec<String>,
    #[serde(default)]
    pub flatrate: Vec<String>,
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
