use std::collections::HashMap;

use cinedex_tmdb::types::Genre;

use crate::cache::Cache;
use crate::record::MovieRecord;
use crate::source::EnrichmentSource;

/// Apply the full cache (pre-existing + newly fetched) onto every record.
///
/// Pure with respect to the cache: records whose identifier has no payload
/// get the kind's empty default, never an absent field.
pub fn apply_enrichment<S: EnrichmentSource>(
    mut records: Vec<MovieRecord>,
    cache: &Cache<S::Payload>,
) -> Vec<MovieRecord> {
    for record in &mut records {
        S::apply(record, cache.get(record.id));
    }
    records
}

/// Resolve `genre_ids` to genre names. Ids missing from the table are
/// dropped rather than producing placeholders.
pub fn attach_genres(records: &mut [MovieRecord], genres: &[Genre]) {
    let table: HashMap<u64, &str> = genres.iter().map(|g| (g.id, g.name.as_str())).collect();
    for record in records {
        record.genres = Some(
            record
                .genre_ids
                .iter()
                .filter_map(|id| table.get(id).map(|name| name.to_string()))
                .collect(),
        );
    }
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
