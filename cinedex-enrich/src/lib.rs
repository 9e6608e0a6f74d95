pub mod async_util;
pub mod cache;
pub mod enrich;
pub mod merge;
pub mod progress;
pub mod record;
pub mod report;
pub mod source;

pub use cache::{Cache, CacheError};
pub use enrich::{
    CancelFlag, EnrichEvent, EnrichOptions, EnrichOutcome, EnrichStats, enrich,
};
pub use record::{CastMember, MovieRecord, ProviderMap, RegionAvailability};
pub use report::{EnrichReport, ReportEntry};
pub use source::{CastSource, DEFAULT_REGIONS, EnrichmentSource, ProviderSource};
