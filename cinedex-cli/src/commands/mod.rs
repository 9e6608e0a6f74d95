pub(crate) mod cache;
pub(crate) mod credentials;
pub(crate) mod enrich;
pub(crate) mod fetch;
