pub mod client;
pub mod credentials;
pub mod error;
pub mod types;

pub use client::TmdbClient;
pub use credentials::{CredentialSource, Credentials, config_path, credential_source, save_to_file};
pub use error::TmdbError;
