use std::path::PathBuf;

use crate::error::TmdbError;

/// Credentials for authenticating with the TMDB API.
///
/// TMDB v4 read access tokens are long-lived bearer tokens; that is the
/// only credential this tool needs.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_token: String,
}

/// Where the token's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// TOML config file format.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct ConfigFile {
    tmdb: Option<TmdbConfig>,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct TmdbConfig {
    api_token: Option<String>,
}

impl Credentials {
    /// Load the API token from the environment or the config file.
    ///
    /// Priority: `TMDB_API_TOKEN` env var > config file.
    pub fn load() -> Result<Self, TmdbError> {
        let api_token = std::env::var("TMDB_API_TOKEN")
            .ok()
            .or_else(|| load_config_file().and_then(|c| c.api_token))
            .ok_or_else(|| {
                TmdbError::Config(
                    "Missing API token. Set TMDB_API_TOKEN env var or run 'cinedex credentials set'"
                        .to_string(),
                )
            })?;

        Ok(Self { api_token })
    }
}

/// Return the path to the credentials config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cinedex").join("credentials.toml"))
}

/// Save the token to the config file, creating parent directories as needed.
/// Returns the path the file was written to.
pub fn save_to_file(creds: &Credentials) -> Result<PathBuf, TmdbError> {
    let path = config_path()
        .ok_or_else(|| TmdbError::Config("Could not determine config directory".to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let config = ConfigFile {
        tmdb: Some(TmdbConfig {
            api_token: Some(creds.api_token.clone()),
        }),
    };

    let toml_str = toml::to_string_pretty(&config)
        .map_err(|e| TmdbError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(&path, toml_str)?;
    Ok(path)
}

/// Determine where the token is coming from.
pub fn credential_source() -> CredentialSource {
    if std::env::var("TMDB_API_TOKEN").is_ok() {
        CredentialSource::EnvVar("TMDB_API_TOKEN")
    } else if load_config_file()
        .and_then(|c| c.api_token)
        .is_some()
    {
        CredentialSource::ConfigFile
    } else {
        CredentialSource::Missing
    }
}

fn load_config_file() -> Option<TmdbConfig> {
    let path = config_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    let config: ConfigFile = toml::from_str(&content).ok()?;
    config.tmdb
}
