/// Errors that can occur when talking to the TMDB API.
#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    #[error("Rate limited by TMDB API")]
    RateLimit,

    #[error("Resource not found")]
    NotFound,

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
