use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::credentials::Credentials;
use crate::error::TmdbError;
use crate::types::{AuthStatus, CreditsResponse, GenreList, MoviePage, WatchProvidersResponse};

const BASE_URL: &str = "https://api.themoviedb.org/3";

/// Minimum spacing between API requests. TMDB's informal limit is around
/// 50 requests per second per IP; staying under it avoids 429 churn when
/// many workers are in flight.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(25);

/// HTTP client for the TMDB API with bearer auth and request spacing.
pub struct TmdbClient {
    http: reqwest::Client,
    token: String,
    last_request: Arc<Mutex<Instant>>,
}

impl TmdbClient {
    /// Create a new client and validate the token against `/authentication`.
    pub async fn new(creds: Credentials, timeout: Duration) -> Result<Self, TmdbError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let client = Self {
            http,
            token: creds.api_token,
            last_request: Arc::new(Mutex::new(Instant::now() - MIN_REQUEST_INTERVAL)),
        };

        client.validate().await?;
        Ok(client)
    }

    /// Check that the API is reachable and the token is accepted.
    async fn validate(&self) -> Result<(), TmdbError> {
        let status: AuthStatus = self.get("/authentication", &[]).await?;
        if !status.success {
            return Err(TmdbError::InvalidToken(
                status
                    .status_message
                    .unwrap_or_else(|| "token rejected".to_string()),
            ));
        }
        Ok(())
    }

    /// Fetch the cast list for a movie.
    pub async fn movie_credits(&self, id: u64) -> Result<CreditsResponse, TmdbError> {
        self.get(&format!("/movie/{id}/credits"), &[]).await
    }

    /// Fetch watch-provider availability for a movie.
    pub async fn watch_providers(&self, id: u64) -> Result<WatchProvidersResponse, TmdbError> {
        self.get(&format!("/movie/{id}/watch/providers"), &[]).await
    }

    /// Fetch one page of popular movies.
    pub async fn popular_movies(&self, page: u32, language: &str) -> Result<MoviePage, TmdbError> {
        let page = page.to_string();
        self.get(
            "/movie/popular",
            &[("language", language), ("page", page.as_str())],
        )
        .await
    }

    /// Fetch the movie genre table.
    pub async fn genres(&self, language: &str) -> Result<GenreList, TmdbError> {
        self.get("/genre/movie/list", &[("language", language)]).await
    }

    /// Issue one GET and decode the JSON body.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TmdbError> {
        self.rate_limit().await;

        let resp = self
            .http
            .get(format!("{}{}", BASE_URL, path))
            .bearer_auth(&self.token)
            .header("accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TmdbError::InvalidToken("API token rejected".to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TmdbError::RateLimit);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TmdbError::NotFound);
        }
        if status.is_server_error() {
            return Err(TmdbError::ServerError {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        if !status.is_success() {
            return Err(TmdbError::Api(format!("unexpected HTTP status {status}")));
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            TmdbError::Api(format!(
                "Failed to parse response for {path}: {e}. Body: {}",
                &text[..text.len().min(200)]
            ))
        })
    }

    /// Wait until at least MIN_REQUEST_INTERVAL has passed since the last
    /// request left this client.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }
}
