//! TMDB catalog provider
//!
//! Talks to The Movie Database v3 REST API using a v4 read access token as a
//! bearer credential. Responses are decoded into the typed catalog models;
//! fields the models don't name are carried through untouched.
use crate::{
    error::{AppError, AppResult},
    models::{
        CatalogItem, CatalogPage, MovieCredits, MovieDetails, PersonDetails, SearchResult,
        TmdbId, TvAggregateCredits, TvDetails,
    },
    services::providers::CatalogProvider,
};
use reqwest::{header::ACCEPT, Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_url: String,
    access_token: String,
    language: String,
}

impl TmdbProvider {
    pub fn new(api_url: String, access_token: String, language: String) -> AppResult<Self> {
        if access_token.trim().is_empty() {
            return Err(AppError::Internal(
                "TMDB access token cannot be empty".to_string(),
            ));
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token,
            language,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn language_param(&self) -> (&'static str, String) {
        ("language", self.language.clone())
    }

    /// Issues a GET against `path` and decodes the JSON body
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, path = %path, "TMDB API error");
            return Err(Self::status_error(status, path));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    fn status_error(status: StatusCode, path: &str) -> AppError {
        match status {
            StatusCode::NOT_FOUND => {
                AppError::NotFound(format!("TMDB resource not found: {}", path))
            }
            _ => AppError::ExternalApi(format!(
                "Failed to fetch data from TMDB. Status: {}",
                status.as_u16()
            )),
        }
    }

    fn first_page(&self) -> Vec<(&'static str, String)> {
        vec![self.language_param(), ("page", "1".to_string())]
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn popular_movies(&self) -> AppResult<CatalogPage<CatalogItem>> {
        self.get("movie/popular", &[self.language_param()]).await
    }

    async fn popular_tv(&self) -> AppResult<CatalogPage<CatalogItem>> {
        self.get("tv/popular", &[self.language_param()]).await
    }

    async fn now_playing_movies(&self) -> AppResult<CatalogPage<CatalogItem>> {
        self.get("movie/now_playing", &self.first_page()).await
    }

    async fn movie_details(&self, id: TmdbId) -> AppResult<MovieDetails> {
        self.get(&format!("movie/{}", id), &[self.language_param()])
            .await
    }

    async fn movie_credits(&self, id: TmdbId) -> AppResult<MovieCredits> {
        self.get(&format!("movie/{}/credits", id), &[self.language_param()])
            .await
    }

    async fn similar_movies(&self, id: TmdbId) -> AppResult<CatalogPage<CatalogItem>> {
        self.get(&format!("movie/{}/similar", id), &self.first_page())
            .await
    }

    async fn tv_details(&self, id: TmdbId) -> AppResult<TvDetails> {
        self.get(&format!("tv/{}", id), &[self.language_param()])
            .await
    }

    async fn tv_aggregate_credits(&self, id: TmdbId) -> AppResult<TvAggregateCredits> {
        self.get(&format!("tv/{}/aggregate_credits", id), &[]).await
    }

    async fn similar_tv(&self, id: TmdbId) -> AppResult<CatalogPage<CatalogItem>> {
        self.get(&format!("tv/{}/similar", id), &self.first_page())
            .await
    }

    async fn person_details(&self, id: TmdbId) -> AppResult<PersonDetails> {
        self.get(&format!("person/{}", id), &[]).await
    }

    async fn search_multi(&self, query: &str) -> AppResult<CatalogPage<SearchResult>> {
        let params = [
            ("query", query.to_string()),
            ("include_adult", "false".to_string()),
            self.language_param(),
            ("page", "1".to_string()),
        ];

        let page: CatalogPage<SearchResult> = self.get("search/multi", &params).await?;

        tracing::info!(
            query = %query,
            results = page.results.len(),
            provider = "tmdb",
            "Multi search completed"
        );

        Ok(page)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
